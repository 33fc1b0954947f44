//! TracingEventSink - DeckEvent を tracing のログとして出す

use tracing::{debug, info, warn};

use crate::domain::DeckEvent;
use crate::ports::EventSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DeckEvent) {
        match event {
            DeckEvent::Mounted { user, excluded } => {
                info!(%user, excluded, "deck mounted");
            }
            DeckEvent::CandidatesUpdated { count } => {
                debug!(count, "candidates updated");
            }
            DeckEvent::Passed { target } => info!(%target, "passed"),
            DeckEvent::Swiped { target } => info!(%target, "swiped"),
            DeckEvent::Matched { match_id, with } => {
                info!(%match_id, %with, "it's a match");
            }
            DeckEvent::LoggedOut { user } => info!(%user, "logged out"),
            DeckEvent::Failed {
                operation,
                message,
                kind,
            } => {
                warn!(operation, ?kind, %message, "operation failed");
            }
        }
    }
}
