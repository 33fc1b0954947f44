//! Recording adapters - 呼ばれた内容をそのまま溜めておく実装
//!
//! テストや CLI のデモで「何が起きたか」を後から確認するために使う。

use std::sync::{Mutex, PoisonError};

use crate::domain::{DeckEvent, Destination};
use crate::ports::{EventSink, Navigator};

/// RecordingNavigator は遷移依頼を記録する
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<Destination> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination);
    }
}

/// RecordingEventSink は DeckEvent を記録する
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DeckEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeckEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 失敗通知だけを取り出す
    pub fn failures(&self) -> Vec<DeckEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, DeckEvent::Failed { .. }))
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: DeckEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
