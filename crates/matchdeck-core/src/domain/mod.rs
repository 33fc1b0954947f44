//! Domain model (IDs, paths, profiles, decisions, queries, errors, events).

pub mod ids;
pub mod path;
pub mod profile;
pub mod decision;
pub mod query;
pub mod errors;
pub mod events;

pub use ids::{IdParseError, MatchId, UserId};
pub use path::{CollectionPath, DocumentPath};
pub use profile::{MatchRecord, UserProfile};
pub use decision::{Decision, DecisionOutcome, SwipeDirection};
pub use query::{Filter, Query};
pub use errors::{AuthError, DeckError, ErrorKind, StoreError};
pub use events::{DeckEvent, Destination};
