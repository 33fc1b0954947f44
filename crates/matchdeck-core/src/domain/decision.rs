//! Decision model: what the user did with a card, and what came of it.

use super::ids::{MatchId, UserId};
use super::profile::UserProfile;

/// Direction a card left the deck in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// The decision a swipe stands for.
///
/// - `Pass`: left swipe, the candidate is excluded from future feeds.
/// - `Swipe`: right swipe, interest; two opposite swipes make a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Pass,
    Swipe,
}

impl From<SwipeDirection> for Decision {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => Decision::Pass,
            SwipeDirection::Right => Decision::Swipe,
        }
    }
}

/// Result of recording one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The index did not point at a candidate; nothing was written.
    Ignored { index: usize },

    /// A pass record was written.
    Passed { target: UserId },

    /// A swipe record was written and the other side has not swiped back (yet).
    Swiped { target: UserId },

    /// A swipe record and a match record were written.
    Matched {
        match_id: MatchId,
        logged_in: UserProfile,
        swiped: UserProfile,
    },
}

impl DecisionOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, DecisionOutcome::Matched { .. })
    }
}
