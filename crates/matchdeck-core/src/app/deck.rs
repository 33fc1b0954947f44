//! CardDeck - the rendered card stack.
//!
//! Holds the candidate list and a cursor pointing at the top card.
//!
//! Everything before the cursor has been dismissed. A new snapshot keeps that
//! prefix as it is and appends only the profiles not dismissed yet, so the
//! indices handed to the recorder stay valid and a profile that sorts before
//! the cursor is still shown. A card leaves the deck only by being dismissed.

use std::collections::HashSet;

use crate::domain::{SwipeDirection, UserId, UserProfile};

/// A card that left the deck: which index, and which way it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dismissal {
    pub index: usize,
    pub direction: SwipeDirection,
}

#[derive(Debug, Clone)]
pub struct CardDeck {
    candidates: Vec<UserProfile>,
    cursor: usize,
    stack_size: usize,
}

impl CardDeck {
    pub fn new(stack_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            cursor: 0,
            stack_size,
        }
    }

    pub fn replace_candidates(&mut self, candidates: Vec<UserProfile>) {
        let dismissed: HashSet<UserId> = self.dismissed().iter().map(|p| p.id).collect();
        self.candidates.truncate(self.cursor);
        self.candidates
            .extend(candidates.into_iter().filter(|p| !dismissed.contains(&p.id)));
    }

    /// Cards already thrown off the deck, in dismissal order.
    pub fn dismissed(&self) -> &[UserProfile] {
        &self.candidates[..self.cursor]
    }

    pub fn candidates(&self) -> &[UserProfile] {
        &self.candidates
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn top(&self) -> Option<&UserProfile> {
        self.candidates.get(self.cursor)
    }

    /// The cards currently drawn on the stack, top first.
    pub fn visible(&self) -> &[UserProfile] {
        let start = self.cursor.min(self.candidates.len());
        let end = (start + self.stack_size).min(self.candidates.len());
        &self.candidates[start..end]
    }

    /// True when the placeholder ("no more profiles") card is showing.
    pub fn is_exhausted(&self) -> bool {
        self.top().is_none()
    }

    /// Programmatic swipe (the cross / heart buttons).
    ///
    /// Returns `None` when there is no card to throw.
    pub fn dismiss(&mut self, direction: SwipeDirection) -> Option<Dismissal> {
        self.top()?;
        let index = self.cursor;
        self.cursor += 1;
        Some(Dismissal { index, direction })
    }

    /// Gesture completion: the widget reports which index it dismissed.
    ///
    /// The cursor moves past `index` but never backwards, and never past the
    /// end of the list.
    pub fn on_swiped(&mut self, direction: SwipeDirection, index: usize) -> Dismissal {
        let past = index.saturating_add(1).min(self.candidates.len());
        self.cursor = self.cursor.max(past);
        Dismissal { index, direction }
    }
}
