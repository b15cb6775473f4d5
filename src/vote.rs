//! Optimistic voting with rollback.
//!
//! One active vote per article per user: voting the same direction again
//! clears it, voting the other direction replaces it. Displayed counts are
//! adjusted before the network call; a failed submission restores the exact
//! pre-attempt state, so display and server truth never diverge by more than
//! the one in-flight request.

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::models::{VoteRequest, VoteTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Wire encoding used by `POST /vote`.
    pub fn wire(self) -> u8 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => 0,
        }
    }

    pub fn from_wire(value: u8) -> Self {
        if value == 1 {
            VoteDirection::Up
        } else {
            VoteDirection::Down
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

/// Displayed tallies plus the current user's active vote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VotePanel {
    pub totals: VoteTotals,
    pub user_vote: Option<VoteDirection>,
}

impl VotePanel {
    pub fn new(totals: VoteTotals) -> Self {
        Self {
            totals,
            user_vote: None,
        }
    }

    fn bump(&mut self, direction: VoteDirection, delta: i64) {
        let counter = match direction {
            VoteDirection::Up => &mut self.totals.up,
            VoteDirection::Down => &mut self.totals.down,
        };
        *counter = (*counter + delta).max(0);
    }

    /// Apply the toggle/replace rule locally and return the resulting vote.
    pub fn apply(&mut self, direction: VoteDirection) -> Option<VoteDirection> {
        match self.user_vote {
            Some(previous) if previous == direction => {
                self.bump(direction, -1);
                self.user_vote = None;
            }
            Some(previous) => {
                self.bump(previous, -1);
                self.bump(direction, 1);
                self.user_vote = Some(direction);
            }
            None => {
                self.bump(direction, 1);
                self.user_vote = Some(direction);
            }
        }
        self.user_vote
    }

    /// Cast a vote as a three-phase transaction: snapshot, tentative local
    /// apply, submit. The snapshot is restored verbatim when the submission
    /// fails, keeping the compensation next to the tentative update.
    pub async fn cast(
        &mut self,
        direction: VoteDirection,
        backend: &dyn Backend,
        user_id: i64,
        article_id: &str,
    ) -> Result<Option<VoteDirection>> {
        let snapshot = self.clone();
        self.apply(direction);

        let request = VoteRequest {
            user_id,
            article_id: article_id.to_string(),
            vote: direction.wire(),
        };
        match backend.vote(&request).await {
            Ok(()) => Ok(self.user_vote),
            Err(e) => {
                *self = snapshot;
                match e {
                    Error::AuthExpired => Err(Error::AuthExpired),
                    other => Err(Error::Vote(other.to_string())),
                }
            }
        }
    }
}
