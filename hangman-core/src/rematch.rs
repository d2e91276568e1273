use std::collections::HashMap;

use hangman_types::{GameError, GameStatus, PlayerId};

use crate::Game;

/// How far along a pending vote is, for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteProgress {
    pub received: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A vote was opened; everyone except the requester should be asked.
    Opened,
    /// The requester is the only seated player, so there is nobody to ask
    /// and the rematch is accepted on the spot.
    SoloAccepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Waiting(VoteProgress),
    Accepted,
    Rejected,
}

/// Rematch vote for one game: unanimous consent of the non-host players
/// gates a new round. The host's own vote is implicit. The vote holds no
/// reference to the game; callers pass it in so the registry can keep both
/// behind a single lock.
#[derive(Debug, Default)]
pub struct RematchVote {
    pending: bool,
    responses: HashMap<PlayerId, bool>,
}

impl RematchVote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Open a vote. Only allowed once the round is finished and only by a
    /// seated player. Any leftover responses from an earlier vote are
    /// discarded.
    pub fn request(&mut self, game: &Game, requester: PlayerId) -> Result<RequestOutcome, GameError> {
        if game.status() != GameStatus::Finished {
            return Err(GameError::InvalidState {
                current_status: format!("{:?}", game.status()).to_lowercase(),
            });
        }

        if !game.contains_player(requester) {
            return Err(GameError::PlayerNotFound);
        }

        if game.player_count() == 1 {
            // Zero-threshold guard: with one player there is no quorum to
            // wait for, and only then is auto-acceptance allowed.
            self.pending = false;
            self.responses.clear();
            return Ok(RequestOutcome::SoloAccepted);
        }

        self.pending = true;
        self.responses.clear();
        Ok(RequestOutcome::Opened)
    }

    /// Record one player's vote. The vote closes as soon as responses from
    /// everyone except the host are in: unanimous yes accepts, anything
    /// else rejects. The caller resets the game on acceptance.
    pub fn handle_response(
        &mut self,
        game: &Game,
        player_id: PlayerId,
        accepted: bool,
    ) -> Result<VoteOutcome, GameError> {
        if !self.pending {
            return Err(GameError::NoPendingRequest);
        }

        self.responses.insert(player_id, accepted);

        let required = game.player_count().saturating_sub(1);
        if self.responses.len() < required {
            return Ok(VoteOutcome::Waiting(self.progress(game)));
        }

        let all_accepted = self.responses.values().all(|&accepted| accepted);
        self.pending = false;
        self.responses.clear();

        if all_accepted {
            Ok(VoteOutcome::Accepted)
        } else {
            Ok(VoteOutcome::Rejected)
        }
    }

    pub fn progress(&self, game: &Game) -> VoteProgress {
        VoteProgress {
            received: self.responses.len() as u32,
            total: game.player_count().saturating_sub(1) as u32,
        }
    }
}
