use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Everything that can go wrong while processing a client intent.
///
/// All of these are recoverable: the gateway logs them and replies with a
/// private error message to the originating connection, never a broadcast.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    #[error("Game not found. Please check the game ID.")]
    GameNotFound { game_id: String },
    #[error("Chat not found")]
    ChatNotFound { game_id: String },
    #[error("Game is not in playing state")]
    InvalidState { current_status: String },
    #[error("It's not your turn")]
    NotYourTurn,
    #[error("Letter already guessed")]
    AlreadyGuessed { letter: char },
    #[error("Game is full or already in progress")]
    GameFullOrInProgress,
    #[error("This name is already taken in this game")]
    NameTaken { name: String },
    #[error("No pending new game request")]
    NoPendingRequest,
    #[error("Player not found")]
    PlayerNotFound,
}
