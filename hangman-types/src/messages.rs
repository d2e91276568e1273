use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameSnapshot, RoundResult};

/// Intents a client may send over the socket.
///
/// `MakeGuess` with an empty `letter` is the turn-timeout sentinel sent by
/// the client after its 10 second countdown expires.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    CreateGame { player_name: String, public_game: bool },
    JoinGame { game_id: String, player_name: String },
    JoinPublicGame { player_name: String },
    MakeGuess {
        game_id: String,
        letter: String,
        /// Client-reported guess timestamp (ms since epoch). Advisory
        /// only: the server clock is authoritative for speed scoring.
        guess_time: Option<u64>,
    },
    ChatMessage { game_id: String, message: String, player_name: String },
    RequestNewGame { game_id: String },
    NewGameResponse { game_id: String, accepted: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatEntry {
    pub username: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    GameCreated { game_id: String, message: String },
    PlayerJoined { message: String, game_state: GameSnapshot },
    PlayerLeft { message: String, game_state: GameSnapshot },
    GameStateUpdate { game_state: GameSnapshot },
    GameOver {
        result: RoundResult,
        word: String,
        is_host: bool,
        public_game: bool,
        game_id: String,
    },
    ChatMessage(ChatEntry),
    NewGameRequested { requested_by: String },
    WaitingForResponses { received: u32, total: u32 },
    NewGameStarted { message: String, game_state: GameSnapshot },
    ReturnToMenu { message: String },
    Error { message: String },
}
