use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Player ids are the connection ids of the sockets that joined.
pub type PlayerId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// Outcome of a finished round, as broadcast to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    Win,
    Lose,
}

/// A player entry in a snapshot, already carrying their accumulated score.
/// Snapshot players are sorted by descending score, ties in join order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoredPlayer {
    pub id: PlayerId,
    pub name: String,
    pub score: i32,
}

/// Client-facing view of a game. The word is masked with underscores for
/// every letter not yet guessed while the round is running, and revealed
/// in full once the game is finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSnapshot {
    pub word: String,
    pub guessed_letters: Vec<char>,
    pub remaining_guesses: u8,
    pub current_player: Option<Player>,
    pub status: GameStatus,
    pub players: Vec<ScoredPlayer>,
    pub time_remaining: u32,
    pub players_needed: u32,
}
