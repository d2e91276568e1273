use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Durable score row as returned by the score endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreRecord {
    pub game_id: String,
    pub player_name: String,
    pub score: i32,
    pub play_date: String, // ISO 8601 string
    pub is_winner: bool,
}
