pub mod connection;
pub mod entities;
pub mod repositories;

use anyhow::Result;
use async_trait::async_trait;

use hangman_types::ScoreRecord;

/// A score row to be written after a round ends.
#[derive(Debug, Clone)]
pub struct NewScore {
    pub game_id: String,
    pub player_name: String,
    pub score: i32,
    pub is_winner: bool,
}

/// Durable score collaborator. Writes are issued by the gateway after a
/// terminal game transition, outside the game lock, best effort: a failed
/// write is logged and never affects game progression.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn record_score(&self, score: NewScore) -> Result<()>;

    /// Stored scores for one game, sorted descending.
    async fn scores_for_game(&self, game_id: &str) -> Result<Vec<ScoreRecord>>;

    /// Today's winner rows, score descending, top 10.
    async fn daily_winners(&self) -> Result<Vec<ScoreRecord>>;
}
