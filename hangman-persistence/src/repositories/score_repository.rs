use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{prelude::*, scores};
use crate::{NewScore, ScoreStore};
use hangman_types::ScoreRecord;

const DAILY_WINNERS_LIMIT: u64 = 10;

pub struct ScoreRepository {
    db: DatabaseConnection,
}

impl ScoreRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_record(model: scores::Model) -> ScoreRecord {
        ScoreRecord {
            game_id: model.game_id,
            player_name: model.player_name,
            score: model.score,
            play_date: model.play_date.to_rfc3339(),
            is_winner: model.is_winner,
        }
    }
}

#[async_trait]
impl ScoreStore for ScoreRepository {
    async fn record_score(&self, score: NewScore) -> Result<()> {
        let row = scores::ActiveModel {
            id: ActiveValue::NotSet,
            game_id: ActiveValue::Set(score.game_id),
            player_name: ActiveValue::Set(score.player_name),
            score: ActiveValue::Set(score.score),
            play_date: ActiveValue::Set(chrono::Utc::now()),
            is_winner: ActiveValue::Set(score.is_winner),
        };

        Scores::insert(row).exec(&self.db).await?;
        Ok(())
    }

    async fn scores_for_game(&self, game_id: &str) -> Result<Vec<ScoreRecord>> {
        let rows = Scores::find()
            .filter(scores::Column::GameId.eq(game_id))
            .order_by_desc(scores::Column::Score)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Self::model_to_record).collect())
    }

    async fn daily_winners(&self) -> Result<Vec<ScoreRecord>> {
        let midnight = chrono::Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();

        let rows = Scores::find()
            .filter(scores::Column::PlayDate.gte(midnight))
            .filter(scores::Column::IsWinner.eq(true))
            .order_by_desc(scores::Column::Score)
            .limit(DAILY_WINNERS_LIMIT)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Self::model_to_record).collect())
    }
}
