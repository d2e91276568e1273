use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;

use crate::registry::GameRegistry;
use crate::websocket::ConnectionManager;
use hangman_persistence::ScoreStore;

pub mod config;
pub mod registry;
pub mod websocket;

#[derive(Deserialize)]
struct WinnersQuery {
    limit: Option<usize>,
}

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<GameRegistry>,
    scores: Arc<dyn ScoreStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let registry_filter = warp::any().map({
        let registry = registry.clone();
        move || registry.clone()
    });

    let scores_filter = warp::any().map({
        let scores = scores.clone();
        move || scores.clone()
    });

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter.clone())
        .and(registry_filter.clone())
        .and(scores_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr, registry, scores| {
            ws.on_upgrade(move |socket| {
                websocket::handle_connection(socket, conn_mgr, registry, scores)
            })
        });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Stored scores for one game
    let game_scores = warp::path!("game" / String / "scores")
        .and(warp::get())
        .and(scores_filter.clone())
        .and_then(handle_game_scores_request);

    // Today's winners leaderboard
    let daily_winners = warp::path!("scores" / "daily-winners")
        .and(warp::get())
        .and(warp::query::<WinnersQuery>())
        .and(scores_filter.clone())
        .and_then(handle_daily_winners_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    websocket
        .or(health)
        .or(game_scores)
        .or(daily_winners)
        .with(cors)
        .with(warp::log("hangman"))
}

async fn handle_game_scores_request(
    game_id: String,
    scores: Arc<dyn ScoreStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match scores.scores_for_game(&game_id).await {
        Ok(rows) => Ok(warp::reply::with_status(
            warp::reply::json(&rows),
            warp::http::StatusCode::OK,
        )),
        Err(err) => {
            tracing::error!("Failed to fetch scores for game {}: {:#}", game_id, err);
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Failed to fetch scores"
                })),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_daily_winners_request(
    query: WinnersQuery,
    scores: Arc<dyn ScoreStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let limit = query.limit.unwrap_or(10).min(100);

    match scores.daily_winners().await {
        Ok(mut rows) => {
            rows.truncate(limit);
            Ok(warp::reply::with_status(
                warp::reply::json(&rows),
                warp::http::StatusCode::OK,
            ))
        }
        Err(err) => {
            tracing::error!("Failed to fetch daily winners: {:#}", err);
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Failed to fetch daily winners"
                })),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}
