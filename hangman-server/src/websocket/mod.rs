use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::registry::GameRegistry;
use hangman_persistence::ScoreStore;
use hangman_types::{ClientMessage, ServerMessage};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

/// Drives one websocket for its whole lifetime: inbound frames are decoded
/// and dispatched, outbound messages drain from the connection's channel,
/// and disconnect doubles as leaving the game.
pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<GameRegistry>,
    scores: Arc<dyn ScoreStore>,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let message_receiver = connection_manager.create_connection(connection_id).await;

    let message_handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        registry.clone(),
        scores,
    );

    let incoming = {
        let message_handler = message_handler.clone();
        let mut rate_limiter = RateLimiter::new();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if let Err(e) =
                            handle_frame(msg, &mut rate_limiter, &message_handler).await
                        {
                            error!("Closing connection {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    let outgoing = async move {
        let mut receiver = message_receiver;

        while let Some(message) = receiver.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize message: {:?}", e);
                    continue;
                }
            };

            if ws_sender.send(Message::text(json)).await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        _ = incoming => {},
        _ = outgoing => {},
    }

    info!("Connection {} disconnected", connection_id);
    message_handler.handle_disconnect().await;
    connection_manager.remove_connection(connection_id).await;
}

/// Bad input gets an error reply on the same socket; only an unsendable
/// reply tears the connection down.
async fn handle_frame(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &MessageHandler,
) -> Result<(), String> {
    if !msg.is_text() {
        return Ok(());
    }

    if !rate_limiter.try_acquire() {
        return message_handler
            .send_message(ServerMessage::Error {
                message: "Too many messages, slow down".to_string(),
            })
            .await;
    }

    let text = msg.to_str().map_err(|_| "invalid text frame".to_string())?;

    let client_message: ClientMessage = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return message_handler
                .send_message(ServerMessage::Error {
                    message: format!("Invalid message: {}", e),
                })
                .await;
        }
    };

    message_handler.handle_message(client_message).await
}
