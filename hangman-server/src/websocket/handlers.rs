use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::registry::{GameRegistry, GameRoom};
use crate::websocket::connection::{ConnectionId, ConnectionManager};
use hangman_core::{Guess, GuessOutcome, RemoveOutcome, RequestOutcome, VoteOutcome};
use hangman_persistence::{NewScore, ScoreStore};
use hangman_types::{ClientMessage, GameError, PlayerId, RoundResult, ServerMessage};

/// Everything needed to notify players and persist scores once a round
/// has ended, collected while the game lock is still held.
struct GameOverNotice {
    result: RoundResult,
    word: String,
    public_game: bool,
    seats: Vec<(PlayerId, bool)>,
    scores: Vec<NewScore>,
}

/// The event gateway: translates client intents into engine calls and
/// fans results back out. Broadcasts and score writes happen only after
/// the game lock has been released.
#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<GameRegistry>,
    scores: Arc<dyn ScoreStore>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        registry: Arc<GameRegistry>,
        scores: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            registry,
            scores,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager
            .update_activity(self.connection_id)
            .await;

        match message {
            ClientMessage::CreateGame {
                player_name,
                public_game,
            } => self.handle_create_game(player_name, public_game).await,
            ClientMessage::JoinGame {
                game_id,
                player_name,
            } => self.handle_join_game(game_id, player_name).await,
            ClientMessage::JoinPublicGame { player_name } => {
                self.handle_join_public_game(player_name).await
            }
            ClientMessage::MakeGuess {
                game_id, letter, ..
            } => self.handle_make_guess(game_id, letter).await,
            ClientMessage::ChatMessage {
                game_id,
                message,
                player_name,
            } => self.handle_chat_message(game_id, message, player_name).await,
            ClientMessage::RequestNewGame { game_id } => {
                self.handle_request_new_game(game_id).await
            }
            ClientMessage::NewGameResponse { game_id, accepted } => {
                self.handle_new_game_response(game_id, accepted).await
            }
        }
    }

    fn player_id(&self) -> PlayerId {
        self.connection_id.player_id()
    }

    pub async fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
            .await
    }

    /// Errors go to the originating connection only, never the channel.
    async fn send_error(&self, message: &str) -> Result<(), String> {
        self.send_message(ServerMessage::Error {
            message: message.to_string(),
        })
        .await
    }

    async fn handle_create_game(
        &self,
        player_name: String,
        public_game: bool,
    ) -> Result<(), String> {
        let (game_id, room) = match self.registry.create_game(public_game).await {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to create game: {:#}", e);
                return self.send_error("Failed to create game").await;
            }
        };

        let snapshot = {
            let mut room = room.lock().await;
            if let Err(e) = room.game.add_player(self.player_id(), &player_name) {
                return self.send_error(&e.to_string()).await;
            }
            room.touch();
            room.game.snapshot()
        };

        self.register_membership(&game_id, &player_name).await;
        info!(
            "Player {} created game {} ({})",
            self.connection_id,
            game_id,
            if public_game { "public" } else { "private" }
        );

        self.send_message(ServerMessage::GameCreated {
            game_id: game_id.clone(),
            message: "Waiting for another player to join...".to_string(),
        })
        .await?;
        self.connection_manager
            .send_to_game(&game_id, ServerMessage::GameStateUpdate { game_state: snapshot })
            .await;
        Ok(())
    }

    async fn handle_join_game(&self, game_id: String, player_name: String) -> Result<(), String> {
        let room = match self.registry.get(&game_id).await {
            Ok(room) => room,
            Err(e) => return self.send_error(&e.to_string()).await,
        };

        let snapshot = {
            let mut room = room.lock().await;
            match room.game.add_player(self.player_id(), &player_name) {
                Ok(()) => {
                    room.touch();
                    room.game.snapshot()
                }
                Err(e) => return self.send_error(&e.to_string()).await,
            }
        };

        self.register_membership(&game_id, &player_name).await;
        self.connection_manager
            .send_to_game(
                &game_id,
                ServerMessage::PlayerJoined {
                    message: format!("{} joined the game!", player_name),
                    game_state: snapshot,
                },
            )
            .await;
        Ok(())
    }

    async fn handle_join_public_game(&self, player_name: String) -> Result<(), String> {
        let (game_id, room) = match self
            .registry
            .join_public_game(self.player_id(), &player_name)
            .await
        {
            Ok(joined) => joined,
            Err(e) => {
                error!("Failed to join public game: {:#}", e);
                return self.send_error("Failed to join public game").await;
            }
        };

        let snapshot = room.lock().await.game.snapshot();

        self.register_membership(&game_id, &player_name).await;
        self.connection_manager
            .send_to_game(
                &game_id,
                ServerMessage::PlayerJoined {
                    message: format!("{} joined the public game!", player_name),
                    game_state: snapshot,
                },
            )
            .await;
        Ok(())
    }

    async fn handle_make_guess(&self, game_id: String, letter: String) -> Result<(), String> {
        let room = match self.registry.get(&game_id).await {
            Ok(room) => room,
            Err(e) => return self.send_error(&e.to_string()).await,
        };

        let guess = if letter.is_empty() {
            Guess::TimedOut
        } else {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Guess::Letter(c),
                _ => return self.send_error("Guess must be a single letter").await,
            }
        };

        let (snapshot, game_over) = {
            let mut room = room.lock().await;
            room.touch();
            let game = &mut room.game;

            match game.current_player() {
                Some(current) if current.id == self.player_id() => {}
                _ => return self.send_error(&GameError::NotYourTurn.to_string()).await,
            }

            let outcome = match game.make_guess(guess, Instant::now()) {
                Ok(outcome) => outcome,
                Err(e) => return self.send_error(&e.to_string()).await,
            };

            let terminal = match outcome {
                GuessOutcome::Continue { .. } => None,
                GuessOutcome::Win { word, .. } => Some((RoundResult::Win, word)),
                GuessOutcome::Lose { word, .. } => Some((RoundResult::Lose, word)),
            };

            let game_over = terminal.map(|(result, word)| {
                let top_score = game
                    .players()
                    .iter()
                    .map(|p| game.score_of(p.id))
                    .max()
                    .unwrap_or(0);
                GameOverNotice {
                    result,
                    word,
                    public_game: game.is_public(),
                    seats: game
                        .players()
                        .iter()
                        .map(|p| (p.id, game.is_host(p.id)))
                        .collect(),
                    scores: game
                        .players()
                        .iter()
                        .map(|p| NewScore {
                            game_id: game_id.clone(),
                            player_name: p.name.clone(),
                            score: game.score_of(p.id),
                            is_winner: result == RoundResult::Win
                                && game.score_of(p.id) == top_score,
                        })
                        .collect(),
                }
            });

            (game.snapshot(), game_over)
        };

        // State first, then the per-player game over notice, matching the
        // order clients rely on.
        self.connection_manager
            .send_to_game(&game_id, ServerMessage::GameStateUpdate { game_state: snapshot })
            .await;

        if let Some(notice) = game_over {
            for (player_id, is_host) in &notice.seats {
                let _ = self
                    .connection_manager
                    .send_to_connection(
                        ConnectionId::from_player(*player_id),
                        ServerMessage::GameOver {
                            result: notice.result,
                            word: notice.word.clone(),
                            is_host: *is_host,
                            public_game: notice.public_game,
                            game_id: game_id.clone(),
                        },
                    )
                    .await;
            }

            // Best effort, off the request path: a failed score write must
            // never block or roll back the game.
            let scores = self.scores.clone();
            tokio::spawn(async move {
                for score in notice.scores {
                    if let Err(e) = scores.record_score(score.clone()).await {
                        error!(
                            "Failed to persist score for {} in game {}: {:#}",
                            score.player_name, score.game_id, e
                        );
                    }
                }
            });
        }

        Ok(())
    }

    async fn handle_chat_message(
        &self,
        game_id: String,
        message: String,
        player_name: String,
    ) -> Result<(), String> {
        if message.trim().is_empty() || player_name.trim().is_empty() {
            return self.send_error("Chat message and sender must not be empty").await;
        }

        let room = match self.registry.get(&game_id).await {
            Ok(room) => room,
            Err(_) => {
                let err = GameError::ChatNotFound { game_id };
                return self.send_error(&err.to_string()).await;
            }
        };

        let entry = {
            let mut room = room.lock().await;
            room.touch();
            room.chat.add(&player_name, &message)
        };

        self.connection_manager
            .send_to_game(&game_id, ServerMessage::ChatMessage(entry))
            .await;
        Ok(())
    }

    async fn handle_request_new_game(&self, game_id: String) -> Result<(), String> {
        let room = match self.registry.get(&game_id).await {
            Ok(room) => room,
            Err(e) => return self.send_error(&e.to_string()).await,
        };

        enum Followup {
            Ask { requested_by: String, others: Vec<PlayerId> },
            Started(hangman_types::GameSnapshot),
        }

        let followup = {
            let mut room = room.lock().await;
            room.touch();
            let player_id = self.player_id();

            let outcome = {
                let GameRoom { game, rematch, .. } = &mut *room;
                match rematch.request(game, player_id) {
                    Ok(outcome) => outcome,
                    Err(e) => return self.send_error(&e.to_string()).await,
                }
            };

            match outcome {
                RequestOutcome::Opened => {
                    let requested_by = room
                        .game
                        .players()
                        .iter()
                        .find(|p| p.id == player_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    let others = room
                        .game
                        .players()
                        .iter()
                        .filter(|p| p.id != player_id)
                        .map(|p| p.id)
                        .collect();
                    Followup::Ask {
                        requested_by,
                        others,
                    }
                }
                RequestOutcome::SoloAccepted => {
                    match self.start_rematch_round(&mut room) {
                        Ok(snapshot) => Followup::Started(snapshot),
                        Err(message) => return self.send_error(&message).await,
                    }
                }
            }
        };

        match followup {
            Followup::Ask {
                requested_by,
                others,
            } => {
                for player_id in others {
                    let _ = self
                        .connection_manager
                        .send_to_connection(
                            ConnectionId::from_player(player_id),
                            ServerMessage::NewGameRequested {
                                requested_by: requested_by.clone(),
                            },
                        )
                        .await;
                }
            }
            Followup::Started(snapshot) => {
                self.broadcast_new_round(&game_id, snapshot).await;
            }
        }
        Ok(())
    }

    async fn handle_new_game_response(
        &self,
        game_id: String,
        accepted: bool,
    ) -> Result<(), String> {
        let room = match self.registry.get(&game_id).await {
            Ok(room) => room,
            Err(e) => return self.send_error(&e.to_string()).await,
        };

        enum Followup {
            Tally { received: u32, total: u32 },
            Started(hangman_types::GameSnapshot),
            Rejected,
        }

        let followup = {
            let mut room = room.lock().await;
            room.touch();

            let outcome = {
                let GameRoom { game, rematch, .. } = &mut *room;
                match rematch.handle_response(game, self.player_id(), accepted) {
                    Ok(outcome) => outcome,
                    Err(e) => return self.send_error(&e.to_string()).await,
                }
            };

            match outcome {
                VoteOutcome::Waiting(progress) => Followup::Tally {
                    received: progress.received,
                    total: progress.total,
                },
                VoteOutcome::Accepted => match self.start_rematch_round(&mut room) {
                    Ok(snapshot) => Followup::Started(snapshot),
                    Err(message) => return self.send_error(&message).await,
                },
                VoteOutcome::Rejected => Followup::Rejected,
            }
        };

        match followup {
            Followup::Tally { received, total } => {
                self.connection_manager
                    .send_to_game(
                        &game_id,
                        ServerMessage::WaitingForResponses { received, total },
                    )
                    .await;
            }
            Followup::Started(snapshot) => {
                self.broadcast_new_round(&game_id, snapshot).await;
            }
            Followup::Rejected => {
                self.connection_manager
                    .send_to_game(
                        &game_id,
                        ServerMessage::ReturnToMenu {
                            message: "New game rejected. Returning to menu...".to_string(),
                        },
                    )
                    .await;
            }
        }
        Ok(())
    }

    /// Draw a fresh word, reset the round, and wipe the round's chat.
    fn start_rematch_round(&self, room: &mut GameRoom) -> Result<hangman_types::GameSnapshot, String> {
        let word = self.registry.next_word().map_err(|e| {
            error!("Failed to draw rematch word: {:#}", e);
            "Failed to start new game".to_string()
        })?;
        room.game.reset(word);
        room.chat.clear();
        Ok(room.game.snapshot())
    }

    async fn broadcast_new_round(&self, game_id: &str, snapshot: hangman_types::GameSnapshot) {
        self.connection_manager
            .send_to_game(
                game_id,
                ServerMessage::NewGameStarted {
                    message: "All players accepted! Starting new game!".to_string(),
                    game_state: snapshot,
                },
            )
            .await;
    }

    async fn register_membership(&self, game_id: &str, player_name: &str) {
        self.connection_manager
            .set_player_name(self.connection_id, player_name)
            .await;
        self.connection_manager
            .set_connection_game(self.connection_id, Some(game_id.to_string()))
            .await;
    }

    /// Disconnect is the only cancellation signal: treat it as a leave for
    /// whatever game this connection was seated in.
    pub async fn handle_disconnect(&self) {
        let Some(connection) = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
        else {
            return;
        };
        let Some(game_id) = connection.game_id else {
            return;
        };
        let Ok(room) = self.registry.get(&game_id).await else {
            return;
        };

        let (ended_snapshot, now_empty) = {
            let mut room = room.lock().await;
            room.touch();
            let outcome = room.game.remove_player(self.player_id());
            let snapshot = match outcome {
                Ok(RemoveOutcome::RoundEnded) => Some(room.game.snapshot()),
                Ok(RemoveOutcome::Left) | Err(_) => None,
            };
            (snapshot, room.game.is_empty())
        };

        if let Some(game_state) = ended_snapshot {
            self.connection_manager
                .send_to_game(
                    &game_id,
                    ServerMessage::PlayerLeft {
                        message: "Other player left the game".to_string(),
                        game_state,
                    },
                )
                .await;
        }

        if now_empty {
            if let Err(e) = self.registry.remove(&game_id).await {
                error!("Failed to remove empty game {}: {}", game_id, e);
            }
        }
    }
}
