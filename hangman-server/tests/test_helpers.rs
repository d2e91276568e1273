use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use hangman_core::{GameRules, WordList};
use hangman_persistence::repositories::ScoreRepository;
use hangman_persistence::ScoreStore;
use hangman_server::registry::GameRegistry;
use hangman_server::websocket::connection::{ConnectionId, ConnectionManager};
use hangman_server::websocket::handlers::MessageHandler;
use hangman_types::{ClientMessage, ServerMessage};
use migration::{Migrator, MigratorTrait};

/// Full server wiring minus the socket layer: handlers talk to real
/// connections, a real registry, and a real in-memory score store.
pub struct TestServerSetup {
    pub connection_manager: Arc<ConnectionManager>,
    pub registry: Arc<GameRegistry>,
    pub scores: Arc<dyn ScoreStore>,
}

impl TestServerSetup {
    /// Every game drawn from this setup uses the given word.
    pub async fn with_word(word: &str) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let words = Arc::new(WordList::from_words(vec![word.to_string()]).unwrap());
        let registry = Arc::new(GameRegistry::new(words, GameRules::default()));

        let db = hangman_persistence::connection::connect_to_memory_database()
            .await
            .unwrap();
        Migrator::up(&db, None).await.unwrap();
        let scores: Arc<dyn ScoreStore> = Arc::new(ScoreRepository::new(db));

        Self {
            connection_manager,
            registry,
            scores,
        }
    }

    /// Registers a connection and returns its handler plus the channel the
    /// server would drain into the websocket.
    pub async fn connect(
        &self,
    ) -> (
        ConnectionId,
        MessageHandler,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        let connection_id = ConnectionId::new();
        let receiver = self
            .connection_manager
            .create_connection(connection_id)
            .await;
        let handler = MessageHandler::new(
            connection_id,
            self.connection_manager.clone(),
            self.registry.clone(),
            self.scores.clone(),
        );
        (connection_id, handler, receiver)
    }
}

/// Receives the next outbound message, failing the test if none arrives.
pub async fn recv_message(receiver: &mut mpsc::UnboundedReceiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(1), receiver.recv())
        .await
        .expect("timed out waiting for a server message")
        .expect("connection channel closed")
}

/// Drains every message currently queued on the channel.
pub fn drain(receiver: &mut mpsc::UnboundedReceiver<ServerMessage>) {
    while receiver.try_recv().is_ok() {}
}

pub async fn send(handler: &MessageHandler, message: ClientMessage) {
    handler
        .handle_message(message)
        .await
        .expect("message handling should not fail the connection");
}

pub fn make_guess(game_id: &str, letter: &str) -> ClientMessage {
    ClientMessage::MakeGuess {
        game_id: game_id.to_string(),
        letter: letter.to_string(),
        guess_time: None,
    }
}
