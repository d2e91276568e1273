use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use hangman_types::{PlayerId, ServerMessage};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Socket identity. Doubles as the player id: a seat in a game belongs to
/// the connection that joined it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_player(player_id: PlayerId) -> Self {
        Self(player_id)
    }

    pub fn player_id(&self) -> PlayerId {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub player_name: Option<String>,
    pub game_id: Option<String>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();

        let connection = Self {
            id,
            player_name: None,
            game_id: None,
            connected_at: now,
            last_activity: now,
            sender,
        };

        (connection, receiver)
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_inactive(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Tracks live sockets and fans broadcasts out to every connection
/// associated with a game channel.
pub struct ConnectionManager {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_connection(
        &self,
        id: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (conn, receiver) = Connection::new(id);

        let mut connections = self.connections.write().await;
        connections.insert(id, conn);

        receiver
    }

    pub async fn remove_connection(&self, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        connections.remove(&id);
    }

    pub async fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        let connections = self.connections.read().await;
        connections.get(&id).cloned()
    }

    pub async fn update_activity(&self, id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.update_activity();
        }
    }

    pub async fn set_connection_game(&self, id: ConnectionId, game_id: Option<String>) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.game_id = game_id;
        }
    }

    pub async fn set_player_name(&self, id: ConnectionId, name: &str) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&id) {
            connection.player_name = Some(name.to_string());
        }
    }

    pub async fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connections = self.connections.read().await;
        if let Some(connection) = connections.get(&id) {
            connection.send_message(message)
        } else {
            Err("Connection not found".to_string())
        }
    }

    /// Broadcast to every connection in a game channel. Individual send
    /// failures are ignored; dead sockets get reaped by their own loop.
    pub async fn send_to_game(&self, game_id: &str, message: ServerMessage) {
        let connections = self.connections.read().await;
        for connection in connections.values() {
            if connection.game_id.as_deref() == Some(game_id) {
                let _ = connection.send_message(message.clone());
            }
        }
    }

    pub async fn cleanup_inactive_connections(&self, timeout: Duration) {
        let inactive: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .filter(|conn| conn.is_inactive(timeout))
                .map(|conn| conn.id)
                .collect()
        };

        for connection_id in inactive {
            tracing::info!("Removing inactive connection: {}", connection_id);
            self.remove_connection(connection_id).await;
        }
    }

    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
