use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use hangman_core::{ChatLog, Game, GameRules, RematchVote, WordProvider};
use hangman_types::{GameError, GameStatus, PlayerId};

const GAME_ID_LENGTH: usize = 6;
const GAME_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Everything owned per game id, kept behind a single mutex so that no
/// two intents for the same game can interleave.
#[derive(Debug)]
pub struct GameRoom {
    pub game: Game,
    pub rematch: RematchVote,
    pub chat: ChatLog,
    last_activity: Instant,
}

impl GameRoom {
    fn new(game: Game) -> Self {
        Self {
            game,
            rematch: RematchVote::new(),
            chat: ChatLog::new(),
            last_activity: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn is_abandoned(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout || self.game.is_empty()
    }
}

/// Owns the lifetime of every in-memory game and serializes access per
/// game id. Unrelated games proceed fully in parallel; the registry map
/// lock is only held for lookups, creation, and the find-or-create step
/// of public matchmaking.
///
/// Lock ordering: registry map before room mutex, never the reverse.
pub struct GameRegistry {
    rooms: RwLock<HashMap<String, Arc<Mutex<GameRoom>>>>,
    words: Arc<dyn WordProvider>,
    rules: GameRules,
}

impl GameRegistry {
    pub fn new(words: Arc<dyn WordProvider>, rules: GameRules) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            words,
            rules,
        }
    }

    pub fn next_word(&self) -> Result<String> {
        self.words.next_word().context("failed to draw a word")
    }

    /// Create a fresh game with a collision-checked short id.
    pub async fn create_game(&self, is_public: bool) -> Result<(String, Arc<Mutex<GameRoom>>)> {
        let word = self.next_word()?;
        let mut rooms = self.rooms.write().await;

        let id = loop {
            let candidate = generate_game_id();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Arc::new(Mutex::new(GameRoom::new(Game::with_rules(
            id.clone(),
            word,
            is_public,
            self.rules,
        ))));
        rooms.insert(id.clone(), room.clone());

        info!("Created {} game {}", if is_public { "public" } else { "private" }, id);
        Ok((id, room))
    }

    pub async fn get(&self, game_id: &str) -> Result<Arc<Mutex<GameRoom>>, GameError> {
        let rooms = self.rooms.read().await;
        rooms.get(game_id).cloned().ok_or(GameError::GameNotFound {
            game_id: game_id.to_string(),
        })
    }

    pub async fn remove(&self, game_id: &str) -> Result<(), GameError> {
        let mut rooms = self.rooms.write().await;
        match rooms.remove(game_id) {
            Some(_) => {
                info!("Removed game {}", game_id);
                Ok(())
            }
            None => Err(GameError::GameNotFound {
                game_id: game_id.to_string(),
            }),
        }
    }

    /// Public matchmaking: seat the player in the first public game with a
    /// free seat, creating one when none exists. The whole find-or-create
    /// runs under the map write lock so two concurrent joins cannot both
    /// claim the last seat or spawn duplicate games.
    pub async fn join_public_game(
        &self,
        player_id: PlayerId,
        player_name: &str,
    ) -> Result<(String, Arc<Mutex<GameRoom>>)> {
        let mut rooms = self.rooms.write().await;

        for (id, room_arc) in rooms.iter() {
            let mut room = room_arc.lock().await;
            if room.game.is_public() && room.game.status() == GameStatus::Waiting {
                room.game.add_player(player_id, player_name)?;
                room.touch();
                return Ok((id.clone(), room_arc.clone()));
            }
        }

        let word = self.next_word()?;
        let id = loop {
            let candidate = generate_game_id();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let mut game = Game::with_rules(id.clone(), word, true, self.rules);
        game.add_player(player_id, player_name)?;

        let room = Arc::new(Mutex::new(GameRoom::new(game)));
        rooms.insert(id.clone(), room.clone());
        info!("Created public game {} via matchmaking", id);
        Ok((id, room))
    }

    pub async fn game_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    /// Evict games that have been idle past the timeout or have no seated
    /// players left.
    pub async fn cleanup_abandoned_games(&self, timeout: Duration) {
        let mut rooms = self.rooms.write().await;
        let mut expired = Vec::new();

        for (id, room_arc) in rooms.iter() {
            let room = room_arc.lock().await;
            if room.is_abandoned(timeout) {
                expired.push(id.clone());
            }
        }

        for id in expired {
            rooms.remove(&id);
            info!("Removed abandoned game {}", id);
        }
    }
}

fn generate_game_id() -> String {
    let mut rng = rand::thread_rng();
    (0..GAME_ID_LENGTH)
        .map(|_| {
            let index = rng.gen_range(0..GAME_ID_ALPHABET.len());
            GAME_ID_ALPHABET[index] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangman_core::WordList;
    use uuid::Uuid;

    fn test_registry() -> GameRegistry {
        let words = Arc::new(WordList::with_seed(["cat", "dog", "bird"], 11).unwrap());
        GameRegistry::new(words, GameRules::default())
    }

    #[tokio::test]
    async fn create_lookup_remove_lifecycle() {
        let registry = test_registry();
        let (id, room) = registry.create_game(false).await.unwrap();
        assert_eq!(id.len(), GAME_ID_LENGTH);
        assert_eq!(room.lock().await.game.id(), id);

        assert!(registry.get(&id).await.is_ok());
        registry.remove(&id).await.unwrap();
        assert!(matches!(
            registry.get(&id).await,
            Err(GameError::GameNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn remove_unknown_game_is_an_error() {
        let registry = test_registry();
        assert!(matches!(
            registry.remove("nosuch").await,
            Err(GameError::GameNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn public_join_prefers_existing_open_game() {
        let registry = test_registry();
        let (first_id, _) = registry
            .join_public_game(Uuid::new_v4(), "alice")
            .await
            .unwrap();
        let (second_id, room) = registry
            .join_public_game(Uuid::new_v4(), "bob")
            .await
            .unwrap();

        assert_eq!(first_id, second_id);
        assert_eq!(room.lock().await.game.player_count(), 2);
        assert_eq!(registry.game_count().await, 1);
    }

    #[tokio::test]
    async fn private_games_are_invisible_to_matchmaking() {
        let registry = test_registry();
        let (private_id, room) = registry.create_game(false).await.unwrap();
        room.lock()
            .await
            .game
            .add_player(Uuid::new_v4(), "alice")
            .unwrap();

        let (public_id, _) = registry
            .join_public_game(Uuid::new_v4(), "bob")
            .await
            .unwrap();
        assert_ne!(private_id, public_id);
    }

    #[tokio::test]
    async fn concurrent_public_joins_fill_the_same_game() {
        let registry = Arc::new(test_registry());

        // One public game already waiting with a single seated player.
        let (open_id, _) = registry
            .join_public_game(Uuid::new_v4(), "alice")
            .await
            .unwrap();

        let a = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry.join_public_game(Uuid::new_v4(), "bob").await
            })
        };
        let b = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry.join_public_game(Uuid::new_v4(), "carol").await
            })
        };

        let (first_id, _) = a.await.unwrap().unwrap();
        let (second_id, _) = b.await.unwrap().unwrap();

        // Both racers must land in the one open game, filling it to 3/3;
        // the find-or-create step must not spawn a duplicate.
        assert_eq!(first_id, open_id);
        assert_eq!(second_id, open_id);
        let room = registry.get(&open_id).await.unwrap();
        let room = room.lock().await;
        assert_eq!(room.game.player_count(), 3);
        assert_eq!(room.game.status(), GameStatus::Playing);
        assert_eq!(registry.game_count().await, 1);
    }

    #[tokio::test]
    async fn matchmaking_skips_full_games() {
        let registry = test_registry();

        for name in ["alice", "bob", "carol"] {
            registry.join_public_game(Uuid::new_v4(), name).await.unwrap();
        }
        assert_eq!(registry.game_count().await, 1);

        // The only public game is now playing; the next join gets a new one.
        let (new_id, room) = registry
            .join_public_game(Uuid::new_v4(), "dave")
            .await
            .unwrap();
        assert_eq!(registry.game_count().await, 2);
        assert_eq!(room.lock().await.game.player_count(), 1);
        assert!(registry.get(&new_id).await.is_ok());
    }

    #[tokio::test]
    async fn cleanup_evicts_empty_games() {
        let registry = test_registry();
        let (_id, _room) = registry.create_game(true).await.unwrap();
        assert_eq!(registry.game_count().await, 1);

        // Nobody ever joined, so the room is empty and collectable.
        registry
            .cleanup_abandoned_games(Duration::from_secs(3600))
            .await;
        assert_eq!(registry.game_count().await, 0);
    }
}
