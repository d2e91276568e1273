use std::collections::HashMap;
use std::time::Instant;

use hangman_types::{
    GameError, GameSnapshot, GameStatus, Player, PlayerId, ScoredPlayer,
};

/// A game starts as soon as the third player is seated.
pub const MAX_PLAYERS: usize = 3;
/// Wrong guesses available per round.
pub const STARTING_GUESSES: u8 = 8;
/// Client-side turn countdown, surfaced in snapshots.
pub const TURN_SECONDS: u32 = 10;

/// Per-game policy knobs. Name uniqueness is a policy, not an invariant:
/// deployments that want duplicate display names can leave it off.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameRules {
    pub unique_names: bool,
}

/// A single turn's input. The timeout sentinel comes from the client after
/// its countdown expires and burns the turn without consuming a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Letter(char),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    Continue { points: i32 },
    Win { points: i32, word: String },
    Lose { points: i32, word: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The departure ended a running round.
    RoundEnded,
    /// The player left a waiting or finished game.
    Left,
}

/// Turn-based hangman state machine for up to three players.
///
/// The word is fixed for a round, guessed letters grow monotonically, and
/// every accepted guess advances the turn exactly once. Scores accumulate
/// across rematches within the same game id; only `reset` starts a fresh
/// round.
#[derive(Debug, Clone)]
pub struct Game {
    id: String,
    players: Vec<Player>,
    word: String,
    guessed_letters: Vec<char>,
    current_player_index: usize,
    remaining_guesses: u8,
    status: GameStatus,
    turn_started: Instant,
    scores: HashMap<PlayerId, i32>,
    is_public: bool,
    rules: GameRules,
}

impl Game {
    pub fn new(id: impl Into<String>, word: impl Into<String>, is_public: bool) -> Self {
        Self::with_rules(id, word, is_public, GameRules::default())
    }

    pub fn with_rules(
        id: impl Into<String>,
        word: impl Into<String>,
        is_public: bool,
        rules: GameRules,
    ) -> Self {
        Self {
            id: id.into(),
            players: Vec::new(),
            word: word.into().to_uppercase(),
            guessed_letters: Vec::new(),
            current_player_index: 0,
            remaining_guesses: STARTING_GUESSES,
            status: GameStatus::Waiting,
            turn_started: Instant::now(),
            scores: HashMap::new(),
            is_public,
            rules,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// The secret word. Only ever sent to clients in the game over event.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn remaining_guesses(&self) -> u8 {
        self.remaining_guesses
    }

    pub fn guessed_letters(&self) -> &[char] {
        &self.guessed_letters
    }

    pub fn turn_started(&self) -> Instant {
        self.turn_started
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// The host is whoever currently sits in the first seat.
    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.host().is_some_and(|p| p.id == player_id)
    }

    pub fn contains_player(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn score_of(&self, player_id: PlayerId) -> i32 {
        self.scores.get(&player_id).copied().unwrap_or(0)
    }

    /// Seat a player. The game auto-starts when the last seat fills:
    /// status flips to playing, the turn clock starts, and the first seat
    /// takes the first turn.
    pub fn add_player(&mut self, player_id: PlayerId, name: &str) -> Result<(), GameError> {
        if self.players.len() >= MAX_PLAYERS || self.status != GameStatus::Waiting {
            return Err(GameError::GameFullOrInProgress);
        }

        if self.rules.unique_names && self.players.iter().any(|p| p.name == name) {
            return Err(GameError::NameTaken {
                name: name.to_string(),
            });
        }

        self.players.push(Player {
            id: player_id,
            name: name.to_string(),
        });
        self.scores.entry(player_id).or_insert(0);

        if self.players.len() == MAX_PLAYERS {
            self.status = GameStatus::Playing;
            self.current_player_index = 0;
            self.turn_started = Instant::now();
            tracing::info!("Game {} is full, starting round", self.id);
        }

        Ok(())
    }

    /// Unseat a player. A departure mid-round ends the round immediately;
    /// in a waiting game the turn index is clamped and, if the host left,
    /// the new first seat inherits host privileges.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<RemoveOutcome, GameError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;

        self.players.remove(index);

        if self.status == GameStatus::Playing {
            self.status = GameStatus::Finished;
            return Ok(RemoveOutcome::RoundEnded);
        }

        if self.current_player_index >= self.players.len() {
            self.current_player_index = 0;
        }

        Ok(RemoveOutcome::Left)
    }

    /// Process one turn. `now` is injected so that elapsed-time scoring is
    /// deterministic under test; callers pass `Instant::now()`.
    ///
    /// A rejected guess returns an error without touching any state. An
    /// accepted guess (letter or timeout) advances the turn exactly once
    /// and restarts the turn clock. Terminal conditions are evaluated
    /// win-before-lose after the letter is applied.
    pub fn make_guess(&mut self, guess: Guess, now: Instant) -> Result<GuessOutcome, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::InvalidState {
                current_status: format!("{:?}", self.status).to_lowercase(),
            });
        }

        let letter = match guess {
            Guess::TimedOut => {
                self.advance_turn(now);
                return Ok(GuessOutcome::Continue { points: 0 });
            }
            Guess::Letter(letter) => letter.to_ascii_uppercase(),
        };

        if self.guessed_letters.contains(&letter) {
            return Err(GameError::AlreadyGuessed { letter });
        }

        let elapsed = now.saturating_duration_since(self.turn_started).as_secs_f64();
        self.guessed_letters.push(letter);

        let mut points = 0;
        if self.word.contains(letter) {
            points = if elapsed <= 5.0 {
                10
            } else if elapsed <= 10.0 {
                5
            } else {
                0
            };
            if let Some(current) = self.players.get(self.current_player_index) {
                *self.scores.entry(current.id).or_insert(0) += points;
            }
        } else {
            self.remaining_guesses -= 1;
        }

        self.advance_turn(now);

        if self.is_word_guessed() {
            self.status = GameStatus::Finished;
            Ok(GuessOutcome::Win {
                points,
                word: self.word.clone(),
            })
        } else if self.remaining_guesses == 0 {
            self.status = GameStatus::Finished;
            Ok(GuessOutcome::Lose {
                points,
                word: self.word.clone(),
            })
        } else {
            Ok(GuessOutcome::Continue { points })
        }
    }

    fn advance_turn(&mut self, now: Instant) {
        if !self.players.is_empty() {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
        }
        self.turn_started = now;
    }

    fn is_word_guessed(&self) -> bool {
        self.word
            .chars()
            .all(|letter| self.guessed_letters.contains(&letter))
    }

    /// Start a new round with the same seated players. Scores survive;
    /// everything round-scoped is cleared.
    pub fn reset(&mut self, new_word: impl Into<String>) {
        self.word = new_word.into().to_uppercase();
        self.guessed_letters.clear();
        self.remaining_guesses = STARTING_GUESSES;
        self.current_player_index = 0;
        self.status = GameStatus::Playing;
        self.turn_started = Instant::now();
        tracing::info!("Game {} reset for a new round", self.id);
    }

    /// Client-facing view: leaderboard-ordered players and the word with
    /// unguessed letters masked (revealed in full once finished).
    pub fn snapshot(&self) -> GameSnapshot {
        let mut players: Vec<ScoredPlayer> = self
            .players
            .iter()
            .map(|p| ScoredPlayer {
                id: p.id,
                name: p.name.clone(),
                score: self.score_of(p.id),
            })
            .collect();
        // Stable sort keeps join order for equal scores.
        players.sort_by(|a, b| b.score.cmp(&a.score));

        let word = if self.status == GameStatus::Finished {
            self.word.clone()
        } else {
            self.word
                .chars()
                .map(|letter| {
                    if self.guessed_letters.contains(&letter) {
                        letter
                    } else {
                        '_'
                    }
                })
                .collect()
        };

        GameSnapshot {
            word,
            guessed_letters: self.guessed_letters.clone(),
            remaining_guesses: self.remaining_guesses,
            current_player: self.current_player().cloned(),
            status: self.status,
            players,
            time_remaining: TURN_SECONDS,
            players_needed: (MAX_PLAYERS.saturating_sub(self.players.len())) as u32,
        }
    }
}
