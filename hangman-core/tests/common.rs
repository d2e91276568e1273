use hangman_core::{Game, MAX_PLAYERS, WordList};
use hangman_types::PlayerId;
use uuid::Uuid;

/// Creates a deterministic word list for tests
pub fn test_word_list() -> WordList {
    WordList::with_seed(["cat", "dog", "bird", "fish"], 7).unwrap()
}

/// Creates a fully seated game with the given word, returning the seat ids
/// in join order
pub fn seated_game(word: &str) -> (Game, Vec<PlayerId>) {
    let mut game = Game::new("abc123", word, false);
    let ids: Vec<PlayerId> = (0..MAX_PLAYERS).map(|_| Uuid::new_v4()).collect();
    for (i, id) in ids.iter().enumerate() {
        game.add_player(*id, &format!("player{}", i)).unwrap();
    }
    (game, ids)
}
