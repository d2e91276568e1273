use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of secret words for new rounds. Injected as a dependency so
/// games never block on external lookups and tests can be deterministic.
pub trait WordProvider: Send + Sync {
    fn next_word(&self) -> Result<String>;
}

/// Built-in fallback list used when no word file is configured.
const DEFAULT_WORDS: &[&str] = &[
    "APPLE", "BANANA", "CHERRY", "DRAGON", "ELEPHANT", "FOREST", "GUITAR",
    "HARBOR", "ISLAND", "JUNGLE", "KITCHEN", "LANTERN", "MOUNTAIN", "NEEDLE",
    "ORANGE", "PUZZLE", "QUARTZ", "RABBIT", "SILVER", "THUNDER", "UMBRELLA",
    "VILLAGE", "WINDOW", "YELLOW", "ZEBRA", "BRIDGE", "CASTLE", "DESERT",
    "ENGINE", "FLOWER", "GARDEN", "HAMMER", "INSECT", "JACKET", "KERNEL",
    "LUMBER", "MARBLE", "NUGGET", "OYSTER", "PLANET",
];

/// Uniform random selection from a fixed word list, uppercased once at
/// construction.
pub struct WordList {
    words: Vec<String>,
    rng: Mutex<StdRng>,
}

impl WordList {
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(anyhow!("word list is empty"));
        }

        Ok(Self {
            words,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// One word per line, blank lines ignored.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow!("failed to read word list {}: {}", path.as_ref().display(), e)
        })?;
        Self::from_words(contents.lines())
    }

    pub fn builtin() -> Self {
        Self::from_words(DEFAULT_WORDS).expect("built-in word list is non-empty")
    }

    /// Deterministic draws for tests.
    pub fn with_seed<I, S>(words: I, seed: u64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::from_words(words)?;
        list.rng = Mutex::new(StdRng::seed_from_u64(seed));
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordProvider for WordList {
    fn next_word(&self) -> Result<String> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow!("word list rng poisoned"))?;
        let index = rng.gen_range(0..self.words.len());
        Ok(self.words[index].clone())
    }
}
