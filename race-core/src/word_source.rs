use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;

use crate::CoreError;

/// Hands out a random word per call. Repeats are allowed; callers that need
/// unique words filter themselves.
pub trait WordSource: Send + Sync {
    fn random_word(&self) -> String;
}

const BUILTIN_WORDS: &[&str] = &[
    "apple", "banana", "cherry", "orange", "lemon", "mango", "peach", "grape",
    "melon", "plum", "house", "window", "garden", "bridge", "castle", "tower",
    "street", "market", "harbor", "village", "river", "mountain", "forest", "valley",
    "island", "ocean", "desert", "meadow", "canyon", "glacier", "keyboard", "monitor",
    "printer", "network", "socket", "binary", "compiler", "kernel", "thread", "buffer",
    "rocket", "planet", "comet", "galaxy", "orbit", "launch", "signal", "engine",
    "battery", "circuit", "yellow", "purple", "silver", "crimson", "violet", "marble",
    "copper", "bronze", "scarlet", "amber", "winter", "summer", "autumn", "spring",
    "thunder", "breeze", "sunrise", "shadow", "frost", "storm", "typing", "racing",
    "swift", "rapid", "sprint", "victory", "champion", "player", "rival", "referee",
];

/// In-memory word pool with uniform random selection.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Parse a newline separated list. Blank lines and `#` comments are
    /// skipped; words are trimmed, lower-cased and deduplicated.
    pub fn from_word_list(word_list: &str) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        let words: Vec<String> = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .filter(|word| seen.insert(word.clone()))
            .collect();

        if words.is_empty() {
            return Err(CoreError::EmptyWordList);
        }

        Ok(Self { words })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read word file {}", path.display()))?;
        let list = Self::from_word_list(&contents)
            .with_context(|| format!("no usable words in {}", path.display()))?;
        tracing::info!("Loaded {} words from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|word| word.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }
}

impl WordSource for WordList {
    fn random_word(&self) -> String {
        let index = rand::rng().random_range(0..self.words.len());
        self.words[index].clone()
    }
}
