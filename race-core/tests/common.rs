#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use race_core::{Clock, GameState, WordSource};
use race_types::ConnectionId;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns the scripted words in order, then repeats the last one forever.
pub struct ScriptedWords {
    words: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl ScriptedWords {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: Mutex::new(words.iter().map(|w| w.to_string()).collect()),
            last: Mutex::new(words.last().map(|w| w.to_string()).unwrap_or_default()),
        }
    }
}

impl WordSource for ScriptedWords {
    fn random_word(&self) -> String {
        match self.words.lock().unwrap().pop_front() {
            Some(word) => {
                *self.last.lock().unwrap() = word.clone();
                word
            }
            None => self.last.lock().unwrap().clone(),
        }
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance_ms(&self, ms: i64) {
        *self.now.lock().unwrap() += Duration::milliseconds(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Two fresh players and a game with its first round already open.
pub fn started_game(words: &ScriptedWords, clock: &ManualClock) -> (GameState, ConnectionId, ConnectionId) {
    let (a, b) = (ConnectionId::new(), ConnectionId::new());
    let mut state = GameState::new(a, b, clock.now());
    state
        .start_round(words, clock.now(), 1_000)
        .expect("scripted source has an unused word");
    (state, a, b)
}
