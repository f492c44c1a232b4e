use std::collections::HashMap;

use race_core::ScorePair;
use race_types::{ConnectionId, RoundScore};
use tokio::sync::RwLock;

/// Append-only round history per connection. Lives as long as the session.
pub struct ScoreLedger {
    entries: RwLock<HashMap<ConnectionId, Vec<RoundScore>>>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Appends to `id`'s history and sets the record's `index` to its
    /// position there.
    pub async fn append(&self, id: ConnectionId, score: RoundScore) {
        let mut entries = self.entries.write().await;
        push_indexed(entries.entry(id).or_default(), score);
    }

    /// Stores both sides of a round under one write lock, so readers never
    /// see one half without the other. Each side is indexed against its own
    /// history.
    pub async fn append_pair(&self, loser: ConnectionId, winner: ConnectionId, pair: ScorePair) {
        let mut entries = self.entries.write().await;
        push_indexed(entries.entry(loser).or_default(), pair.player);
        push_indexed(entries.entry(winner).or_default(), pair.opponent);
    }

    pub async fn all_for(&self, id: ConnectionId) -> Vec<RoundScore> {
        let entries = self.entries.read().await;
        entries.get(&id).cloned().unwrap_or_default()
    }

    pub async fn remove(&self, id: ConnectionId) -> Option<Vec<RoundScore>> {
        let mut entries = self.entries.write().await;
        entries.remove(&id)
    }
}

fn push_indexed(history: &mut Vec<RoundScore>, mut score: RoundScore) {
    score.index = history.len() as u32;
    history.push(score);
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new()
    }
}
