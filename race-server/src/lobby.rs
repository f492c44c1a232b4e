use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use race_core::Clock;
use race_types::ConnectionId;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::session::PlayerHandle;

#[derive(Debug, Clone)]
pub struct LobbyEntry {
    pub player: PlayerHandle,
    pub queued_at: DateTime<Utc>,
    sequence: u64,
}

#[derive(Debug)]
pub enum JoinOutcome {
    /// Nobody to play against yet; the joiner is parked.
    Waiting,
    /// The joiner was already parked. Nothing changed.
    AlreadyWaiting,
    /// The joiner was paired with the oldest waiting player, who has left
    /// the lobby.
    Matched {
        joiner: PlayerHandle,
        opponent: PlayerHandle,
    },
}

/// The waiting pool itself. Plain data; [`Lobby`] wraps it in a lock.
#[derive(Debug, Default)]
pub struct LobbyQueue {
    entries: VecDeque<LobbyEntry>,
    next_sequence: u64,
}

impl LobbyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a player. Returns `false` if they are already waiting.
    pub fn enqueue(&mut self, player: PlayerHandle, now: DateTime<Utc>) -> bool {
        if self.contains(player.id()) {
            return false;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        info!("Player {} waiting in lobby", player.id());
        self.entries.push_back(LobbyEntry {
            player,
            queued_at: now,
            sequence,
        });
        true
    }

    /// Removes the oldest waiting entry other than `joiner` and pairs it with
    /// the joiner. Oldest means earliest `queued_at`, ties going to the
    /// earlier insertion.
    pub fn try_match(&mut self, joiner: &PlayerHandle) -> Option<(PlayerHandle, PlayerHandle)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.player.id() != joiner.id())
            .min_by_key(|(_, entry)| (entry.queued_at, entry.sequence))
            .map(|(index, _)| index)?;

        let waiting = self.entries.remove(index)?;
        Some((joiner.clone(), waiting.player))
    }

    /// Check-then-remove in one step: pair the joiner with the oldest
    /// waiting player or park them.
    pub fn join(&mut self, player: PlayerHandle, now: DateTime<Utc>) -> JoinOutcome {
        if self.contains(player.id()) {
            return JoinOutcome::AlreadyWaiting;
        }

        match self.try_match(&player) {
            Some((joiner, opponent)) => JoinOutcome::Matched { joiner, opponent },
            None => {
                self.enqueue(player, now);
                JoinOutcome::Waiting
            }
        }
    }

    pub fn remove(&mut self, id: ConnectionId) -> bool {
        match self.entries.iter().position(|entry| entry.player.id() == id) {
            Some(index) => {
                self.entries.remove(index);
                info!("Player {} removed from lobby", id);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.iter().any(|entry| entry.player.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn waiting_ids(&self) -> Vec<ConnectionId> {
        self.entries.iter().map(|entry| entry.player.id()).collect()
    }
}

/// Lock around the waiting pool.
///
/// Callers that must check other tables before matching (a player already in
/// a game may not join) hold [`Lobby::lock`] for the whole sequence.
pub struct Lobby {
    queue: Mutex<LobbyQueue>,
    clock: Arc<dyn Clock>,
}

impl Lobby {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            queue: Mutex::new(LobbyQueue::new()),
            clock,
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, LobbyQueue> {
        self.queue.lock().await
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn join(&self, player: PlayerHandle) -> JoinOutcome {
        let now = self.now();
        self.lock().await.join(player, now)
    }

    pub async fn remove(&self, id: ConnectionId) -> bool {
        self.lock().await.remove(id)
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.lock().await.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.lock().await.len()
    }
}
