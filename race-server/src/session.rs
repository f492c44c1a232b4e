use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use race_types::{ConnectionId, ServerMessage};
use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use crate::error::ServerError;

/// A connected player: identity, nickname and the way to reach them.
///
/// Clones share the nickname, so a rename is seen by every table that holds
/// a copy of the handle.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    id: ConnectionId,
    nickname: Arc<RwLock<Option<String>>>,
    connected_at: Instant,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl PlayerHandle {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            id,
            nickname: Arc::new(RwLock::new(None)),
            connected_at: Instant::now(),
            sender,
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    pub async fn nickname(&self) -> Option<String> {
        self.nickname.read().await.clone()
    }

    /// Blank names clear the nickname.
    pub async fn set_nickname(&self, nickname: &str) {
        let nickname = nickname.trim();
        let mut current = self.nickname.write().await;
        *current = (!nickname.is_empty()).then(|| nickname.to_string());
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), ServerError> {
        self.sender
            .send(message)
            .map_err(|_| ServerError::ConnectionClosed(self.id))
    }

    /// Fire-and-forget delivery. A closed connection is logged and otherwise
    /// ignored; it never undoes the state change that produced the message.
    pub fn notify(&self, message: ServerMessage) {
        if let Err(e) = self.send_message(message) {
            warn!("Dropping message for {}: {}", self.id, e);
        }
    }
}

/// Live connections by id. Knows nothing about lobby or games.
pub struct SessionRegistry {
    connections: RwLock<HashMap<ConnectionId, PlayerHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(
        &self,
        id: ConnectionId,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, ServerError> {
        let mut connections = self.connections.write().await;
        if connections.contains_key(&id) {
            return Err(ServerError::AlreadyRegistered(id));
        }

        let (handle, receiver) = PlayerHandle::new(id);
        connections.insert(id, handle);
        info!("Registered connection {}", id);
        Ok(receiver)
    }

    pub async fn lookup(&self, id: ConnectionId) -> Option<PlayerHandle> {
        let connections = self.connections.read().await;
        connections.get(&id).cloned()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        let connections = self.connections.read().await;
        connections.contains_key(&id)
    }

    /// Removes the handle and hands it back. Calling it twice is harmless;
    /// the second call returns `None`.
    pub async fn drop_session(&self, id: ConnectionId) -> Option<PlayerHandle> {
        let mut connections = self.connections.write().await;
        connections.remove(&id)
    }

    pub async fn set_nickname(&self, id: ConnectionId, nickname: &str) -> Result<(), ServerError> {
        let handle = self
            .lookup(id)
            .await
            .ok_or(ServerError::SessionNotFound(id))?;
        handle.set_nickname(nickname).await;
        Ok(())
    }

    pub async fn send_to(&self, id: ConnectionId, message: ServerMessage) -> Result<(), ServerError> {
        let handle = self
            .lookup(id)
            .await
            .ok_or(ServerError::SessionNotFound(id))?;
        handle.send_message(message)
    }

    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_drop() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();

        let _receiver = registry.register(id).await.unwrap();
        assert_eq!(registry.connection_count().await, 1);
        assert!(registry.lookup(id).await.is_some());

        let dropped = registry.drop_session(id).await.unwrap();
        assert_eq!(dropped.id(), id);
        assert!(dropped.connected_at() <= Instant::now());
        assert!(registry.drop_session(id).await.is_none());
        assert!(registry.lookup(id).await.is_none());
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();

        let _receiver = registry.register(id).await.unwrap();
        let result = registry.register(id).await;
        assert!(matches!(result, Err(ServerError::AlreadyRegistered(dup)) if dup == id));
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_nickname_is_shared_between_clones() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        let _receiver = registry.register(id).await.unwrap();

        let held_elsewhere = registry.lookup(id).await.unwrap();
        registry.set_nickname(id, "  alice ").await.unwrap();
        assert_eq!(held_elsewhere.nickname().await.as_deref(), Some("alice"));

        registry.set_nickname(id, "   ").await.unwrap();
        assert_eq!(held_elsewhere.nickname().await, None);
    }

    #[tokio::test]
    async fn test_nickname_for_unknown_connection() {
        let registry = SessionRegistry::new();
        let result = registry.set_nickname(ConnectionId::new(), "ghost").await;
        assert!(matches!(result, Err(ServerError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_delivery_to_closed_connection_is_reported() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        let receiver = registry.register(id).await.unwrap();
        drop(receiver);

        let message = ServerMessage::GameTerminated {
            reason: "test".to_string(),
        };
        let result = registry.send_to(id, message.clone()).await;
        assert!(matches!(result, Err(ServerError::ConnectionClosed(_))));

        // notify swallows the same failure
        registry.lookup(id).await.unwrap().notify(message);
    }

    #[tokio::test]
    async fn test_rapid_connect_disconnect_cycles() {
        let registry = SessionRegistry::new();
        let mut ids = Vec::new();

        for _ in 0..100 {
            let id = ConnectionId::new();
            let _receiver = registry.register(id).await.unwrap();
            ids.push(id);
        }
        assert_eq!(registry.connection_count().await, 100);

        for id in ids {
            registry.drop_session(id).await;
        }
        assert_eq!(registry.connection_count().await, 0);
    }
}
