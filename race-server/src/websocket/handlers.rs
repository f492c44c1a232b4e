use std::sync::Arc;
use tracing::{debug, warn};
use warp::ws::Message;

use crate::service::GameService;
use race_types::{ClientMessage, ConnectionId};

/// Turns the frames of one socket into service calls.
pub struct MessageHandler {
    connection_id: ConnectionId,
    service: Arc<GameService>,
}

impl MessageHandler {
    pub fn new(connection_id: ConnectionId, service: Arc<GameService>) -> Self {
        Self {
            connection_id,
            service,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Non-text frames and anything that isn't a known message are dropped;
    /// the connection stays up.
    pub async fn handle_frame(&self, msg: Message) {
        let Ok(text) = msg.to_str() else {
            debug!("Ignoring non-text frame from {}", self.connection_id);
            return;
        };

        match parse_client_message(text) {
            Some(message) => {
                self.service
                    .handle_message(self.connection_id, message)
                    .await
            }
            None => warn!(
                "Ignoring malformed message from {}: {}",
                self.connection_id, text
            ),
        }
    }

    pub async fn handle_disconnect(&self) {
        self.service.disconnect(self.connection_id).await;
    }
}

pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}
