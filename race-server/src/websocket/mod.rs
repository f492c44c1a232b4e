use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::service::GameService;
use race_types::{ConnectionId, ServerMessage};

pub mod handlers;


use handlers::MessageHandler;

/// Runs one player socket from upgrade to close.
///
/// The socket is registered under a fresh id, then two pumps run until
/// either side stops: frames in are dispatched to the service, queued
/// server messages go out as JSON text. Cleanup always runs afterwards.
pub async fn handle_connection(socket: WebSocket, service: Arc<GameService>) {
    let id = ConnectionId::new();

    let outbox = match service.connect(id).await {
        Ok(outbox) => outbox,
        Err(e) => {
            error!("Rejecting socket {}: {}", id, e);
            return;
        }
    };
    info!("Player {} connected", id);

    let (sink, stream) = socket.split();
    let handler = MessageHandler::new(id, service);

    tokio::select! {
        _ = pump_inbound(stream, &handler) => debug!("Inbound side of {} finished", id),
        _ = pump_outbound(sink, outbox, id) => debug!("Outbound side of {} finished", id),
    }

    handler.handle_disconnect().await;
    info!("Player {} disconnected", id);
}

async fn pump_inbound(mut stream: SplitStream<WebSocket>, handler: &MessageHandler) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(frame) if frame.is_close() => return,
            Ok(frame) => handler.handle_frame(frame).await,
            Err(e) => {
                warn!("Read error on {}: {}", handler.connection_id(), e);
                return;
            }
        }
    }
}

async fn pump_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox: UnboundedReceiver<ServerMessage>,
    id: ConnectionId,
) {
    while let Some(message) = outbox.recv().await {
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                error!("Cannot encode {:?} for {}: {}", message, id, e);
                continue;
            }
        };

        if let Err(e) = sink.send(Message::text(text)).await {
            warn!("Write error on {}: {}", id, e);
            return;
        }
    }
}
