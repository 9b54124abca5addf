use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::service::GameService;
use relay_types::{ClientMessage, GameError, SubmitOutcome};

/// Drives one WebSocket for its whole life: resolve the player, register
/// the connection, then pump events out and messages in until either side
/// ends.
pub async fn handle_connection(websocket: WebSocket, browser_id: String, service: Arc<GameService>) {
    let (mut ws_sender, mut ws_receiver) = websocket.split();

    let (identity, handle) = match service.connect(&browser_id).await {
        Ok(connected) => connected,
        Err(error) => {
            warn!(browser_id, code = error.code(), "connection refused");
            let body = serde_json::json!({
                "event": "error",
                "data": { "code": error.code(), "message": error.to_string() },
            });
            let _ = ws_sender.send(Message::text(body.to_string())).await;
            let _ = ws_sender.close().await;
            return;
        }
    };
    let connection_id = handle.id;
    info!(browser_id, connection = %connection_id, nickname = identity.nickname, "websocket connected");

    // Incoming: client messages drive submissions and heartbeats.
    let incoming_handler = {
        let service = service.clone();
        let browser_id = browser_id.clone();
        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if let Err(error) = handle_message(msg, &browser_id, &service).await {
                            error!(browser_id, %error, "error handling message");
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(browser_id, %error, "websocket error");
                        break;
                    }
                }
            }
        }
    };

    // Outgoing: drain the registry's event queue onto the socket.
    let outgoing_handler = {
        let browser_id = browser_id.clone();
        async move {
            let mut events = handle.events;

            while let Some(event) = events.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(error) => {
                        error!(%error, "failed to serialize push event");
                        continue;
                    }
                };

                if let Err(error) = ws_sender.send(Message::text(json)).await {
                    warn!(browser_id, %error, "failed to send push event");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    info!(browser_id, connection = %connection_id, "websocket disconnected");
    service.disconnect_exact(&browser_id, connection_id).await;
}

async fn handle_message(
    msg: Message,
    browser_id: &str,
    service: &GameService,
) -> Result<(), GameError> {
    if !msg.is_text() {
        return Ok(());
    }
    let Ok(text) = msg.to_str() else {
        return Ok(());
    };

    let client_message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(error) => {
            warn!(browser_id, %error, "ignoring malformed client message");
            return Ok(());
        }
    };

    match client_message {
        ClientMessage::SubmitWord { word } => {
            let outcome = service.submit(browser_id, &word).await?;
            report_outcome(browser_id, service, outcome).await;
        }
        ClientMessage::Heartbeat => {
            service.heartbeat(browser_id).await;
        }
    }

    Ok(())
}

/// Submission feedback goes back to the submitter only; accepted words
/// already went out to everyone as a round update.
async fn report_outcome(browser_id: &str, service: &GameService, outcome: SubmitOutcome) {
    let payload = match serde_json::to_value(&outcome) {
        Ok(payload) => payload,
        Err(error) => {
            error!(%error, "failed to serialize submit outcome");
            return;
        }
    };
    service
        .publish_custom(Some(browser_id), "wordResult", payload)
        .await;
}
