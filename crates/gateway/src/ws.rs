use std::{net::SocketAddr, sync::Arc};

use {
    axum::extract::ws::{Message, WebSocket},
    futures::{SinkExt, stream::StreamExt},
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use crate::state::{ClientChannel, GatewayState};

/// Largest inbound text frame handed to the engine.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Handle a single chat WebSocket through its full lifecycle:
/// greeting → register → serial message loop → cleanup.
pub async fn handle_connection(
    socket: WebSocket,
    state: Arc<GatewayState>,
    client_id: String,
    remote_addr: SocketAddr,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<String>();

    let channel = ClientChannel::new(client_id.clone(), client_tx.clone());
    let conn_id = channel.conn_id.clone();
    info!(
        client_id = %client_id,
        conn_id = %conn_id,
        remote_ip = %remote_addr.ip(),
        "ws: new connection"
    );

    // Spawn write loop: forwards frames from the client_tx channel to the WebSocket.
    let write_conn_id = conn_id.clone();
    let write_handle = tokio::spawn(async move {
        while let Some(msg) = client_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                debug!(conn_id = %write_conn_id, "ws: write loop closed");
                break;
            }
        }
    });

    // Queued before the channel is reachable through the registry, so no
    // notice routed by client id can overtake it.
    let _ = client_tx.send(state.engine.config().greeting.clone());

    if let Some(previous) = state.registry.register(channel).await {
        info!(
            client_id = %client_id,
            conn_id = %conn_id,
            replaced_conn_id = %previous.conn_id,
            "ws: replaced existing connection"
        );
    }

    // ── Message loop ─────────────────────────────────────────────────────

    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t.to_string(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "ws: read error");
                break;
            },
        };

        if text.len() > MAX_PAYLOAD_BYTES {
            warn!(conn_id = %conn_id, size = text.len(), "ws: payload too large");
            let _ = client_tx.send(format!(
                "Your message is too long. Please keep it under {MAX_PAYLOAD_BYTES} bytes."
            ));
            continue;
        }

        if state.ws_request_logs {
            info!(
                client_id = %client_id,
                conn_id = %conn_id,
                bytes = text.len(),
                "ws: received message"
            );
        }

        let reply = state.engine.handle_text(&client_id, &text).await;
        // Routed by client id: after a reconnect the reply reaches the newest socket.
        state.registry.send_to(&client_id, &reply).await;
    }

    // ── Cleanup ──────────────────────────────────────────────────────────

    let duration = state
        .registry
        .deregister_if_current(&client_id, &conn_id)
        .await
        .map(|c| c.connected_at.elapsed());

    match duration {
        Some(duration) => {
            state.engine.clear_history(&client_id).await;
            info!(
                client_id = %client_id,
                conn_id = %conn_id,
                duration_secs = duration.as_secs(),
                "ws: connection closed"
            );
        },
        None => info!(
            client_id = %client_id,
            conn_id = %conn_id,
            "ws: superseded connection closed"
        ),
    }

    drop(client_tx);
    write_handle.abort();
}
