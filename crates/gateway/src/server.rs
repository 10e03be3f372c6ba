use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{ConnectInfo, DefaultBodyLimit, Path, State, WebSocketUpgrade},
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    chefjunior_config::ChefJuniorConfig,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
};

use crate::{
    services::gateway_state_from_config,
    state::GatewayState,
    upload_routes::{MAX_UPLOAD_SIZE, upload_audio},
    ws::handle_connection,
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ws/chat/{client_id}", get(ws_upgrade_handler))
        .route("/api/v1/chat/{client_id}", get(ws_upgrade_handler))
        .route(
            "/api/v1/chat/upload-audio/{client_id}",
            post(upload_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { gateway: state })
}

/// Start the gateway HTTP + WebSocket server and serve until ctrl-c.
pub async fn start_gateway(config: ChefJuniorConfig) -> anyhow::Result<()> {
    let listener =
        tokio::net::TcpListener::bind((config.server.bind.as_str(), config.server.port)).await?;
    let addr = listener.local_addr()?;
    let state = gateway_state_from_config(&config);

    // Startup banner.
    let lines = [
        format!("chefjunior gateway v{}", state.version),
        format!("listening on http://{addr}"),
        format!("chat: ws://{addr}/ws/chat/{{client_id}}"),
        format!("llm: {} @ {}", config.assistant.model, config.providers.openai.base_url),
        format!("stt: {}", config.voice.whisper.model),
        format!(
            "config: {}",
            chefjunior_config::find_or_default_config_path().display()
        ),
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    let app = build_gateway_app(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        },
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Welcome to the ChefJunior App Backend!" }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.gateway.registry.client_count().await;
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
        "connections": count,
    }))
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.gateway, client_id, addr))
}
