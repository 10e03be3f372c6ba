//! Gateway: HTTP + WebSocket front end of the cooking assistant.
//!
//! Lifecycle:
//! 1. Load config, build collaborators and the conversation engine
//! 2. Bind the listener
//! 3. Accept chat WebSockets at `/ws/chat/{client_id}` and audio uploads
//! 4. Serve until ctrl-c
//!
//! Conversation logic lives in `chefjunior-chat`; this crate owns the
//! connection registry and the transport.

pub mod server;
pub mod services;
pub mod state;
pub mod upload_routes;
pub mod ws;
