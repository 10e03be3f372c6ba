//! Audio upload side channel.
//!
//! `POST /api/v1/chat/upload-audio/{client_id}` accepts raw binary audio.
//! The request is acknowledged with `202 Accepted` straight away; the
//! transcription echo and the assistant reply arrive later over the client's
//! WebSocket, never in the upload response. A client with no open channel
//! gets no notices and keeps no history from the upload.

use {
    axum::{
        Json,
        body::Bytes,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
    },
    chefjunior_chat::AudioUpload,
    tracing::{debug, info},
};

use crate::server::AppState;

/// Maximum upload size: 25 MB (also used as the route-level body limit).
pub const MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

/// `POST /api/v1/chat/upload-audio/{client_id}`
///
/// `Content-Type` defaults to `application/octet-stream` when absent.
/// Optional `X-Filename` header for custom filenames.
pub async fn upload_audio(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "status": "error", "error": "empty body" })),
        )
            .into_response();
    }

    if body.len() > MAX_UPLOAD_SIZE {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({
                "status": "error",
                "error": format!("body exceeds maximum upload size ({} bytes)", MAX_UPLOAD_SIZE),
            })),
        )
            .into_response();
    }

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let filename = headers
        .get("x-filename")
        .and_then(|v| v.to_str().ok())
        .map(sanitize_filename)
        .unwrap_or_else(|| {
            let ts = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            format!("voice-{ts}.{}", extension_for_content_type(&content_type))
        });

    info!(
        client_id = %client_id,
        filename = %filename,
        content_type = %content_type,
        bytes = body.len(),
        "upload: audio accepted"
    );
    if !state.gateway.registry.is_connected(&client_id).await {
        debug!(client_id = %client_id, "upload: no live channel, notices will be dropped");
    }

    let upload = AudioUpload {
        audio: body,
        content_type,
        filename,
    };
    let gateway = state.gateway.clone();
    let task_client_id = client_id.clone();
    tokio::spawn(async move {
        gateway.engine.handle_audio(&task_client_id, upload).await;
        // Only a closing channel clears history, so an offline client's
        // exchange is discarded here.
        if !gateway.registry.is_connected(&task_client_id).await {
            gateway.engine.clear_history(&task_client_id).await;
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "processing", "client_id": client_id })),
    )
        .into_response()
}

/// Sanitize a user-provided filename: keep only safe characters.
fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
        .collect();
    // Strip leading dots to prevent hidden files / path traversal remnants.
    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized.to_string()
    }
}

/// Map an audio content-type to a file extension the transcription API
/// recognises.
fn extension_for_content_type(ct: &str) -> &'static str {
    let base = ct.split(';').next().unwrap_or(ct).trim();
    match base {
        "audio/ogg" | "audio/opus" => "ogg",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/flac" => "flac",
        _ => "webm",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("voice.webm"), "voice.webm");
        assert_eq!(sanitize_filename("my recording (1).m4a"), "myrecording1.m4a");
        assert_eq!(sanitize_filename("../../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("audio/webm"), "webm");
        assert_eq!(extension_for_content_type("audio/webm;codecs=opus"), "webm");
        assert_eq!(extension_for_content_type("audio/ogg"), "ogg");
        assert_eq!(extension_for_content_type("audio/mpeg"), "mp3");
        assert_eq!(extension_for_content_type("audio/x-m4a"), "m4a");
        assert_eq!(extension_for_content_type("audio/wav"), "wav");
        assert_eq!(extension_for_content_type("application/octet-stream"), "webm");
    }
}
