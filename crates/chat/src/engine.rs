//! Turns inbound utterances into assistant replies.
//!
//! Per client the conversation moves `no history → seeded → idle ⇄ awaiting
//! reply`. A history is seeded with the persona prompt on the first message,
//! grows by one `user` turn and (on success) one `assistant` turn per
//! exchange, and is discarded when the client disconnects.
//!
//! When the completion call fails the `user` turn stays in the history with
//! no matching `assistant` turn. The next exchange appends after it, so the
//! history only stops alternating on the failure path.

use std::sync::Arc;

use {
    bytes::Bytes,
    chefjunior_agents::{ChatMessage, CompletionOptions, LlmProvider},
    chefjunior_config::AssistantConfig,
    chefjunior_voice::{SttProvider, TranscribeRequest},
    tracing::{debug, info, warn},
};

use crate::{
    fallback::{CompletionFailure, ReplyOutcome},
    locks::ClientLocks,
    runtime::MessageSink,
    store::HistoryStore,
};

/// One recording received on the upload endpoint.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub audio: Bytes,
    pub content_type: String,
    pub filename: String,
}

/// What the audio path delivered to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutcome {
    /// Transcription failed; only the transcription fallback was sent.
    TranscriptionFailed,
    /// The echo notice and then `reply` were sent.
    Replied { transcript: String, reply: String },
}

pub struct ConversationEngine {
    config: AssistantConfig,
    llm: Arc<dyn LlmProvider>,
    stt: Arc<dyn SttProvider>,
    history: Arc<dyn HistoryStore>,
    sink: Arc<dyn MessageSink>,
    locks: ClientLocks,
}

impl std::fmt::Debug for ConversationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationEngine")
            .field("model", &self.llm.id())
            .field("stt", &self.stt.id())
            .finish_non_exhaustive()
    }
}

impl ConversationEngine {
    pub fn new(
        config: AssistantConfig,
        llm: Arc<dyn LlmProvider>,
        stt: Arc<dyn SttProvider>,
        history: Arc<dyn HistoryStore>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            config,
            llm,
            stt,
            history,
            sink,
            locks: ClientLocks::new(),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Answer one typed message, returning the text to deliver.
    ///
    /// Never fails: collaborator errors are logged and replaced by the
    /// configured fallback reply.
    pub async fn handle_text(&self, client_id: &str, text: &str) -> String {
        self.respond(client_id, text)
            .await
            .into_text(&self.config)
    }

    /// Run one exchange and report how it ended.
    pub async fn respond(&self, client_id: &str, text: &str) -> ReplyOutcome {
        let _guard = self.locks.acquire(client_id).await;

        let history = match self.record_user_turn(client_id, text).await {
            Ok(history) => history,
            Err(e) => {
                warn!(client_id, error = %e, "chat: history backend failed");
                return ReplyOutcome::Fallback(CompletionFailure::HistoryUnavailable);
            },
        };

        let options = CompletionOptions {
            temperature: self.config.temperature,
        };
        let response = match self.llm.complete(&history, &options).await {
            Ok(response) => response,
            Err(e) => {
                let failure = CompletionFailure::from(&e);
                warn!(
                    client_id,
                    provider = self.llm.name(),
                    model = self.llm.id(),
                    reason = ?failure,
                    error = %e,
                    "chat: completion failed"
                );
                return ReplyOutcome::Fallback(failure);
            },
        };

        if let Err(e) = self
            .history
            .append(client_id, ChatMessage::assistant(response.text.clone()))
            .await
        {
            warn!(client_id, error = %e, "chat: failed to record assistant turn");
        }

        debug!(
            client_id,
            turns = history.len() + 1,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "chat: exchange complete"
        );
        ReplyOutcome::Reply(response.text)
    }

    /// Seed the history if needed, append the user turn, and return the
    /// full sequence to send to the model.
    async fn record_user_turn(
        &self,
        client_id: &str,
        text: &str,
    ) -> chefjunior_common::Result<Vec<ChatMessage>> {
        if self
            .history
            .seed(client_id, ChatMessage::system(self.config.persona_prompt.clone()))
            .await?
        {
            debug!(client_id, "chat: history created");
        }
        self.history
            .append(client_id, ChatMessage::user(text))
            .await?;
        self.history
            .load(client_id)
            .await?
            .ok_or_else(|| chefjunior_common::Error::message("history vanished after append"))
    }

    /// Transcribe an uploaded recording and answer it, delivering every
    /// notice through the sink: first the "you said" echo, then the reply.
    ///
    /// A failed transcription sends the transcription fallback instead and
    /// records nothing in the history.
    pub async fn handle_audio(&self, client_id: &str, upload: AudioUpload) -> AudioOutcome {
        let request = TranscribeRequest::new(upload.audio, upload.filename, upload.content_type);

        let transcript = match self.stt.transcribe(request).await {
            Ok(transcript) => transcript.text,
            Err(e) => {
                warn!(client_id, provider = self.stt.id(), error = %e, "chat: transcription failed");
                self.sink
                    .send_to(client_id, &self.config.transcription_fallback)
                    .await;
                return AudioOutcome::TranscriptionFailed;
            },
        };

        let echo = format!("{}{transcript}", self.config.transcription_echo_prefix);
        if !self.sink.send_to(client_id, &echo).await {
            debug!(client_id, "chat: no channel for transcription echo");
        }

        let reply = self.handle_text(client_id, &transcript).await;
        if !self.sink.send_to(client_id, &reply).await {
            debug!(client_id, "chat: no channel for audio reply");
        }

        AudioOutcome::Replied { transcript, reply }
    }

    /// Discard the client's history. Waits for an in-flight exchange for the
    /// same client to finish first. Safe to call when no history exists.
    pub async fn clear_history(&self, client_id: &str) {
        let guard = self.locks.acquire(client_id).await;
        match self.history.remove(client_id).await {
            Ok(true) => info!(client_id, "chat: history cleared"),
            Ok(false) => {},
            Err(e) => warn!(client_id, error = %e, "chat: failed to clear history"),
        }
        drop(guard);
        self.locks.forget(client_id);
    }

    /// Snapshot of the client's history (empty when there is none).
    pub async fn history(&self, client_id: &str) -> Vec<ChatMessage> {
        self.history
            .load(client_id)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Number of clients with a live conversation.
    pub async fn active_conversations(&self) -> usize {
        self.history.client_count().await.unwrap_or_default()
    }
}
