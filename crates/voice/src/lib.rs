//! Speech-to-Text for uploaded voice messages.
//!
//! Provides the provider-agnostic [`SttProvider`] abstraction and the OpenAI
//! Whisper implementation.

pub mod stt;

pub use stt::{SttProvider, TranscribeRequest, Transcript, WhisperStt};
