use thiserror::Error;

/// Failure of a single chat completion call.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was configured, the request was never sent.
    #[error("{provider} API key not configured")]
    NotConfigured { provider: &'static str },

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{provider} API error HTTP {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("malformed {provider} response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },

    /// The response decoded but carried no assistant text.
    #[error("{provider} returned an empty reply")]
    EmptyReply { provider: &'static str },
}

impl Error {
    #[must_use]
    pub fn malformed(provider: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            provider,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
