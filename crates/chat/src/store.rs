//! Conversation history storage.
//!
//! [`HistoryStore`] is the backend seam: the in-memory implementation serves
//! single-process deployments and tests, a shared cache can implement the
//! same trait when several gateway instances serve the same clients.

use std::collections::HashMap;

use {async_trait::async_trait, chefjunior_agents::ChatMessage, tokio::sync::RwLock};

use chefjunior_common::Result;

/// Per-client ordered turn sequences keyed by `client_id`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Create the history for `client_id` with `turn` as its only entry,
    /// unless one already exists. Returns `true` when a history was created.
    async fn seed(&self, client_id: &str, turn: ChatMessage) -> Result<bool>;

    /// Append `turn` to the end of the client's history.
    async fn append(&self, client_id: &str, turn: ChatMessage) -> Result<()>;

    /// Full ordered history, or `None` when the client has none.
    async fn load(&self, client_id: &str) -> Result<Option<Vec<ChatMessage>>>;

    /// Discard the client's history. Returns `true` if one existed.
    async fn remove(&self, client_id: &str) -> Result<bool>;

    /// Number of clients with a live history.
    async fn client_count(&self) -> Result<usize>;
}

/// Process-local history map. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    histories: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn seed(&self, client_id: &str, turn: ChatMessage) -> Result<bool> {
        let mut histories = self.histories.write().await;
        if histories.contains_key(client_id) {
            return Ok(false);
        }
        histories.insert(client_id.to_string(), vec![turn]);
        Ok(true)
    }

    async fn append(&self, client_id: &str, turn: ChatMessage) -> Result<()> {
        self.histories
            .write()
            .await
            .entry(client_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn load(&self, client_id: &str) -> Result<Option<Vec<ChatMessage>>> {
        Ok(self.histories.read().await.get(client_id).cloned())
    }

    async fn remove(&self, client_id: &str) -> Result<bool> {
        Ok(self.histories.write().await.remove(client_id).is_some())
    }

    async fn client_count(&self) -> Result<usize> {
        Ok(self.histories.read().await.len())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_only_creates_once() {
        let store = InMemoryHistoryStore::new();
        assert!(store.seed("a", ChatMessage::system("p1")).await.unwrap());
        assert!(!store.seed("a", ChatMessage::system("p2")).await.unwrap());
        assert_eq!(store.load("a").await.unwrap().unwrap(), vec![
            ChatMessage::system("p1")
        ]);
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let store = InMemoryHistoryStore::new();
        store.seed("a", ChatMessage::system("p")).await.unwrap();
        store.append("a", ChatMessage::user("q")).await.unwrap();
        store.append("a", ChatMessage::assistant("r")).await.unwrap();
        assert_eq!(store.load("a").await.unwrap().unwrap(), vec![
            ChatMessage::system("p"),
            ChatMessage::user("q"),
            ChatMessage::assistant("r"),
        ]);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryHistoryStore::new();
        store.seed("a", ChatMessage::system("p")).await.unwrap();
        assert_eq!(store.client_count().await.unwrap(), 1);
        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert!(store.load("a").await.unwrap().is_none());
        assert_eq!(store.client_count().await.unwrap(), 0);
    }
}
