//! Cart persistence collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::SessionId;
use domain::Checkout;
use tokio::sync::RwLock;

use crate::Result;

/// Keyed load/save of a session's checkout (cart plus checkout context).
///
/// Saves must be atomic per session key so overlapping tabs cannot
/// interleave partial writes. The store survives process restarts for a
/// logged-in session in the PostgreSQL implementation; the in-memory
/// implementation backs tests and development.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the checkout for a session, if one was saved.
    async fn load(&self, session_id: &SessionId) -> Result<Option<Checkout>>;

    /// Saves the checkout under its session key, replacing any previous
    /// value atomically.
    async fn save(&self, checkout: &Checkout) -> Result<()>;

    /// Removes a session's checkout.
    async fn remove(&self, session_id: &SessionId) -> Result<()>;
}

/// In-memory cart store for testing.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    sessions: Arc<RwLock<HashMap<SessionId, Checkout>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Clears all sessions.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self, session_id: &SessionId) -> Result<Option<Checkout>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn save(&self, checkout: &Checkout) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(checkout.cart().session_id().clone(), checkout.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }
}
