use async_trait::async_trait;
use dashmap::DashMap;

use kiku::data::Session;
use kiku::errors::StoreError;
use kiku::id::SessionId;

use super::SessionStore;

/// An in-memory implementation of the `SessionStore` trait.
///
/// This implementation uses a `DashMap` to hold the documents, allowing for concurrent access.
/// Loads hand out clones, so nothing outside the map can change a stored session.
/// It is suitable for testing or deployments where losing sessions on restart is fine.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(session_id.clone()))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.sessions.remove(session_id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
