use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use kiku::id::SessionId;

/// One async mutex per session id, created on first use and dropped again
/// once nobody holds or waits for it.
///
/// Holding a [`SessionGuard`] gives exclusive access to one session for a
/// whole load-modify-save cycle. Different sessions never wait on each other.
#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Waits until no one else holds `session_id` and takes it.
    pub async fn lock(&self, session_id: &SessionId) -> SessionGuard<'_> {
        // The map entry is released at the end of this statement, never held across the await.
        let mutex = Arc::clone(self.locks.entry(session_id.clone()).or_default().value());
        let guard = mutex.lock_owned().await;
        SessionGuard {
            locks: self,
            session_id: session_id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of sessions currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one session, released on drop.
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session_id: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionGuard<'_> {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map holds the last reference if nobody is waiting.
        self.guard.take();
        self.locks
            .locks
            .remove_if(&self.session_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
