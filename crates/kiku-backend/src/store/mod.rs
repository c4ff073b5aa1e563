//! Persistence of session documents.
//!
//! A store keeps one whole [`Session`] document per session id. There is no
//! field level API: callers load the document, change it and save it back.
//! Stores make single calls atomic, serializing a full read-modify-write
//! cycle is the job of [`crate::services::SessionLocks`].

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

use async_trait::async_trait;

use kiku::data::Session;
use kiku::errors::StoreError;
use kiku::id::SessionId;

/// A keyed store of session documents.
///
/// Every method works on a whole document and is atomic with respect to the
/// other methods called for the same key: a `load` never sees half of a
/// `save`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the current document for `session_id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such document, or a storage
    /// error if it could not be read or decoded.
    async fn load(&self, session_id: &SessionId) -> Result<Session, StoreError>;

    /// Replaces the document stored under `session.session_id`, creating it
    /// if needed.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Removes the document for `session_id`. Removing a document that does
    /// not exist succeeds.
    async fn delete(&self, session_id: &SessionId) -> Result<(), StoreError>;

    /// Short name of the backend, used in logs.
    fn backend(&self) -> &'static str;

    /// Checks that the store can currently serve requests.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
