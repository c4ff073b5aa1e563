use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;

use kiku::data::Session;
use kiku::errors::StoreError;
use kiku::id::SessionId;
use kiku::log;
use kiku::serde::Serialize;

use super::SessionStore;

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stores each session as a pretty-printed JSON file,
/// `<root>/session-<session id>.json`.
///
/// Saves go to a temporary file in the same directory which is then renamed
/// over the target, so a concurrent load sees either the old or the new
/// document and never a partial one. The files are meant to be readable and
/// editable by hand while debugging.
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io {
                path: root.clone(),
                source,
            })?;
        log::info!("Storing sessions in {}", root.display());
        Ok(Self { root })
    }

    /// Path of the document for `session_id`. Only call with ids that passed
    /// [`SessionId::is_storage_safe`].
    fn session_path(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(format!("session-{session_id}.json"))
    }

    fn temp_path(&self, session_id: &SessionId) -> PathBuf {
        let n = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            ".session-{session_id}.{}-{n}.tmp",
            std::process::id()
        ))
    }
}

fn encode(session: &Session) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = kiku::serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = kiku::serde_json::Serializer::with_formatter(&mut buf, formatter);
    session.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

fn decode(session_id: &SessionId, bytes: &[u8]) -> Result<Session, StoreError> {
    let session: Session =
        kiku::serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
            session_id: session_id.clone(),
            reason: e.to_string(),
        })?;
    if &session.session_id != session_id {
        return Err(StoreError::Corrupt {
            session_id: session_id.clone(),
            reason: format!("document belongs to session {}", session.session_id),
        });
    }
    Ok(session)
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        // Nothing unsafe can ever have been saved, so it cannot exist.
        if !session_id.is_storage_safe() {
            return Err(StoreError::NotFound(session_id.clone()));
        }

        let path = self.session_path(session_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(session_id.clone()));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        decode(session_id, &bytes)
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let session_id = &session.session_id;
        if !session_id.is_storage_safe() {
            return Err(StoreError::InvalidKey(session_id.clone()));
        }

        let bytes = encode(session)?;
        let temp = self.temp_path(session_id);
        if let Err(source) = fs::write(&temp, &bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Io { path: temp, source });
        }

        let path = self.session_path(session_id);
        if let Err(source) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Io { path, source });
        }
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), StoreError> {
        if !session_id.is_storage_safe() {
            return Ok(());
        }

        let path = self.session_path(session_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn backend(&self) -> &'static str {
        "file"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let metadata = fs::metadata(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Io {
                path: self.root.clone(),
                source: io::Error::other("data directory is not a directory"),
            })
        }
    }
}
