//! Shared error types and utilities for the kiku project.
use std::path::PathBuf;

pub use color_eyre::Report;

use crate::id::{QuestionId, SessionId};

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to install color_eyre")]
    ColorEyre(#[from] color_eyre::Report),
    #[error("Failed to install tracing-subscriber")]
    TracingSubscriber(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by a session store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session {0} not found")]
    NotFound(SessionId),
    #[error("Session id {0:?} cannot be used as a storage key")]
    InvalidKey(SessionId),
    #[error("Session {0} already exists")]
    Conflict(SessionId),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode or decode session document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Session document {session_id} is corrupt: {reason}")]
    Corrupt {
        session_id: SessionId,
        reason: String,
    },
}

/// Errors returned by the session service operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),
    #[error("Question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Voting session is closed")]
    SessionClosed,
    #[error("Already voted on this question in this session")]
    AlreadyVoted,
    #[error("Only the session creator can do this")]
    Unauthorized,
    #[error("Storage failure: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(session_id) => SessionError::SessionNotFound(session_id),
            other => SessionError::Storage(other),
        }
    }
}
