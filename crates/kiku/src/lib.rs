//! The shared library for Kiku, a small service for live question voting.
//!
//! This library holds the pieces the backend and any client agree on: typed
//! identifiers, the session document model, the wire payloads, error types
//! and the logging setup.

pub mod data;
pub mod errors;
pub mod id;
pub mod log;

pub use serde;
pub use serde_json;
pub use tracing;
