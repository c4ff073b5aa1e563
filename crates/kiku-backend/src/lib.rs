//! Backend for Kiku: question voting sessions over HTTP.
//!
//! The interesting part is [`services::StoredSessionService`], which runs
//! every operation as one locked read-modify-write cycle against a
//! [`store::SessionStore`]. Everything else is plumbing around it.

pub mod config;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::services::StoredSessionService;
use crate::store::SessionStore;

/// State shared by all request handlers.
pub struct AppState {
    pub sessions: StoredSessionService,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, secure_cookies: bool) -> Self {
        Self {
            sessions: StoredSessionService::new(store),
            started_at: chrono::Utc::now(),
            secure_cookies,
        }
    }
}
