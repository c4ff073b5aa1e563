//! Backend services for question voting sessions.
//!
//! This module provides the service layer: [`SessionService`] with its
//! operations, the store-backed implementation, and the per-session lock
//! manager that keeps read-modify-write cycles from interleaving.

pub mod locks;
pub mod sessions;

pub use locks::*;
pub use sessions::*;
