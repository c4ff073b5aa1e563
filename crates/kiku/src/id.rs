//! ID generation utilities for the Kiku application.
//!
//! This module provides type-safe ID generation with specific ID types for
//! sessions, questions and callers. Session and question ids are short
//! `tiny_id` codes meant for URLs; caller ids are random v4 UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::{Mutex, PoisonError};
use tiny_id::ShortCodeGenerator;
use uuid::Uuid;

/// Type alias for a lazy-initialized short code generator with a mutex for thread safety.
/// This allows us to create a global generator that can be used across the application
/// without needing to pass it around explicitly.
type LazyShortCodeGenerator = LazyLock<Mutex<ShortCodeGenerator<char>>>;

const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Global generator instances for different ID types
// Note: tiny_id generators need mutable access, so we wrap in Mutex
static SESSION_ID_GENERATOR: LazyShortCodeGenerator = LazyLock::new(|| {
    // Use alphanumeric but exclude confusing characters, session ids end up in shared URLs
    let alphabet: Vec<char> = "123456789ABCDEFGHJKMNPQRSTUVWXYZabcdefghkmnpqrstuvwxyz"
        .chars()
        .collect();
    Mutex::new(ShortCodeGenerator::with_alphabet(alphabet, 8))
});

static QUESTION_ID_GENERATOR: LazyShortCodeGenerator = LazyLock::new(|| {
    Mutex::new(ShortCodeGenerator::with_alphabet(
        ALPHANUMERIC.chars().collect(),
        8,
    ))
});

fn next_from(generator: &LazyShortCodeGenerator) -> String {
    // A poisoned generator is still a valid generator.
    generator
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next_string()
}

/// A type-safe wrapper around string IDs.
///
/// This struct provides a consistent way to generate and handle IDs throughout
/// the application while maintaining type safety and preventing ID mixing.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: std::marker::PhantomData<T>,
}

// Custom serde implementation to serialize as just a string
impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_string(value))
    }
}

impl<T> Id<T> {
    /// Creates a new ID with the given value.
    ///
    /// # Example
    /// ```
    /// use kiku::id::SessionId;
    ///
    /// let session_id = SessionId::from_string("abc123".to_string());
    /// assert_eq!(session_id.as_str(), "abc123");
    /// ```
    pub fn from_string(value: String) -> Self {
        Self {
            value,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns the string value of the ID.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consumes the ID and returns the inner string value.
    pub fn into_string(self) -> String {
        self.value
    }

    /// Whether this ID can safely be used as part of a storage key such as a
    /// file name: non-empty, at most 64 characters, and made only of ASCII
    /// alphanumerics, `-` and `_`.
    ///
    /// IDs come in from URLs and cookies, so anything else is rejected
    /// before it gets near the filesystem.
    ///
    /// # Example
    /// ```
    /// use kiku::id::SessionId;
    ///
    /// assert!(SessionId::new().is_storage_safe());
    /// assert!(!SessionId::from("../etc/passwd").is_storage_safe());
    /// assert!(!SessionId::from("").is_storage_safe());
    /// ```
    pub fn is_storage_safe(&self) -> bool {
        !self.value.is_empty()
            && self.value.len() <= 64
            && self
                .value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

impl<T> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::from_string(value.to_string())
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

// Type markers for different entity types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionMarker;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionMarker;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerMarker;

/// Type alias for Session IDs
pub type SessionId = Id<SessionMarker>;

/// Type alias for Question IDs
pub type QuestionId = Id<QuestionMarker>;

/// The opaque identity of whoever is making a request.
///
/// The core never looks inside it: it only compares identities for equality
/// (admin checks, one vote per caller). How it is issued is up to the outer
/// layer, the backend hands them out through a cookie.
pub type CallerId = Id<CallerMarker>;

impl SessionId {
    /// Generates a new session ID with a user-friendly format (8 characters, mixed case).
    ///
    /// # Example
    /// ```
    /// use kiku::id::SessionId;
    ///
    /// let session_id = SessionId::new();
    /// assert_eq!(session_id.as_str().len(), 8);
    /// // Should not contain confusing characters like 0, O, I, l
    /// let confusing_chars = "0OIl";
    /// assert!(!session_id.as_str().chars().any(|c| confusing_chars.contains(c)));
    /// ```
    pub fn new() -> Self {
        Self::from_string(next_from(&SESSION_ID_GENERATOR))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionId {
    /// Generates a new question ID (8 characters).
    pub fn new() -> Self {
        Self::from_string(next_from(&QUESTION_ID_GENERATOR))
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl CallerId {
    /// Generates a new caller identity token, a random v4 UUID.
    ///
    /// Caller ids work as bearer tokens, so they come from the OS random
    /// source rather than the short code generators.
    ///
    /// # Example
    /// ```
    /// use kiku::id::CallerId;
    ///
    /// let caller = CallerId::new();
    /// assert_eq!(caller.as_str().len(), 36);
    /// assert!(caller.is_storage_safe());
    /// ```
    pub fn new() -> Self {
        Self::from_string(Uuid::new_v4().to_string())
    }
}

impl Default for CallerId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();

        // IDs should be different
        assert_ne!(id1, id2);

        // IDs should have correct length
        assert_eq!(id1.as_str().len(), 8);
        assert_eq!(QuestionId::new().as_str().len(), 8);
        assert_eq!(CallerId::new().as_str().len(), 36);
    }

    #[test]
    fn test_caller_ids_are_random_uuids() {
        let callers: Vec<CallerId> = (0..200).map(|_| CallerId::new()).collect();

        let distinct: std::collections::HashSet<&str> =
            callers.iter().map(CallerId::as_str).collect();
        assert_eq!(distinct.len(), callers.len());

        for caller in &callers {
            let uuid = Uuid::parse_str(caller.as_str()).unwrap();
            assert_eq!(uuid.get_version_num(), 4);
            assert_eq!(caller.as_str(), uuid.hyphenated().to_string());
        }

        // Only the four hyphens and the version digit are the same in every token.
        let first = callers[0].as_str().as_bytes();
        let constant: Vec<usize> = (0..first.len())
            .filter(|&i| callers.iter().all(|c| c.as_str().as_bytes()[i] == first[i]))
            .collect();
        assert_eq!(constant, vec![8, 13, 14, 18, 23]);
    }

    #[test]
    fn test_id_creation() {
        let id = SessionId::from_string("test123".to_string());
        assert_eq!(id.as_str(), "test123");
        assert_eq!(id.to_string(), "test123");
        assert_eq!(id.into_string(), "test123");
    }

    #[test]
    fn test_id_from_string() {
        let id: QuestionId = "abc123".into();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_session_id_format() {
        let id = SessionId::new();
        assert_eq!(id.as_str().len(), 8);

        // Should not contain confusing characters
        let confusing_chars = "0OIl";
        assert!(!id.as_str().chars().any(|c| confusing_chars.contains(c)));
    }

    #[test]
    fn test_generated_ids_are_storage_safe() {
        for _ in 0..50 {
            assert!(SessionId::new().is_storage_safe());
            assert!(QuestionId::new().is_storage_safe());
            assert!(CallerId::new().is_storage_safe());
        }
    }

    #[test]
    fn test_storage_safety_rejects_paths() {
        for bad in ["", "..", "a/b", "a\\b", "session.json", "a b", "ünï"] {
            assert!(!SessionId::from(bad).is_storage_safe(), "{bad:?}");
        }
        assert!(SessionId::from("abc-DEF_123").is_storage_safe());
        assert!(!SessionId::from("x".repeat(65)).is_storage_safe());
    }

    #[test]
    fn test_serde() {
        let original = SessionId::from_string("test123".to_string());

        // Test serialization
        let serialized = serde_json::to_string(&original).unwrap();
        assert_eq!(serialized, "\"test123\"");

        // Test deserialization
        let deserialized: SessionId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(original, deserialized);
    }
}
