//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Opaque identifier for a counseling session.
///
/// Callers may supply their own identifiers (any non-blank string without
/// path separators); [`SessionId::generate`] mints a random one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a SessionId from a caller-supplied string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the id is blank or contains characters
    /// that cannot be used as a storage key segment.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        if id == "." || id == ".." {
            return Err(ValidationError::invalid_format(
                "session_id",
                "must not be a relative path component",
            ));
        }
        if id.contains(['/', '\\', ':']) || id.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "session_id",
                "must not contain '/', '\\', ':' or control characters",
            ));
        }
        Ok(Self(id))
    }

    /// Creates a new random SessionId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
