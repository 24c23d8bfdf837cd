//! Value objects with validation.

use std::fmt;

use crate::error::ClientError;

/// Reserved prefix for locally synthesized system-notice ids.
///
/// Server-assigned message ids never carry this prefix, so a `sys-` id marks
/// an entry that must never receive read receipts.
pub const SYSTEM_ID_PREFIX: &str = "sys-";

/// Validated display name: 3-20 characters of letters, digits, '.' or '_'.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and wrap a raw display name.
    ///
    /// The trimmed input must match `[A-Za-z0-9._]{3,20}`; anything else is a
    /// [`ClientError::Validation`] and no connection may be attempted with it.
    pub fn new(raw: &str) -> Result<Self, ClientError> {
        let trimmed = raw.trim();
        let valid_chars = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        if !valid_chars || trimmed.len() < 3 || trimmed.len() > 20 {
            return Err(ClientError::Validation {
                name: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery indicator for self-authored messages, derived from the
/// read-receipt index on every render and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// No reader has acknowledged the message yet (single tick)
    Sent,
    /// At least one reader has acknowledged the message (double tick)
    Read,
}
