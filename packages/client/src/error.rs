//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
///
/// Nothing here is fatal to the process: validation and registration errors
/// surface as a banner on the session state, transport errors feed the
/// reconnect path, and protocol errors only discard the offending envelope.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Display name failed validation; no connection is attempted
    #[error("invalid display name '{name}': only letters, digits, '.' and '_' (3-20 chars) are allowed")]
    Validation { name: String },

    /// Server rejected the attempted identity
    #[error("registration rejected by server: {message}")]
    Registration { message: String },

    /// Connection-level failure (connect, send, close)
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    /// Malformed or unrecognized envelope; the envelope is discarded
    #[error("protocol error: {reason}")]
    Protocol { reason: String },

    /// Session token could not be read or written
    #[error("session store failure: {reason}")]
    SessionStore { reason: String },
}
