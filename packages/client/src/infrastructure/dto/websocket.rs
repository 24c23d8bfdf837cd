//! WebSocket envelope DTOs.
//!
//! Every frame is a JSON object with a `type` discriminant. Both directions
//! are closed enums: an inbound frame whose `type` is unknown (or whose
//! required fields are missing) fails to deserialize, and the session layer
//! discards it as a protocol error instead of tearing down the connection.

use serde::{Deserialize, Serialize};

/// Envelopes the server pushes to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEnvelope {
    /// Server-side failure, including rejected registration
    Error { message: String },
    /// Registration acknowledgement carrying the assigned identity
    Registered { id: String, username: String },
    /// Full log snapshot, sent once right after registration
    History { messages: Vec<MessageDto> },
    /// Full roster snapshot, sent on every presence change
    Users { users: Vec<UserDto> },
    /// One chat message (broadcast or private)
    Message(MessageDto),
    /// Read-receipt index update for a single message
    Read {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "readBy")]
        read_by: Vec<String>,
    },
    /// Server-generated notice (join/leave announcements etc.)
    System {
        text: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
}

/// Envelopes the client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEnvelope {
    /// Request an identity for the given display name
    Register { username: String },
    /// Send a message to the public room (`to: null`) or one peer
    Message { text: String, to: Option<String> },
    /// Acknowledge receipt of a message
    Read {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "readerId")]
        reader_id: String,
    },
    /// End the session
    Logout,
}

/// Wire form of one chat message, shared by `message` and `history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    #[serde(default)]
    pub id: Option<String>,
    pub user: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Set by the server on echoes of this connection's own sends
    #[serde(default, rename = "self")]
    pub is_self: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub to: Option<String>,
}

/// Wire form of one roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub online: bool,
}
