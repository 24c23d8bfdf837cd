//! Session events and actions.

use crate::infrastructure::dto::websocket::ClientEnvelope;

use super::store::SessionToken;

/// Events the caller feeds into the state machine.
///
/// The caller is responsible for receiving frames from the network, driving
/// time forward via ticks, and forwarding user intents.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// User asked to join with a display name (also used for resumption,
    /// with the persisted token's name)
    Join { name: String },
    /// Transport reports the connection is open
    Opened,
    /// One raw frame arrived from the server
    FrameReceived(String),
    /// The server closed the connection
    Closed,
    /// The connection failed
    TransportFailed(String),
    /// Periodic tick for cooldown and backoff processing
    Tick,
    /// User submitted message text
    SendMessage { text: String },
    /// User selected or deselected a peer as the conversation target
    ToggleTarget { peer: String },
    /// User asked to end the session
    Logout,
}

/// Actions the state machine produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Open a connection to the chat server
    Connect,
    /// Serialize and send one envelope over the open connection
    Send(ClientEnvelope),
    /// Close the connection
    Close,
    /// Persist the resumption token
    PersistToken(SessionToken),
    /// Remove the persisted resumption token
    ClearToken,
}
