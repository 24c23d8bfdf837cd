//! WebSocket chat client with registration, presence, private messages,
//! read receipts, and session resumption.
//!
//! The crate is split into a pure, IO-free core and a thin async shell:
//!
//! - [`session`]: the connection/session state machine. Events go in
//!   ([`session::ClientEvent`]), actions come out ([`session::ClientAction`]),
//!   and the caller executes them against the transport and the token store.
//! - [`conversation`]: the ordered message log, presence roster, and
//!   read-receipt index.
//! - [`composer`]: validation and framing of user-initiated actions,
//!   including the conversation-target toggle.
//! - [`infrastructure`]: wire DTOs, endpoint selection, and the
//!   tokio-tungstenite transport adapter.
//! - [`runner`]: the async event loop that wires everything together.

// layers
pub mod composer;
pub mod conversation;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runner;
pub mod session;
pub mod ui;
