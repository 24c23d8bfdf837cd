//! Session layer: the connection/session state machine.
//!
//! [`ChatClient`] is a pure state machine in the event→action style: the
//! caller feeds it [`ClientEvent`]s (transport lifecycle, inbound frames,
//! user intents, time ticks) and executes the [`ClientAction`]s it returns.
//! No IO happens inside; that keeps every transition unit-testable with a
//! fixed clock.

mod client;
mod event;
mod state;
mod store;

pub use client::{ChatClient, StateSnapshot};
pub use event::{ClientAction, ClientEvent};
pub use state::{ConnectionState, SessionState};
pub use store::{FileSessionStore, InMemorySessionStore, SessionStore, SessionToken};

#[cfg(test)]
pub use store::MockSessionStore;
