//! Shared utilities for the Idobata chat client workspace.
//!
//! Holds the concerns that both the client crate and its test binaries need:
//! clock abstraction and timestamp formatting, plus logging setup.

pub mod logger;
pub mod time;
