//! Server endpoint selection.
//!
//! Loopback hosts get the local development server; everything else gets the
//! fixed production endpoint. An explicit `--url` always wins, so deployments
//! can override the computed endpoint entirely.

use std::net::IpAddr;

/// Port the local development server listens on.
pub const LOCAL_DEV_PORT: u16 = 8080;

/// Fixed production endpoint (TLS).
pub const PRODUCTION_URL: &str = "wss://idobata-backend.onrender.com";

/// Compute the WebSocket URL for the given host.
pub fn resolve(host: &str) -> String {
    if is_loopback(host) {
        format!("ws://{host}:{LOCAL_DEV_PORT}")
    } else {
        PRODUCTION_URL.to_string()
    }
}

fn is_loopback(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
