//! Session state and its named transition functions.
//!
//! All mutation of the session goes through the methods here; the state
//! machine in [`super::client`] decides *when* to call them and what actions
//! follow. Deadlines (join cooldown, reconnect backoff) are explicit
//! timestamps compared against the injected clock, never bare timers.

use crate::domain::{DisplayName, Identity};

use super::store::SessionToken;

/// Delay before a join attempt may be retried (matches the UI re-enable
/// window of the join action).
pub const JOIN_COOLDOWN_MS: i64 = 2_000;

/// Delay between losing an active connection and the next attempt.
pub const RECONNECT_BACKOFF_MS: i64 = 3_000;

/// Reconnect attempts before giving up and surfacing the failure.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Connection lifecycle. Exactly one instance per client process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    AwaitingRegistration,
    Active,
    Reconnecting,
}

/// What happened when the transport reported a lost connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LostOutcome {
    /// Backoff armed; a reconnect attempt follows
    Reconnecting,
    /// Attempt limit reached; session dropped with an error banner
    GaveUp,
    /// No resumable session; dropped back to the join screen
    Dropped,
    /// Already disconnected or already waiting out a backoff
    Ignored,
}

/// Identity, lifecycle, and deadline state of the one user-facing session.
#[derive(Debug, Default)]
pub struct SessionState {
    pub connection: ConnectionState,
    /// Identity assigned by the server; survives reconnects, wiped on logout
    pub identity: Option<Identity>,
    /// Error banner surfaced to the user
    pub last_error: Option<String>,
    pending_name: Option<DisplayName>,
    /// Mirror of the persisted resumption token
    token: Option<SessionToken>,
    cooldown_until_ms: Option<i64>,
    backoff_until_ms: Option<i64>,
    reconnect_attempts: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Why a join request must be rejected right now, if at all.
    ///
    /// Joins are rejected while one is already in flight (no duplicate
    /// concurrent attempts), while the session is active, and during the
    /// cooldown window after a recent attempt.
    pub fn join_blocked(&self, now_ms: i64) -> Option<&'static str> {
        match self.connection {
            ConnectionState::Connecting | ConnectionState::AwaitingRegistration => {
                return Some("a join attempt is already in flight");
            }
            ConnectionState::Active => return Some("already registered"),
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {}
        }
        match self.cooldown_until_ms {
            Some(deadline) if now_ms < deadline => Some("join cooldown has not expired"),
            _ => None,
        }
    }

    /// `Disconnected|Reconnecting → Connecting`: start a join attempt.
    ///
    /// A join from `Reconnecting` supersedes the pending reconnect: the
    /// backoff is cancelled and the attempt counter starts over.
    pub fn begin_join(&mut self, name: DisplayName, now_ms: i64) {
        self.connection = ConnectionState::Connecting;
        self.pending_name = Some(name);
        self.cooldown_until_ms = Some(now_ms + JOIN_COOLDOWN_MS);
        self.backoff_until_ms = None;
        self.reconnect_attempts = 0;
        self.last_error = None;
    }

    /// `Connecting → AwaitingRegistration`: the transport opened.
    ///
    /// Returns the display name to register with, or `None` when the open
    /// event arrived outside a join attempt.
    pub fn transport_opened(&mut self) -> Option<DisplayName> {
        if self.connection != ConnectionState::Connecting {
            return None;
        }
        self.connection = ConnectionState::AwaitingRegistration;
        self.pending_name.clone()
    }

    /// `AwaitingRegistration → Active`: identity captured.
    ///
    /// Returns the resumption token to persist. The cooldown is cancelled so
    /// a later logout/join cycle is not penalized.
    pub fn registration_completed(&mut self, user_id: String, username: String) -> SessionToken {
        let identity = Identity {
            user_id,
            display_name: username,
        };
        let token = SessionToken {
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
        };
        self.connection = ConnectionState::Active;
        self.identity = Some(identity);
        self.token = Some(token.clone());
        self.pending_name = None;
        self.cooldown_until_ms = None;
        self.backoff_until_ms = None;
        self.reconnect_attempts = 0;
        self.last_error = None;
        token
    }

    /// `AwaitingRegistration → Disconnected`: the server rejected the
    /// attempted identity. The resumption token must be cleared by the caller.
    pub fn registration_failed(&mut self, message: String) {
        self.connection = ConnectionState::Disconnected;
        self.pending_name = None;
        self.token = None;
        self.cooldown_until_ms = None;
        self.last_error = Some(message);
    }

    /// Transport reported closed/error. Decides between reconnecting (active
    /// session with a resumable token, attempts remaining) and dropping back
    /// to the join screen.
    pub fn connection_lost(&mut self, reason: Option<String>, now_ms: i64) -> LostOutcome {
        match self.connection {
            ConnectionState::Disconnected | ConnectionState::Reconnecting => LostOutcome::Ignored,
            ConnectionState::Active
            | ConnectionState::Connecting
            | ConnectionState::AwaitingRegistration => {
                let resumable = self.token.is_some()
                    && (self.connection == ConnectionState::Active || self.reconnect_attempts > 0);
                if !resumable {
                    self.connection = ConnectionState::Disconnected;
                    self.pending_name = None;
                    self.last_error = Some(reason.unwrap_or_else(|| "connection lost".to_string()));
                    return LostOutcome::Dropped;
                }
                if self.reconnect_attempts >= MAX_RECONNECT_ATTEMPTS {
                    self.connection = ConnectionState::Disconnected;
                    self.pending_name = None;
                    self.backoff_until_ms = None;
                    self.last_error = Some(format!(
                        "failed to reconnect after {} attempts",
                        MAX_RECONNECT_ATTEMPTS
                    ));
                    return LostOutcome::GaveUp;
                }
                self.connection = ConnectionState::Reconnecting;
                self.backoff_until_ms = Some(now_ms + RECONNECT_BACKOFF_MS);
                self.reconnect_attempts += 1;
                LostOutcome::Reconnecting
            }
        }
    }

    /// `Reconnecting → Connecting` once the backoff deadline has passed.
    ///
    /// Returns the display name to re-register with (the persisted one; the
    /// server may still assign a fresh user id).
    pub fn backoff_elapsed(&mut self, now_ms: i64) -> Option<DisplayName> {
        if self.connection != ConnectionState::Reconnecting {
            return None;
        }
        let deadline = self.backoff_until_ms?;
        if now_ms < deadline {
            return None;
        }
        let name = self
            .token
            .as_ref()
            .and_then(|token| DisplayName::new(&token.display_name).ok())?;
        self.connection = ConnectionState::Connecting;
        self.pending_name = Some(name.clone());
        self.backoff_until_ms = None;
        Some(name)
    }

    /// `* → Disconnected`: explicit logout. Wipes identity, token mirror, and
    /// every deadline; the caller clears the persisted token and the stores.
    pub fn logged_out(&mut self) {
        self.connection = ConnectionState::Disconnected;
        self.identity = None;
        self.pending_name = None;
        self.token = None;
        self.last_error = None;
        self.cooldown_until_ms = None;
        self.backoff_until_ms = None;
        self.reconnect_attempts = 0;
    }
}
