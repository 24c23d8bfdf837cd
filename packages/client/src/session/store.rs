//! Session resumption token persistence.
//!
//! The token is the minimal identity record `{user_id, display_name}` used to
//! silently re-establish a session after a reload. It lives outside the state
//! machine behind the [`SessionStore`] trait so the runner decides the
//! storage backend (a JSON file by default, memory in tests).

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ClientError;

/// Minimal persisted identity record for silent session resumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub user_id: String,
    pub display_name: String,
}

/// Storage for the resumption token.
///
/// `save` and `clear` failures are surfaced as errors but never block the
/// session flow: logout-time clearing proceeds regardless, and a failed save
/// only costs the next resumption.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted token, if any
    async fn load(&self) -> Result<Option<SessionToken>, ClientError>;

    /// Persist the token, replacing any previous one
    async fn save(&self, token: &SessionToken) -> Result<(), ClientError>;

    /// Remove the persisted token
    async fn clear(&self) -> Result<(), ClientError>;
}

/// File-backed token store (one JSON document).
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default token location: a fixed name under the OS temp directory,
    /// scoped per user session the way browser sessionStorage is per tab.
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join("idobata-session.json")
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionToken>, ClientError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ClientError::SessionStore {
                    reason: e.to_string(),
                });
            }
        };
        match serde_json::from_str(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                // A corrupt token must not brick startup; treat as absent.
                tracing::warn!("discarding unreadable session token: {}", e);
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &SessionToken) -> Result<(), ClientError> {
        let json = serde_json::to_string(token).map_err(|e| ClientError::SessionStore {
            reason: e.to_string(),
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ClientError::SessionStore {
                reason: e.to_string(),
            })
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::SessionStore {
                reason: e.to_string(),
            }),
        }
    }
}

/// In-memory token store for tests and for running without persistence.
#[derive(Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<SessionToken>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<SessionToken>, ClientError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, token: &SessionToken) -> Result<(), ClientError> {
        *self.slot.lock().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}
