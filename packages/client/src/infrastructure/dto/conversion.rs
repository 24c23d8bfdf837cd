//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatMessage, Identity, User};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::UserDto> for User {
    fn from(dto: dto::UserDto) -> Self {
        Self {
            user_id: dto.id,
            display_name: dto.username,
            online: dto.online,
        }
    }
}

impl dto::MessageDto {
    /// Convert a wire message into a log entry.
    ///
    /// Self-attribution uses the server's `self` flag when set, with a
    /// case-insensitive sender-name comparison against the local identity as
    /// fallback; history snapshots from some servers omit the flag.
    pub fn into_domain(self, me: Option<&Identity>) -> ChatMessage {
        let originated_by_self = self.is_self
            || me.is_some_and(|identity| identity.display_name.eq_ignore_ascii_case(&self.user));
        ChatMessage {
            id: self.id,
            sender_name: self.user,
            text: self.text,
            timestamp_iso: self.timestamp,
            read_by: vec![],
            is_private: self.private,
            directed_to: self.to,
            originated_by_self,
        }
    }
}
