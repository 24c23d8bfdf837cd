//! Domain entities: identity, roster entries, and log entries.

use super::value_object::{ReadStatus, SYSTEM_ID_PREFIX};

/// Identity assigned by the server on successful registration.
///
/// Immutable for the life of the session and persisted so that a reload can
/// attempt silent resumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

/// Roster entry pushed by the server on every presence change.
///
/// The client never mutates these locally; the roster is only ever replaced
/// wholesale by a `users` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    pub online: bool,
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Server-assigned id; `None` or a `sys-` id marks a client-synthesized
    /// notice that can never receive read receipts
    pub id: Option<String>,
    pub sender_name: String,
    pub text: String,
    pub timestamp_iso: Option<String>,
    /// User ids that have acknowledged this message; replaced wholesale by
    /// `read` envelopes (last write wins)
    pub read_by: Vec<String>,
    pub is_private: bool,
    pub directed_to: Option<String>,
    pub originated_by_self: bool,
}

impl ChatMessage {
    /// Whether receiving this message must produce a read acknowledgement.
    ///
    /// Self-authored messages and id-less or synthesized notices produce none.
    pub fn wants_read_receipt(&self) -> bool {
        if self.originated_by_self {
            return false;
        }
        match &self.id {
            Some(id) => !id.starts_with(SYSTEM_ID_PREFIX),
            None => false,
        }
    }

    /// Delivery indicator for display, derived from the read-receipt index.
    ///
    /// Only self-authored messages carry an indicator: empty `read_by` means
    /// "sent", anything else means "read".
    pub fn read_status(&self) -> Option<ReadStatus> {
        if !self.originated_by_self {
            return None;
        }
        if self.read_by.is_empty() {
            Some(ReadStatus::Sent)
        } else {
            Some(ReadStatus::Read)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: Option<&str>, originated_by_self: bool) -> ChatMessage {
        ChatMessage {
            id: id.map(String::from),
            sender_name: "bob".to_string(),
            text: "hi".to_string(),
            timestamp_iso: None,
            read_by: vec![],
            is_private: false,
            directed_to: None,
            originated_by_self,
        }
    }

    #[test]
    fn test_wants_read_receipt_for_peer_message_with_id() {
        // テスト項目: 他者発の id 付きメッセージは読了通知の対象になる
        // given (前提条件):
        let msg = message(Some("m1"), false);

        // when (操作) / then (期待する結果):
        assert!(msg.wants_read_receipt());
    }

    #[test]
    fn test_no_read_receipt_for_self_or_idless_messages() {
        // テスト項目: 自分発・id なし・システム通知は読了通知の対象にならない
        // given (前提条件):
        let own = message(Some("m1"), true);
        let idless = message(None, false);
        let system = message(Some("sys-123"), false);

        // when (操作) / then (期待する結果):
        assert!(!own.wants_read_receipt());
        assert!(!idless.wants_read_receipt());
        assert!(!system.wants_read_receipt());
    }

    #[test]
    fn test_read_status_only_for_self_authored_messages() {
        // テスト項目: 既読インジケーターは自分発のメッセージにのみ付与される
        // given (前提条件):
        let peer_msg = message(Some("m1"), false);
        let mut own_msg = message(Some("m2"), true);

        // when (操作) / then (期待する結果):
        assert_eq!(peer_msg.read_status(), None);
        assert_eq!(own_msg.read_status(), Some(ReadStatus::Sent));

        own_msg.read_by.push("u2".to_string());
        assert_eq!(own_msg.read_status(), Some(ReadStatus::Read));
    }
}
