//! Conversation store: the ordered message log, presence roster, and
//! read-receipt index.
//!
//! Inbound envelopes are applied as pure state transitions over
//! `(roster, log)`. The log is append-only within a session; the only
//! mutation is a `read` envelope replacing one entry's acknowledgement set.

use crate::domain::{ChatMessage, User, value_object::SYSTEM_ID_PREFIX};

/// Read acknowledgement the store asks the session layer to send out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub message_id: String,
    pub reader_id: String,
}

/// Message log and presence roster, fed exclusively by server envelopes.
#[derive(Debug, Default)]
pub struct ConversationStore {
    log: Vec<ChatMessage>,
    roster: Vec<User>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.log
    }

    pub fn roster(&self) -> &[User] {
        &self.roster
    }

    /// Replace the entire log with a history snapshot.
    ///
    /// Used once, immediately after registration. Entries from before the
    /// snapshot never survive; nothing is merged.
    pub fn replace_log(&mut self, messages: Vec<ChatMessage>) {
        self.log = messages;
    }

    /// Replace the entire roster with a presence snapshot.
    pub fn replace_roster(&mut self, users: Vec<User>) {
        self.roster = users;
    }

    /// Append one message to the log.
    ///
    /// Returns the read acknowledgement to send when the message came from a
    /// peer and carries a server id (receipt-on-receive, not on display).
    pub fn apply_message(
        &mut self,
        message: ChatMessage,
        reader_id: Option<&str>,
    ) -> Option<ReadReceipt> {
        let receipt = match (message.wants_read_receipt(), &message.id, reader_id) {
            (true, Some(id), Some(reader)) => Some(ReadReceipt {
                message_id: id.clone(),
                reader_id: reader.to_string(),
            }),
            _ => None,
        };
        self.log.push(message);
        receipt
    }

    /// Replace the acknowledgement set of the entry with the given id.
    ///
    /// Last write wins; the incoming set is not merged with the existing one.
    /// Silently a no-op when no entry matches, because a `read` may refer to a
    /// message this client never received or that has not arrived yet.
    pub fn apply_read(&mut self, message_id: &str, read_by: Vec<String>) {
        match self
            .log
            .iter_mut()
            .find(|m| m.id.as_deref() == Some(message_id))
        {
            Some(entry) => entry.read_by = read_by,
            None => {
                tracing::debug!("read receipt for unknown message id '{}'", message_id);
            }
        }
    }

    /// Append a synthesized system notice.
    ///
    /// The id gets the reserved `sys-` prefix so it can never collide with a
    /// server id nor become eligible for read receipts.
    pub fn apply_system(&mut self, text: String, timestamp_iso: Option<String>) {
        let notice = ChatMessage {
            id: Some(format!("{}{}", SYSTEM_ID_PREFIX, uuid::Uuid::new_v4())),
            sender_name: "System".to_string(),
            text,
            timestamp_iso,
            read_by: vec![],
            is_private: false,
            directed_to: None,
            originated_by_self: false,
        };
        self.log.push(notice);
    }

    /// Drop everything; used on logout.
    pub fn clear(&mut self) {
        self.log.clear();
        self.roster.clear();
    }
}
