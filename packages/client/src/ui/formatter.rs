//! Message formatting utilities for terminal display.

use idobata_shared::time::format_clock_time;

use crate::domain::{ChatMessage, ReadStatus, User};
use crate::session::ConnectionState;

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one log entry.
    ///
    /// Self-authored messages are labeled "You" and carry the delivery
    /// indicator (✓ sent, ✓✓ read). Private messages are tagged, from the
    /// sender's side as "(to private)" and from the recipient's as
    /// "(private)". System notices get their own shape.
    pub fn format_message(message: &ChatMessage) -> String {
        if message.sender_name == "System" {
            return Self::format_system_notice(message);
        }

        let time = message
            .timestamp_iso
            .as_deref()
            .map(format_clock_time)
            .unwrap_or_default();
        let sender = if message.originated_by_self {
            "You"
        } else {
            message.sender_name.as_str()
        };
        let ticks = match message.read_status() {
            Some(ReadStatus::Sent) => " ✓",
            Some(ReadStatus::Read) => " ✓✓",
            None => "",
        };
        let privacy = if message.is_private {
            if message.originated_by_self {
                " (to private)"
            } else {
                " (private)"
            }
        } else {
            ""
        };

        if time.is_empty() {
            format!("\n{}: {}{}{}\n", sender, message.text, ticks, privacy)
        } else {
            format!(
                "\n[{}] {}: {}{}{}\n",
                time, sender, message.text, ticks, privacy
            )
        }
    }

    fn format_system_notice(message: &ChatMessage) -> String {
        let time = message
            .timestamp_iso
            .as_deref()
            .map(format_clock_time)
            .unwrap_or_default();
        if time.is_empty() {
            format!("\n* {}\n", message.text)
        } else {
            format!("\n* {} ({})\n", message.text, time)
        }
    }

    /// Format the roster block: online users first, the acting user labeled
    /// "You". The caller passes the roster already sorted by presence.
    pub fn format_roster(roster: &[User], my_name: &str) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        let online_count = roster.iter().filter(|u| u.online).count();
        output.push_str(&format!("Friends Online ({}):\n", online_count));

        if roster.is_empty() {
            output.push_str("(No users)\n");
        } else {
            for user in roster {
                let marker = if user.online { "*" } else { " " };
                let label = if user.display_name.eq_ignore_ascii_case(my_name) {
                    "You".to_string()
                } else {
                    user.display_name.clone()
                };
                output.push_str(&format!("{} {}\n", marker, label));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format an error banner.
    pub fn format_error(message: &str) -> String {
        format!("\n!! {}\n", message)
    }

    /// Format a connection status change notice.
    pub fn format_status(state: ConnectionState) -> String {
        let label = match state {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting...",
            ConnectionState::AwaitingRegistration => "registering...",
            ConnectionState::Active => "connected",
            ConnectionState::Reconnecting => "connection lost, reconnecting...",
        };
        format!("\n-- {} --\n", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(originated_by_self: bool, read_by: Vec<String>) -> ChatMessage {
        ChatMessage {
            id: Some("m1".to_string()),
            sender_name: if originated_by_self { "alice" } else { "bob" }.to_string(),
            text: "Hello, world!".to_string(),
            timestamp_iso: Some("2024-05-01T10:00:00.000Z".to_string()),
            read_by,
            is_private: false,
            directed_to: None,
            originated_by_self,
        }
    }

    #[test]
    fn test_format_message_from_peer() {
        // テスト項目: 他者発メッセージが送信者名と本文付きで整形される
        // given (前提条件):
        let msg = message(false, vec![]);

        // when (操作):
        let result = MessageFormatter::format_message(&msg);

        // then (期待する結果):
        assert!(result.contains("bob:"));
        assert!(result.contains("Hello, world!"));
        assert!(!result.contains('✓'));
    }

    #[test]
    fn test_format_own_message_shows_sent_tick() {
        // テスト項目: 未読の自分発メッセージに ✓ が 1 つ表示される
        // given (前提条件):
        let msg = message(true, vec![]);

        // when (操作):
        let result = MessageFormatter::format_message(&msg);

        // then (期待する結果):
        assert!(result.contains("You:"));
        assert!(result.contains(" ✓"));
        assert!(!result.contains("✓✓"));
    }

    #[test]
    fn test_format_own_message_shows_read_ticks() {
        // テスト項目: 既読の自分発メッセージに ✓✓ が表示される
        // given (前提条件):
        let msg = message(true, vec!["u2".to_string()]);

        // when (操作):
        let result = MessageFormatter::format_message(&msg);

        // then (期待する結果):
        assert!(result.contains("✓✓"));
    }

    #[test]
    fn test_format_private_message_tags() {
        // テスト項目: プライベートメッセージに方向に応じたタグが付く
        // given (前提条件):
        let mut incoming = message(false, vec![]);
        incoming.is_private = true;
        let mut outgoing = message(true, vec![]);
        outgoing.is_private = true;

        // when (操作):
        let incoming_text = MessageFormatter::format_message(&incoming);
        let outgoing_text = MessageFormatter::format_message(&outgoing);

        // then (期待する結果):
        assert!(incoming_text.contains("(private)"));
        assert!(outgoing_text.contains("(to private)"));
    }

    #[test]
    fn test_format_system_notice() {
        // テスト項目: システム通知が専用の形式で整形される
        // given (前提条件):
        let msg = ChatMessage {
            id: Some("sys-1".to_string()),
            sender_name: "System".to_string(),
            text: "bob joined".to_string(),
            timestamp_iso: None,
            read_by: vec![],
            is_private: false,
            directed_to: None,
            originated_by_self: false,
        };

        // when (操作):
        let result = MessageFormatter::format_message(&msg);

        // then (期待する結果):
        assert!(result.contains("* bob joined"));
        assert!(!result.contains("System:"));
    }

    #[test]
    fn test_format_roster_labels_self_and_counts_online() {
        // テスト項目: ロースター表示で自分が "You" になりオンライン数が出る
        // given (前提条件):
        let roster = vec![
            User {
                user_id: "u1".to_string(),
                display_name: "alice".to_string(),
                online: true,
            },
            User {
                user_id: "u2".to_string(),
                display_name: "bob".to_string(),
                online: false,
            },
        ];

        // when (操作):
        let result = MessageFormatter::format_roster(&roster, "alice");

        // then (期待する結果):
        assert!(result.contains("Friends Online (1):"));
        assert!(result.contains("You"));
        assert!(result.contains("bob"));
        assert!(!result.contains("alice\n"));
    }

    #[test]
    fn test_format_roster_with_no_users() {
        // テスト項目: ロースターが空の場合のプレースホルダー表示
        // given (前提条件):
        let roster: Vec<User> = vec![];

        // when (操作):
        let result = MessageFormatter::format_roster(&roster, "alice");

        // then (期待する結果):
        assert!(result.contains("(No users)"));
    }
}
