//! Outbound composer: the compose buffer and the conversation target.
//!
//! The target decides whether the next message goes to the public room or to
//! one specific peer. Selecting the currently selected peer again clears the
//! target (toggle semantics); selecting a different peer replaces it.

/// Message ready to be framed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub to: Option<String>,
}

/// Compose buffer plus the current conversation target.
#[derive(Debug, Default)]
pub struct Composer {
    buffer: String,
    target: Option<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current conversation target: `None` is the public room.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn set_buffer(&mut self, text: String) {
        self.buffer = text;
    }

    /// Select or deselect a peer as the conversation target.
    ///
    /// Toggling the active peer returns to public and strips their mention
    /// from the buffer. Selecting a different peer replaces the previous
    /// target (never stacks) and also strips the stale mention.
    pub fn toggle_target(&mut self, peer: &str) {
        if self.target.as_deref() == Some(peer) {
            self.target = None;
        } else {
            self.target = Some(peer.to_string());
        }
        self.buffer = strip_leading_mention(&self.buffer);
    }

    /// Validate the buffer and take its content for sending.
    ///
    /// Returns `None` when the trimmed buffer is empty. On success the buffer
    /// and the target are cleared; the next message goes to the public room
    /// unless a peer is selected again.
    pub fn take_outgoing(&mut self) -> Option<OutgoingMessage> {
        let text = self.buffer.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.buffer.clear();
        let to = self.target.take();
        Some(OutgoingMessage { text, to })
    }

    /// Drop buffer and target; used on logout.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.target = None;
    }
}

/// Strip one leading `@token` mention plus the whitespace after it.
///
/// Only the first occurrence is removed, matching the single-target
/// invariant; mentions in the middle of the text are left alone.
fn strip_leading_mention(input: &str) -> String {
    let Some(rest) = input.strip_prefix('@') else {
        return input.to_string();
    };
    let after_token = rest.trim_start_matches(|c: char| !c.is_whitespace());
    after_token.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_peer_twice_returns_to_public() {
        // テスト項目: 同じ相手を 2 回選択するとターゲットが公開に戻る
        // given (前提条件):
        let mut composer = Composer::new();

        // when (操作):
        composer.toggle_target("bob");
        assert_eq!(composer.target(), Some("bob"));
        composer.toggle_target("bob");

        // then (期待する結果):
        assert_eq!(composer.target(), None);
    }

    #[test]
    fn test_toggle_different_peer_replaces_target() {
        // テスト項目: 別の相手を選択するとターゲットが置き換えられる（積み重ねない）
        // given (前提条件):
        let mut composer = Composer::new();
        composer.toggle_target("bob");

        // when (操作):
        composer.toggle_target("carol");

        // then (期待する結果):
        assert_eq!(composer.target(), Some("carol"));
    }

    #[test]
    fn test_deselecting_peer_strips_mention_from_buffer() {
        // テスト項目: 選択解除で先頭の @メンション が入力から除去される
        // given (前提条件):
        let mut composer = Composer::new();
        composer.toggle_target("bob");
        composer.set_buffer("@bob see you at 5".to_string());

        // when (操作):
        composer.toggle_target("bob");

        // then (期待する結果):
        assert_eq!(composer.target(), None);
        assert_eq!(composer.buffer(), "see you at 5");
    }

    #[test]
    fn test_only_leading_mention_is_stripped() {
        // テスト項目: 文中の @メンション は除去されない
        // given (前提条件):
        let mut composer = Composer::new();
        composer.toggle_target("bob");
        composer.set_buffer("tell @bob I said hi".to_string());

        // when (操作):
        composer.toggle_target("bob");

        // then (期待する結果):
        assert_eq!(composer.buffer(), "tell @bob I said hi");
    }

    #[test]
    fn test_take_outgoing_rejects_blank_text() {
        // テスト項目: 空白のみの入力では送信メッセージが生成されない
        // given (前提条件):
        let mut composer = Composer::new();
        composer.set_buffer("   ".to_string());

        // when (操作):
        let outgoing = composer.take_outgoing();

        // then (期待する結果):
        assert_eq!(outgoing, None);
    }

    #[test]
    fn test_take_outgoing_clears_buffer_and_target() {
        // テスト項目: 送信後に入力バッファとターゲットがクリアされる
        // given (前提条件):
        let mut composer = Composer::new();
        composer.toggle_target("bob");
        composer.set_buffer("  hello  ".to_string());

        // when (操作):
        let outgoing = composer.take_outgoing();

        // then (期待する結果):
        assert_eq!(
            outgoing,
            Some(OutgoingMessage {
                text: "hello".to_string(),
                to: Some("bob".to_string()),
            })
        );
        assert_eq!(composer.buffer(), "");
        assert_eq!(composer.target(), None);
    }
}
