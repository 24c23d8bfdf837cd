//! Client execution loop.
//!
//! Wires the pure state machine to the real world: the WebSocket transport,
//! the rustyline input thread, the tick interval, and the session token
//! store. Everything funnels through one event queue so envelope handlers
//! and user intents never interleave mid-update.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use idobata_shared::time::SystemClock;

use crate::{
    error::ClientError,
    infrastructure::transport::{self, TransportEvent, WsTransport},
    session::{
        ChatClient, ClientAction, ClientEvent, ConnectionState, SessionStore, StateSnapshot,
    },
    ui::{self, MessageFormatter},
};

/// How often the state machine receives time ticks (drives cooldown and
/// reconnect backoff processing).
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Parsed user input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputCommand {
    /// Send the line as a message to the current target
    Send(String),
    /// `/to <peer>`: select or deselect a private conversation target
    ToggleTarget(String),
    /// `/join <name>`: join (again) with a display name, e.g. after a logout
    Join(String),
    /// `/logout`: end the session and forget the resumption token
    Logout,
    /// `/quit`: leave the process, keeping the token for resumption
    Quit,
}

fn parse_input(line: &str) -> Option<InputCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(peer) = trimmed.strip_prefix("/to ") {
        let peer = peer.trim();
        if peer.is_empty() {
            return None;
        }
        return Some(InputCommand::ToggleTarget(peer.to_string()));
    }
    if let Some(name) = trimmed.strip_prefix("/join ") {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        return Some(InputCommand::Join(name.to_string()));
    }
    match trimmed {
        "/logout" => Some(InputCommand::Logout),
        "/quit" | "/exit" => Some(InputCommand::Quit),
        // Operand-less command, not a message
        "/to" | "/join" => None,
        _ => Some(InputCommand::Send(trimmed.to_string())),
    }
}

/// Run the chat client until the user quits or logs out.
///
/// Attempts silent resumption from the token store first; `display_name` is
/// the fallback for a fresh join. `/quit` keeps the persisted token so the
/// next start resumes the session, `/logout` clears it.
pub async fn run_client(
    url: String,
    display_name: Option<String>,
    store: Arc<dyn SessionStore>,
) -> Result<(), ClientError> {
    let clock = Arc::new(SystemClock);
    let mut client = ChatClient::new(clock);

    let resumed = match store.load().await {
        Ok(Some(token)) => {
            tracing::info!("resuming session as '{}'", token.display_name);
            Some(token.display_name)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    };
    let Some(name) = resumed.or(display_name) else {
        return Err(ClientError::Validation {
            name: String::new(),
        });
    };

    println!(
        "\nConnecting to {} as '{}'. Type messages and press Enter to send.\n\
         Commands: /to <peer> (toggle private target), /join <name>, /logout, /quit\n",
        url, name
    );

    // rustyline is synchronous; it gets its own thread feeding the loop.
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt_name = name.clone();
    std::thread::spawn(move || input_loop(&prompt_name, &input_tx));

    let mut transport: Option<WsTransport> = None;
    let mut transport_rx: Option<mpsc::UnboundedReceiver<TransportEvent>> = None;
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    let mut renderer = Renderer::new(name.clone());

    let mut pending = VecDeque::from([ClientEvent::Join { name }]);

    loop {
        // Run queued events to completion before waiting again; actions may
        // enqueue follow-up events (e.g. a failed connect).
        while let Some(event) = pending.pop_front() {
            let actions = client.handle(event);
            execute_actions(
                actions,
                &url,
                &mut transport,
                &mut transport_rx,
                store.as_ref(),
                &mut pending,
            )
            .await;
        }
        renderer.render(&client.snapshot());

        tokio::select! {
            maybe_event = next_transport_event(&mut transport_rx) => match maybe_event {
                Some(TransportEvent::Opened) => pending.push_back(ClientEvent::Opened),
                Some(TransportEvent::Frame(text)) => {
                    pending.push_back(ClientEvent::FrameReceived(text));
                }
                Some(TransportEvent::Closed) => {
                    transport = None;
                    transport_rx = None;
                    pending.push_back(ClientEvent::Closed);
                }
                Some(TransportEvent::Failed(reason)) => {
                    transport = None;
                    transport_rx = None;
                    pending.push_back(ClientEvent::TransportFailed(reason));
                }
                None => transport_rx = None,
            },
            line = input_rx.recv() => match line {
                Some(line) => match parse_input(&line) {
                    Some(InputCommand::Send(text)) => {
                        pending.push_back(ClientEvent::SendMessage { text });
                    }
                    Some(InputCommand::ToggleTarget(peer)) => {
                        pending.push_back(ClientEvent::ToggleTarget { peer });
                    }
                    Some(InputCommand::Join(name)) => {
                        pending.push_back(ClientEvent::Join { name });
                    }
                    Some(InputCommand::Logout) => pending.push_back(ClientEvent::Logout),
                    Some(InputCommand::Quit) => break,
                    None => {}
                },
                // Input thread ended (Ctrl+C / Ctrl+D)
                None => break,
            },
            _ = ticker.tick() => pending.push_back(ClientEvent::Tick),
        }
    }

    // Leaving via /quit keeps the token so the next start can resume; the
    // connection itself is closed cleanly.
    if let Some(mut t) = transport.take() {
        t.close().await;
    }
    Ok(())
}

/// Execute the actions produced by one event.
///
/// Follow-up events (a failed connect attempt) go back into the queue so the
/// state machine sees them in order.
async fn execute_actions(
    actions: Vec<ClientAction>,
    url: &str,
    transport: &mut Option<WsTransport>,
    transport_rx: &mut Option<mpsc::UnboundedReceiver<TransportEvent>>,
    store: &dyn SessionStore,
    pending: &mut VecDeque<ClientEvent>,
) {
    for action in actions {
        match action {
            ClientAction::Connect => match transport::connect(url).await {
                Ok((t, rx)) => {
                    *transport = Some(t);
                    *transport_rx = Some(rx);
                }
                Err(e) => {
                    tracing::warn!("connect failed: {}", e);
                    pending.push_back(ClientEvent::TransportFailed(e.to_string()));
                }
            },
            ClientAction::Send(envelope) => {
                let json = match serde_json::to_string(&envelope) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("failed to serialize envelope: {}", e);
                        continue;
                    }
                };
                match transport.as_mut() {
                    // A failed send is only logged: the read half reports the
                    // broken connection and drives the reconnect path.
                    Some(t) => {
                        if let Err(e) = t.send(json).await {
                            tracing::warn!("send failed: {}", e);
                        }
                    }
                    None => tracing::warn!("dropping envelope; no open connection"),
                }
            }
            ClientAction::Close => {
                if let Some(mut t) = transport.take() {
                    t.close().await;
                }
                *transport_rx = None;
            }
            ClientAction::PersistToken(token) => {
                if let Err(e) = store.save(&token).await {
                    tracing::warn!("{}", e);
                }
            }
            ClientAction::ClearToken => {
                if let Err(e) = store.clear().await {
                    tracing::warn!("{}", e);
                }
            }
        }
    }
}

async fn next_transport_event(
    rx: &mut Option<mpsc::UnboundedReceiver<TransportEvent>>,
) -> Option<TransportEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => futures_util::future::pending().await,
    }
}

/// Blocking readline loop on its own thread.
fn input_loop(prompt_name: &str, input_tx: &mpsc::UnboundedSender<String>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            tracing::error!("Failed to initialize readline: {}", e);
            return;
        }
    };

    let prompt = format!("{}> ", prompt_name);

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                tracing::info!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                tracing::info!("EOF");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                break;
            }
        }
    }
}

/// Incremental renderer over state snapshots.
///
/// Tracks what has already been printed so each snapshot only emits the
/// delta: new log entries, a changed roster, a changed banner or status.
struct Renderer {
    fallback_name: String,
    printed_messages: usize,
    last_roster_names: Vec<String>,
    last_error: Option<String>,
    last_connection: ConnectionState,
}

impl Renderer {
    fn new(fallback_name: String) -> Self {
        Self {
            fallback_name,
            printed_messages: 0,
            last_roster_names: vec![],
            last_error: None,
            last_connection: ConnectionState::Disconnected,
        }
    }

    fn render(&mut self, snapshot: &StateSnapshot) {
        let mut printed = false;
        let my_name = snapshot
            .identity
            .as_ref()
            .map(|identity| identity.display_name.as_str())
            .unwrap_or(&self.fallback_name);

        if snapshot.connection != self.last_connection {
            print!("{}", MessageFormatter::format_status(snapshot.connection));
            self.last_connection = snapshot.connection;
            printed = true;
        }

        if snapshot.error != self.last_error {
            if let Some(error) = &snapshot.error {
                print!("{}", MessageFormatter::format_error(error));
                printed = true;
            }
            self.last_error = snapshot.error.clone();
        }

        // The log shrinks only when it was replaced (history) or cleared
        // (logout); start over in that case.
        if snapshot.messages.len() < self.printed_messages {
            self.printed_messages = 0;
        }
        for message in &snapshot.messages[self.printed_messages..] {
            print!("{}", MessageFormatter::format_message(message));
            printed = true;
        }
        self.printed_messages = snapshot.messages.len();

        let roster_names: Vec<String> = snapshot
            .roster
            .iter()
            .map(|u| format!("{}:{}", u.display_name, u.online))
            .collect();
        if roster_names != self.last_roster_names {
            print!(
                "{}",
                MessageFormatter::format_roster(&snapshot.roster, my_name)
            );
            self.last_roster_names = roster_names;
            printed = true;
        }

        if printed {
            ui::redisplay_prompt(my_name, snapshot.target.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::session::{MockSessionStore, SessionToken};

    use super::*;

    #[test]
    fn test_parse_input_plain_line_is_a_message() {
        // テスト項目: 通常の行はメッセージ送信として解釈される
        // given (前提条件):
        let line = "  hello there  ";

        // when (操作):
        let command = parse_input(line);

        // then (期待する結果):
        assert_eq!(command, Some(InputCommand::Send("hello there".to_string())));
    }

    #[test]
    fn test_parse_input_to_command_toggles_target() {
        // テスト項目: "/to <peer>" がターゲット切り替えとして解釈される
        // given (前提条件):
        let line = "/to bob";

        // when (操作):
        let command = parse_input(line);

        // then (期待する結果):
        assert_eq!(
            command,
            Some(InputCommand::ToggleTarget("bob".to_string()))
        );
    }

    #[test]
    fn test_parse_input_special_commands() {
        // テスト項目: /join・/logout・/quit・空行・相手なしの /to が正しく解釈される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(
            parse_input("/join carol"),
            Some(InputCommand::Join("carol".to_string()))
        );
        assert_eq!(parse_input("/logout"), Some(InputCommand::Logout));
        assert_eq!(parse_input("/quit"), Some(InputCommand::Quit));
        assert_eq!(parse_input("/exit"), Some(InputCommand::Quit));
        assert_eq!(parse_input("   "), None);
        assert_eq!(parse_input("/to   "), None);
        assert_eq!(parse_input("/join "), None);
    }

    #[tokio::test]
    async fn test_execute_actions_persists_and_clears_token() {
        // テスト項目: PersistToken / ClearToken アクションがストアに伝わる
        // given (前提条件):
        let mut store = MockSessionStore::new();
        let token = SessionToken {
            user_id: "u1".to_string(),
            display_name: "alice".to_string(),
        };
        let expected = token.clone();
        store
            .expect_save()
            .withf(move |t| *t == expected)
            .times(1)
            .returning(|_| Ok(()));
        store.expect_clear().times(1).returning(|| Ok(()));

        let mut transport = None;
        let mut transport_rx = None;
        let mut pending = VecDeque::new();

        // when (操作):
        execute_actions(
            vec![
                ClientAction::PersistToken(token),
                ClientAction::ClearToken,
            ],
            "ws://unused",
            &mut transport,
            &mut transport_rx,
            &store,
            &mut pending,
        )
        .await;

        // then (期待する結果):
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_execute_actions_send_without_connection_is_swallowed() {
        // テスト項目: 接続がない状態の Send はエラーにならず破棄される
        // given (前提条件):
        let store = MockSessionStore::new();
        let mut transport = None;
        let mut transport_rx = None;
        let mut pending = VecDeque::new();

        // when (操作):
        execute_actions(
            vec![ClientAction::Send(
                crate::infrastructure::dto::websocket::ClientEnvelope::Logout,
            )],
            "ws://unused",
            &mut transport,
            &mut transport_rx,
            &store,
            &mut pending,
        )
        .await;

        // then (期待する結果):
        assert!(pending.is_empty());
    }
}
