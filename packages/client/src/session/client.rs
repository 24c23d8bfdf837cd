//! Client state machine.
//!
//! `ChatClient` owns the session state, the conversation store, and the
//! outbound composer, and drives all of them from a single `handle` entry
//! point. Envelope handlers run to completion before the next event; the
//! caller is the only writer of the one transport connection.

use std::sync::Arc;

use idobata_shared::time::Clock;
use tokio::sync::watch;

use crate::{
    composer::Composer,
    conversation::ConversationStore,
    domain::{self, ChatMessage, DisplayName, Identity, User},
    error::ClientError,
    infrastructure::dto::websocket::{ClientEnvelope, ServerEnvelope},
};

use super::{
    event::{ClientAction, ClientEvent},
    state::{ConnectionState, LostOutcome, SessionState},
    store::SessionToken,
};

/// Observable state published to the rendering layer after every event.
///
/// The roster comes out already sorted by the presence policy; the log is the
/// raw append-only order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    pub connection: ConnectionState,
    pub identity: Option<Identity>,
    pub error: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub roster: Vec<User>,
    pub target: Option<String>,
}

/// The connection/session state machine.
///
/// Feed events with [`ChatClient::handle`] and execute the returned actions;
/// observe state through [`ChatClient::subscribe`] or [`ChatClient::snapshot`].
pub struct ChatClient {
    state: SessionState,
    conversation: ConversationStore,
    composer: Composer,
    clock: Arc<dyn Clock>,
    snapshot_tx: watch::Sender<StateSnapshot>,
}

impl ChatClient {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (snapshot_tx, _) = watch::channel(StateSnapshot::default());
        Self {
            state: SessionState::new(),
            conversation: ConversationStore::new(),
            composer: Composer::new(),
            clock,
            snapshot_tx,
        }
    }

    /// Subscribe to state snapshots; one is published after every event.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current observable state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            connection: self.state.connection,
            identity: self.state.identity.clone(),
            error: self.state.last_error.clone(),
            messages: self.conversation.messages().to_vec(),
            roster: domain::sorted_by_presence(self.conversation.roster()),
            target: self.composer.target().map(String::from),
        }
    }

    /// Process one event and return the actions for the caller to execute.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<ClientAction> {
        let actions = match event {
            ClientEvent::Join { name } => self.handle_join(&name),
            ClientEvent::Opened => self.handle_opened(),
            ClientEvent::FrameReceived(text) => self.handle_frame(&text),
            ClientEvent::Closed => self.handle_closed(None),
            ClientEvent::TransportFailed(reason) => self.handle_closed(Some(reason)),
            ClientEvent::Tick => self.handle_tick(),
            ClientEvent::SendMessage { text } => self.handle_send(text),
            ClientEvent::ToggleTarget { peer } => self.handle_toggle(&peer),
            ClientEvent::Logout => self.handle_logout(),
        };
        let _ = self.snapshot_tx.send_replace(self.snapshot());
        actions
    }

    fn handle_join(&mut self, name: &str) -> Vec<ClientAction> {
        let now = self.clock.now_millis();
        if let Some(reason) = self.state.join_blocked(now) {
            tracing::warn!("join request rejected: {}", reason);
            return vec![];
        }
        match DisplayName::new(name) {
            Ok(display_name) => {
                self.state.begin_join(display_name, now);
                vec![ClientAction::Connect]
            }
            Err(e) => {
                // Validation failure never opens a connection.
                self.state.last_error = Some(e.to_string());
                vec![]
            }
        }
    }

    fn handle_opened(&mut self) -> Vec<ClientAction> {
        match self.state.transport_opened() {
            Some(name) => vec![ClientAction::Send(ClientEnvelope::Register {
                username: name.into_string(),
            })],
            None => {
                tracing::warn!("transport opened outside a join attempt; ignoring");
                vec![]
            }
        }
    }

    fn handle_frame(&mut self, text: &str) -> Vec<ClientAction> {
        let envelope: ServerEnvelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                // Malformed or unrecognized envelope: discard, keep the
                // connection.
                let err = ClientError::Protocol {
                    reason: e.to_string(),
                };
                tracing::warn!("{}", err);
                return vec![];
            }
        };
        match envelope {
            ServerEnvelope::Registered { id, username } => self.handle_registered(id, username),
            ServerEnvelope::Error { message } => self.handle_server_error(message),
            ServerEnvelope::History { messages } => {
                let me = self.state.identity.clone();
                let log = messages
                    .into_iter()
                    .map(|dto| dto.into_domain(me.as_ref()))
                    .collect();
                self.conversation.replace_log(log);
                vec![]
            }
            ServerEnvelope::Users { users } => {
                self.conversation
                    .replace_roster(users.into_iter().map(User::from).collect());
                vec![]
            }
            ServerEnvelope::Message(dto) => {
                let me = self.state.identity.clone();
                let message = dto.into_domain(me.as_ref());
                let reader_id = me.as_ref().map(|identity| identity.user_id.as_str());
                match self.conversation.apply_message(message, reader_id) {
                    Some(receipt) => vec![ClientAction::Send(ClientEnvelope::Read {
                        message_id: receipt.message_id,
                        reader_id: receipt.reader_id,
                    })],
                    None => vec![],
                }
            }
            ServerEnvelope::Read {
                message_id,
                read_by,
            } => {
                self.conversation.apply_read(&message_id, read_by);
                vec![]
            }
            ServerEnvelope::System { text, timestamp } => {
                self.conversation.apply_system(text, timestamp);
                vec![]
            }
        }
    }

    fn handle_registered(&mut self, id: String, username: String) -> Vec<ClientAction> {
        if self.state.connection != ConnectionState::AwaitingRegistration {
            tracing::warn!("unexpected registered envelope in {:?}", self.state.connection);
            return vec![];
        }
        let token = self.state.registration_completed(id, username);
        tracing::info!("registered as '{}'", token.display_name);
        vec![ClientAction::PersistToken(token)]
    }

    fn handle_server_error(&mut self, message: String) -> Vec<ClientAction> {
        if self.state.connection == ConnectionState::AwaitingRegistration {
            // Registration rejected: back to the join screen, token gone.
            let err = ClientError::Registration {
                message: message.clone(),
            };
            tracing::warn!("{}", err);
            self.state.registration_failed(message);
            return vec![ClientAction::ClearToken, ClientAction::Close];
        }
        // Post-registration server errors are a banner, not a teardown.
        self.state.last_error = Some(message);
        vec![]
    }

    fn handle_closed(&mut self, reason: Option<String>) -> Vec<ClientAction> {
        let now = self.clock.now_millis();
        match self.state.connection_lost(reason, now) {
            LostOutcome::Reconnecting => {
                tracing::info!("connection lost; reconnecting after backoff");
            }
            LostOutcome::GaveUp => {
                tracing::error!("giving up on reconnecting");
            }
            LostOutcome::Dropped => {
                tracing::warn!("connection lost without a resumable session");
            }
            LostOutcome::Ignored => {}
        }
        vec![]
    }

    fn handle_tick(&mut self) -> Vec<ClientAction> {
        let now = self.clock.now_millis();
        match self.state.backoff_elapsed(now) {
            Some(name) => {
                tracing::info!("reconnecting as '{}'", name);
                vec![ClientAction::Connect]
            }
            None => vec![],
        }
    }

    fn handle_send(&mut self, text: String) -> Vec<ClientAction> {
        self.composer.set_buffer(text);
        if self.state.connection != ConnectionState::Active {
            tracing::debug!("dropping send attempt while not active");
            return vec![];
        }
        match self.composer.take_outgoing() {
            Some(outgoing) => vec![ClientAction::Send(ClientEnvelope::Message {
                text: outgoing.text,
                to: outgoing.to,
            })],
            None => vec![],
        }
    }

    fn handle_toggle(&mut self, peer: &str) -> Vec<ClientAction> {
        self.composer.toggle_target(peer);
        vec![]
    }

    fn handle_logout(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if self.state.connection == ConnectionState::Active {
            // Best effort; teardown proceeds even if this send fails.
            actions.push(ClientAction::Send(ClientEnvelope::Logout));
        }
        actions.push(ClientAction::Close);
        actions.push(ClientAction::ClearToken);
        self.state.logged_out();
        self.conversation.clear();
        self.composer.clear();
        actions
    }
}
