//! WebSocket transport adapter.
//!
//! Owns the one bidirectional connection. The read half runs on its own task
//! and surfaces lifecycle events plus raw inbound frames over a channel; the
//! write half stays with the caller so that all sends serialize through a
//! single writer.

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::error::ClientError;

/// Lifecycle events and raw frames emitted by the read half.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection is open and writable
    Opened,
    /// One raw text frame arrived
    Frame(String),
    /// The server closed the connection or the stream ended
    Closed,
    /// The connection failed mid-stream
    Failed(String),
}

/// Write half of an established connection.
pub struct WsTransport {
    sink: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
}

/// Connect to the chat server.
///
/// On success the returned receiver has already been primed with
/// [`TransportEvent::Opened`]; frames and the final close/failure follow in
/// order. Dropping the receiver stops the read task.
pub async fn connect(
    url: &str,
) -> Result<(WsTransport, mpsc::UnboundedReceiver<TransportEvent>), ClientError> {
    let (ws_stream, _response) =
        connect_async(url)
            .await
            .map_err(|e| ClientError::Transport {
                reason: e.to_string(),
            })?;

    let (sink, mut stream) = ws_stream.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // The connection is writable as soon as the handshake completes.
    let _ = tx.send(TransportEvent::Opened);

    tokio::spawn(async move {
        let mut failed = false;
        while let Some(next) = stream.next().await {
            match next {
                Ok(Message::Text(text)) => {
                    if tx.send(TransportEvent::Frame(text.to_string())).is_err() {
                        // Receiver dropped; nobody is listening anymore.
                        return;
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    let _ = tx.send(TransportEvent::Failed(e.to_string()));
                    failed = true;
                    break;
                }
                _ => {}
            }
        }
        if !failed {
            let _ = tx.send(TransportEvent::Closed);
        }
    });

    Ok((WsTransport { sink }, rx))
}

impl WsTransport {
    /// Send one serialized envelope as a text frame.
    pub async fn send(&mut self, payload: String) -> Result<(), ClientError> {
        self.sink
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| ClientError::Transport {
                reason: e.to_string(),
            })
    }

    /// Close the connection. Idempotent; errors are swallowed because close
    /// always races with the server tearing down its side.
    pub async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}
