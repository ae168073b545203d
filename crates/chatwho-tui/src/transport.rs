//! WebSocket room channel.
//!
//! Opens a WebSocket to the room endpoint and bridges it onto a pair of mpsc
//! channels, so the driver can poll frames without blocking. One task owns
//! the socket and pumps text frames in both directions until either side
//! closes.

use chatwho_core::Frame;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc, task::AbortHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

/// Capacity of each direction of a [`Channel`].
pub const CHANNEL_CAPACITY: usize = 64;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The WebSocket handshake failed.
    #[error("failed to open {url}: {source}")]
    Connect {
        /// Endpoint that was dialled.
        url: String,
        /// Underlying WebSocket error.
        source: Box<tungstenite::Error>,
    },
}

/// An open room channel carrying raw text frames.
pub struct Channel {
    /// Frames to send to the room.
    pub to_server: mpsc::Sender<String>,
    /// Frames received from the room.
    pub from_server: mpsc::Receiver<String>,
    abort_handle: AbortHandle,
}

impl Channel {
    /// Wrap channel halves whose pump task is `abort_handle`.
    pub fn new(
        to_server: mpsc::Sender<String>,
        from_server: mpsc::Receiver<String>,
        abort_handle: AbortHandle,
    ) -> Self {
        Self { to_server, from_server, abort_handle }
    }

    /// Stop the pump task. `from_server` reports closed afterwards.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Build the endpoint for `room` under `party` on `server`.
///
/// `http` and `https` schemes map to `ws` and `wss`. A bare host gets `ws://`.
pub fn room_url(server: &str, party: &str, room: &str) -> String {
    let server = server.trim_end_matches('/');
    let base = if let Some(rest) = server.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = server.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if server.contains("://") {
        server.to_string()
    } else {
        format!("ws://{server}")
    };

    format!("{base}/parties/{party}/{room}")
}

/// Connect to `url` and spawn the pump task.
pub async fn connect(url: &str) -> Result<Channel, TransportError> {
    let (stream, _response) = connect_async(url)
        .await
        .map_err(|e| TransportError::Connect { url: url.to_string(), source: Box::new(e) })?;
    tracing::info!(url, "room channel open");

    let (to_server, outgoing) = mpsc::channel(CHANNEL_CAPACITY);
    let (incoming, from_server) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(run_connection(stream, outgoing, incoming));

    Ok(Channel::new(to_server, from_server, handle.abort_handle()))
}

/// Pump frames between the socket and the channel halves.
///
/// Returning drops `incoming`, which the driver observes as a disconnect.
async fn run_connection(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outgoing: mpsc::Receiver<String>,
    incoming: mpsc::Sender<String>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            maybe_text = outgoing.recv() => {
                let Some(text) = maybe_text else {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::warn!(error = %e, "websocket send failed");
                    break;
                }
            }

            maybe_message = source.next() => match maybe_message {
                Some(Ok(Message::Text(text))) => {
                    if incoming.send(text.as_str().to_owned()).await.is_err() {
                        break;
                    }
                },
                Some(Ok(Message::Binary(bytes))) => {
                    let Some(text) = binary_text(&bytes) else {
                        continue;
                    };
                    if incoming.send(text).await.is_err() {
                        break;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "room closed the channel");
                    break;
                },
                // Ping and pong are answered by tungstenite.
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "websocket receive failed");
                    break;
                },
                None => break,
            }
        }
    }
}

/// Frame text carried in a binary payload, or `None` (logged) if it is not UTF-8.
fn binary_text(bytes: &[u8]) -> Option<String> {
    match Frame::text_from_bytes(bytes) {
        Ok(text) => Some(text.to_owned()),
        Err(err) => {
            tracing::warn!(error = %err, len = bytes.len(), "dropped binary frame");
            None
        },
    }
}
