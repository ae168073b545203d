//! In-process room.
//!
//! Runs a [`SimHub`] in a tokio task behind the same [`Channel`] the
//! WebSocket transport produces. No network: frames flow through mpsc
//! channels. A built-in assistant answers every user message by streaming
//! the text back word by word, first as an empty `add` and then as a series
//! of `update` frames.

use std::time::Duration;

use chatwho_app::SystemEnv;
use chatwho_core::{Frame, Role};
use chatwho_harness::{SessionId, SimHub};
use tokio::sync::mpsc::{self, error::SendError};

use crate::transport::{CHANNEL_CAPACITY, Channel};

/// Display name of the built-in assistant.
pub const ASSISTANT_NAME: &str = "Echo";

/// Spawn an in-process room with one joined session.
///
/// `stream_delay` is the pause between streamed assistant updates.
pub fn spawn_server(stream_delay: Duration) -> Channel {
    let (client_tx, mut server_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (server_tx, client_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        let mut hub = SimHub::new(SystemEnv::new());
        let (session, catch_up) = hub.join();

        if server_tx.send(catch_up.encode()).await.is_err() {
            return;
        }

        while let Some(raw) = server_rx.recv().await {
            let broadcast = match hub.receive_raw(session, &raw) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(session, error = %e, "in-process room rejected frame");
                    continue;
                },
            };

            let prompt = match &broadcast {
                Frame::Add(message) if message.role == Role::User => Some(message.content.clone()),
                _ => None,
            };

            if server_tx.send(broadcast.encode()).await.is_err() {
                break;
            }

            let Some(prompt) = prompt else {
                continue;
            };
            if stream_reply(&mut hub, session, &server_tx, &prompt, stream_delay).await.is_err() {
                break;
            }
        }

        hub.leave(session);
    });

    Channel::new(client_tx, client_rx, handle.abort_handle())
}

/// Post an empty assistant message and grow it one word per update.
async fn stream_reply(
    hub: &mut SimHub<SystemEnv>,
    session: SessionId,
    tx: &mpsc::Sender<String>,
    prompt: &str,
    delay: Duration,
) -> Result<(), SendError<String>> {
    let add = hub.post(ASSISTANT_NAME, "");
    let Frame::Add(reply) = &add else {
        return Ok(());
    };
    let id = reply.id.clone();
    tracing::debug!(session, %id, "streaming assistant reply");
    tx.send(add.encode()).await?;

    let mut text = String::with_capacity(prompt.len());
    for word in prompt.split_inclusive(char::is_whitespace) {
        tokio::time::sleep(delay).await;
        text.push_str(word);
        if let Some(update) = hub.edit(&id, text.as_str()) {
            tx.send(update.encode()).await?;
        }
    }

    Ok(())
}
