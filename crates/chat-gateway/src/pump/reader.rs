//! Inbound half of a connection
//!
//! Turns client frames into chat lines for the hub. The read deadline only moves
//! when the peer answers a ping, so a client that keeps typing but never pongs is
//! still dropped.

use super::PumpError;
use crate::hub::Hub;
use crate::protocol::{chat_line, normalize};
use axum::extract::ws::Message;
use chat_common::WebSocketConfig;
use chrono::Local;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use tokio::time::{timeout_at, Instant};

/// Run the reader until the peer leaves or breaks the protocol
pub(crate) async fn read_loop<S, E>(
    mut stream: S,
    hub: &Hub,
    name: &str,
    config: &WebSocketConfig,
) -> Result<(), PumpError>
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut deadline = Instant::now() + config.pong_wait;

    loop {
        let message = match timeout_at(deadline, stream.next()).await {
            Err(_) => return Err(PumpError::ReadTimeout(config.pong_wait)),
            Ok(None) => return Ok(()),
            Ok(Some(Err(e))) => return Err(PumpError::Transport(e.to_string())),
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => relay(&text, hub, name, config).await?,
            Message::Binary(bytes) => {
                let text = String::from_utf8(bytes).map_err(|_| PumpError::InvalidUtf8)?;
                relay(&text, hub, name, config).await?;
            }
            Message::Pong(_) => {
                deadline = Instant::now() + config.pong_wait;
            }
            // Answered by the websocket layer
            Message::Ping(_) => {}
            Message::Close(_) => return Ok(()),
        }
    }
}

async fn relay(
    text: &str,
    hub: &Hub,
    name: &str,
    config: &WebSocketConfig,
) -> Result<(), PumpError> {
    if text.len() > config.max_message_size {
        return Err(PumpError::MessageTooLarge {
            size: text.len(),
            limit: config.max_message_size,
        });
    }

    let content = normalize(text);
    hub.broadcast(chat_line(&Local::now(), name, &content)).await;
    Ok(())
}
