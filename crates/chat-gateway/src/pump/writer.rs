//! Outbound half of a connection
//!
//! Drains the connection's queue onto the socket and keeps the peer alive with
//! periodic pings. Every write is bounded by the write deadline.

use super::PumpError;
use crate::protocol::FRAME_SEPARATOR;
use axum::extract::ws::Message;
use chat_common::WebSocketConfig;
use futures_util::{Sink, SinkExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

/// Run the writer until the queue closes or a write fails
///
/// A closed queue means the hub dropped the connection: a close frame is sent
/// and the loop ends normally.
pub(crate) async fn write_loop<W>(
    mut sink: W,
    mut queue: mpsc::Receiver<Arc<str>>,
    config: &WebSocketConfig,
) -> Result<(), PumpError>
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let mut keepalive = interval_at(Instant::now() + config.ping_period, config.ping_period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            payload = queue.recv() => match payload {
                Some(first) => {
                    let frame = coalesce(&first, &mut queue);
                    send(&mut sink, Message::Text(frame), config.write_wait).await?;
                }
                None => {
                    send(&mut sink, Message::Close(None), config.write_wait).await?;
                    return Ok(());
                }
            },
            _ = keepalive.tick() => {
                send(&mut sink, Message::Ping(Vec::new()), config.write_wait).await?;
            }
        }
    }
}

/// Join `first` with everything already waiting in the queue
fn coalesce(first: &str, queue: &mut mpsc::Receiver<Arc<str>>) -> String {
    let mut frame = String::from(first);
    while let Ok(next) = queue.try_recv() {
        frame.push(FRAME_SEPARATOR);
        frame.push_str(&next);
    }
    frame
}

async fn send<W>(sink: &mut W, message: Message, deadline: Duration) -> Result<(), PumpError>
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    match timeout(deadline, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(PumpError::Transport(e.to_string())),
        Err(_) => Err(PumpError::WriteTimeout(deadline)),
    }
}
