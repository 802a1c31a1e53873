//! Connection pump
//!
//! Moves frames between one socket and the hub. The reader and writer run as
//! separate tasks; whichever stops first triggers a single teardown that removes
//! the connection from the hub, announces the departure and drops the socket.

mod reader;
mod writer;

use crate::connection::Mailbox;
use crate::hub::Hub;
use crate::protocol::leave_notice;
use axum::extract::ws::Message;
use chat_common::WebSocketConfig;
use futures_util::{Sink, Stream, StreamExt};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

/// Why one side of a pump stopped
#[derive(Debug, Error)]
pub enum PumpError {
    #[error("no pong received within {0:?}")]
    ReadTimeout(Duration),

    #[error("write not completed within {0:?}")]
    WriteTimeout(Duration),

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("binary frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Reader,
    Writer,
}

/// Pump a registered connection until it ends, then tear it down
///
/// The connection behind `mailbox` must already be registered with `hub`.
pub async fn run<S, E>(socket: S, hub: Hub, mailbox: Mailbox, config: WebSocketConfig)
where
    S: Stream<Item = Result<Message, E>> + Sink<Message> + Send + 'static,
    E: Display + Send + 'static,
    <S as Sink<Message>>::Error: Display + Send,
{
    let (connection, queue) = mailbox.into_parts();
    let connection_id = connection.id;
    let name = connection.identity.display_name.clone();
    let (sink, stream) = socket.split();

    let mut reader = {
        let hub = hub.clone();
        let name = name.clone();
        let config = config.clone();
        tokio::spawn(async move { reader::read_loop(stream, &hub, &name, &config).await })
    };
    let mut writer = {
        let config = config.clone();
        tokio::spawn(async move { writer::write_loop(sink, queue, &config).await })
    };

    let first = tokio::select! {
        result = &mut reader => {
            log_exit(connection_id, Side::Reader, result);
            Side::Reader
        }
        result = &mut writer => {
            log_exit(connection_id, Side::Writer, result);
            Side::Writer
        }
    };

    connection.mark_dead();
    hub.unregister(connection_id).await;
    hub.broadcast(leave_notice(&name)).await;

    match first {
        Side::Reader => {
            // Unregistering closed the queue; let the close frame go out
            let grace = config.write_wait * 2;
            match tokio::time::timeout(grace, &mut writer).await {
                Ok(result) => log_exit(connection_id, Side::Writer, result),
                Err(_) => {
                    tracing::warn!(connection_id = %connection_id, "Writer did not finish, aborting");
                    writer.abort();
                }
            }
        }
        Side::Writer => {
            reader.abort();
            stop(reader).await;
        }
    }

    tracing::info!(
        connection_id = %connection_id,
        user_id = %connection.identity.user_id,
        "Connection closed"
    );
}

async fn stop(handle: JoinHandle<Result<(), PumpError>>) {
    // Cancellation is the expected outcome here
    let _ = handle.await;
}

fn log_exit(
    connection_id: crate::connection::ConnectionId,
    side: Side,
    result: Result<Result<(), PumpError>, JoinError>,
) {
    match result {
        Ok(Ok(())) => {
            tracing::debug!(connection_id = %connection_id, side = ?side, "Pump side finished");
        }
        Ok(Err(e)) => {
            tracing::info!(
                connection_id = %connection_id,
                side = ?side,
                error = %e,
                "Pump side stopped"
            );
        }
        Err(e) if e.is_cancelled() => {}
        Err(e) => {
            tracing::error!(connection_id = %connection_id, side = ?side, error = %e, "Pump task failed");
        }
    }
}
