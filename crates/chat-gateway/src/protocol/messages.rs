//! Chat text on the wire
//!
//! Every frame the server writes is plain UTF-8: chat lines, join and leave
//! notices, several of them joined by `\n` when they were queued together.

use chrono::{DateTime, TimeZone};

/// Timestamp layout of a chat line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between payloads coalesced into one frame
pub const FRAME_SEPARATOR: char = '\n';

/// Flatten client text to a single trimmed line
///
/// Any line break (`\n`, `\r\n` or a lone `\r`) becomes one space.
pub fn normalize(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// `[YYYY-MM-DD HH:MM:SS] <name>: <content>`
pub fn chat_line<Tz>(at: &DateTime<Tz>, name: &str, content: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] {name}: {content}", at.format(TIMESTAMP_FORMAT))
}

pub fn join_notice(name: &str) -> String {
    format!("{name} has joined the chat")
}

pub fn leave_notice(name: &str) -> String {
    format!("{name} has left the chat")
}
