//! Gateway protocol definitions
//!
//! Text formats written to chat clients.

mod messages;

pub use messages::{
    chat_line, join_notice, leave_notice, normalize, FRAME_SEPARATOR, TIMESTAMP_FORMAT,
};
