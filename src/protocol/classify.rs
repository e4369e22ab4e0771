//! Response classification
//!
//! The protocol has no explicit end-of-response marker, so inbound frames are
//! told apart by their length and by the low byte of the `type` field. Every
//! submitted command is followed by an empty terminator command whose echo
//! has a distinct shape; that echo is what closes a multi-frame response.
//!
//! Rules, first match wins:
//! 1. `body[4] == 1` -> Chat
//! 2. length 256 -> CommandCompleteSentinel
//! 3. length 10 -> AuthSuccess if `body[4] == 2`, else Empty
//! 4. anything else long enough to strip -> ResponseFragment
//!
//! Frames too short for the offsets above are Unknown.
//!
//! A genuine 256-byte response fragment is indistinguishable from the
//! sentinel and is reported as one.

use super::codec::{HEADER_SIZE, TERMINATOR_SIZE};
use super::PacketType;

/// Byte offset of the low byte of the `type` field
pub const TYPE_BYTE_OFFSET: usize = 4;

/// Frame length of an empty frame (auth ack or empty response)
pub const EMPTY_FRAME_LEN: usize = HEADER_SIZE + TERMINATOR_SIZE;

/// Frame length that marks the end of a command response
pub const COMMAND_COMPLETE_LEN: usize = 256;

/// An inbound frame after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedResponse {
    /// Password accepted
    AuthSuccess,

    /// Broadcast chat, not tied to any command
    Chat(Vec<String>),

    /// Part of the current command's output
    ResponseFragment(Vec<String>),

    /// Current command's output is complete
    ///
    /// Lines are carried for completeness only.
    CommandCompleteSentinel(Vec<String>),

    /// Empty acknowledgement
    Empty,

    /// Frame matched none of the known shapes
    Unknown,
}

impl ClassifiedResponse {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifiedResponse::AuthSuccess => "auth-success",
            ClassifiedResponse::Chat(_) => "chat",
            ClassifiedResponse::ResponseFragment(_) => "fragment",
            ClassifiedResponse::CommandCompleteSentinel(_) => "command-complete",
            ClassifiedResponse::Empty => "empty",
            ClassifiedResponse::Unknown => "unknown",
        }
    }
}

/// Classify a frame body (the bytes following the size prefix)
///
/// Depends only on the bytes given.
pub fn classify(body: &[u8]) -> ClassifiedResponse {
    let type_byte = match body.get(TYPE_BYTE_OFFSET) {
        Some(&b) => b as i32,
        None => return ClassifiedResponse::Unknown,
    };

    if type_byte == PacketType::Chat.value() {
        return match split_payload(body) {
            Some(lines) => ClassifiedResponse::Chat(lines),
            None => ClassifiedResponse::Unknown,
        };
    }

    match body.len() {
        COMMAND_COMPLETE_LEN => match split_payload(body) {
            Some(lines) => ClassifiedResponse::CommandCompleteSentinel(lines),
            None => ClassifiedResponse::Unknown,
        },
        EMPTY_FRAME_LEN => {
            if type_byte == PacketType::AUTH_RESPONSE {
                ClassifiedResponse::AuthSuccess
            } else {
                ClassifiedResponse::Empty
            }
        }
        _ => match split_payload(body) {
            Some(lines) => ClassifiedResponse::ResponseFragment(lines),
            None => ClassifiedResponse::Unknown,
        },
    }
}

/// Strip id + type and the terminator, then split into non-empty lines
fn split_payload(body: &[u8]) -> Option<Vec<String>> {
    if body.len() < HEADER_SIZE + TERMINATOR_SIZE {
        return None;
    }
    let payload = &body[HEADER_SIZE..body.len() - TERMINATOR_SIZE];
    Some(split_lines(&String::from_utf8_lossy(payload)))
}

/// Split on line feeds, dropping empty lines
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
