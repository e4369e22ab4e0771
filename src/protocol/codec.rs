//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────────┬────────┐
//! │ Size (4) │  Id (4)  │ Type (4) │  Body (UTF-8)    │ 00 00  │
//! └──────────┴──────────┴──────────┴──────────────────┴────────┘
//! ```
//!
//! All integers are little-endian. `Size` counts everything after itself:
//! `4 + 4 + len(body) + 2`.

use std::io::Write;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Frame, OutboundCommand};
use crate::error::{RconError, Result};

/// Size prefix length
pub const SIZE_PREFIX_LEN: usize = 4;

/// Id + type
pub const HEADER_SIZE: usize = 8;

/// Two trailing zero bytes
pub const TERMINATOR_SIZE: usize = 2;

/// Maximum outbound body size (256 KB)
pub const MAX_BODY_SIZE: usize = 256 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode one frame, size prefix included
pub fn encode(id: i32, packet_type: i32, body: &str) -> Result<Bytes> {
    let body = body.as_bytes();
    if body.len() > MAX_BODY_SIZE {
        return Err(RconError::BodyTooLarge {
            size: body.len(),
            max: MAX_BODY_SIZE,
        });
    }

    let size = HEADER_SIZE + body.len() + TERMINATOR_SIZE;

    let mut buf = BytesMut::with_capacity(SIZE_PREFIX_LEN + size);
    buf.put_i32_le(size as i32);
    buf.put_i32_le(id);
    buf.put_i32_le(packet_type);
    buf.put_slice(body);
    buf.put_u16(0);

    Ok(buf.freeze())
}

/// Encode an outbound command
pub fn encode_command(command: &OutboundCommand) -> Result<Bytes> {
    encode(command.id, command.kind.value(), &command.body)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a frame body (the bytes following the size prefix)
///
/// Frames shorter than the terminator keep whatever follows the header as
/// payload.
pub fn decode(body: &[u8]) -> Result<Frame> {
    if body.len() < HEADER_SIZE {
        return Err(RconError::MalformedFrame(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            body.len()
        )));
    }

    let mut header = &body[..HEADER_SIZE];
    let id = header.get_i32_le();
    let packet_type = header.get_i32_le();

    let end = if body.len() >= HEADER_SIZE + TERMINATOR_SIZE {
        body.len() - TERMINATOR_SIZE
    } else {
        body.len()
    };

    Ok(Frame {
        id,
        packet_type,
        payload: Bytes::copy_from_slice(&body[HEADER_SIZE..end]),
    })
}

/// Parse a size prefix, rejecting values the stream cannot recover from
pub fn decode_size(prefix: [u8; SIZE_PREFIX_LEN], max_frame_size: usize) -> Result<usize> {
    let size = i32::from_le_bytes(prefix);
    if size < 0 {
        return Err(RconError::MalformedFrame(format!("Negative frame size: {}", size)));
    }

    let size = size as usize;
    if size > max_frame_size {
        return Err(RconError::MalformedFrame(format!(
            "Frame too large: {} bytes (max {})",
            size, max_frame_size
        )));
    }
    Ok(size)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a command to a stream and flush it
pub fn write_command<W: Write>(writer: &mut W, command: &OutboundCommand) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
