//! Protocol Module
//!
//! Defines the RCON wire protocol spoken with the game server.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────────┬────────┐
//! │ Size (4) │  Id (4)  │ Type (4) │  Body (UTF-8)    │ 00 00  │
//! └──────────┴──────────┴──────────┴──────────────────┴────────┘
//! ```
//!
//! ### Packet Types
//! - 0x00: RESPONSE_VALUE  - server output
//! - 0x01: CHAT            - chat broadcast
//! - 0x02: EXECCOMMAND     - console command (also the auth-response value)
//! - 0x03: AUTH            - authentication request
//!
//! ### Response Shapes
//! - 10 bytes:  auth acknowledgement or empty response
//! - 256 bytes: end of a command's output
//! - other:     a fragment of a command's output

mod packet;
mod codec;
mod classify;

pub use packet::{Frame, OutboundCommand, PacketType, AUTH_REQUEST_ID, TERMINATOR_ID};
pub use codec::{
    decode, decode_size, encode, encode_command, write_command, HEADER_SIZE, MAX_BODY_SIZE,
    SIZE_PREFIX_LEN, TERMINATOR_SIZE,
};
pub use classify::{
    classify, split_lines, ClassifiedResponse, COMMAND_COMPLETE_LEN, EMPTY_FRAME_LEN,
    TYPE_BYTE_OFFSET,
};
