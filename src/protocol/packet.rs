//! Packet definitions
//!
//! Outbound commands and decoded inbound frames.

use std::borrow::Cow;

use bytes::Bytes;

/// Packet type values carried in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PacketType {
    /// SERVERDATA_RESPONSE_VALUE (server -> client)
    Response = 0x00,

    /// Chat broadcast (server -> client)
    Chat = 0x01,

    /// SERVERDATA_EXECCOMMAND (client -> server)
    ///
    /// Shares its value with the auth-response discriminant.
    ExecCommand = 0x02,

    /// SERVERDATA_AUTH (client -> server)
    Auth = 0x03,
}

impl PacketType {
    /// Auth-response discriminant (server -> client), same value as ExecCommand
    pub const AUTH_RESPONSE: i32 = 0x02;

    /// Raw wire value
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// Id of the empty command appended after every submitted command
pub const TERMINATOR_ID: i32 = 99;

/// Id used for the authentication request
pub const AUTH_REQUEST_ID: i32 = -1;

/// A command queued for the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    /// Request id echoed back by the server
    pub id: i32,

    /// Packet type (Auth or ExecCommand)
    pub kind: PacketType,

    /// UTF-8 command text, may be empty
    pub body: String,
}

impl OutboundCommand {
    /// Create a console command
    pub fn exec(id: i32, body: impl Into<String>) -> Self {
        Self {
            id,
            kind: PacketType::ExecCommand,
            body: body.into(),
        }
    }

    /// Create an authentication request
    pub fn auth(password: impl Into<String>) -> Self {
        Self {
            id: AUTH_REQUEST_ID,
            kind: PacketType::Auth,
            body: password.into(),
        }
    }

    /// Create the zero-body terminator
    pub fn terminator() -> Self {
        Self::exec(TERMINATOR_ID, "")
    }

    /// Value of the size prefix: id + type + body + two terminator bytes
    pub fn wire_len(&self) -> usize {
        4 + 4 + self.body.len() + 2
    }
}

/// A decoded inbound frame (size prefix already consumed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Request id
    pub id: i32,

    /// Raw packet type
    pub packet_type: i32,

    /// Payload with the trailing terminator removed
    pub payload: Bytes,
}

impl Frame {
    /// Payload decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
