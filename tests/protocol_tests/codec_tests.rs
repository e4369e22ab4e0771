//! Codec Tests
//!
//! Tests for frame encoding/decoding.

use squadrcon::protocol::{
    decode, decode_size, encode, encode_command, write_command, OutboundCommand, PacketType,
    MAX_BODY_SIZE, SIZE_PREFIX_LEN, TERMINATOR_ID,
};
use squadrcon::RconError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_exact_bytes() {
    let encoded = encode(7, PacketType::ExecCommand.value(), "ListPlayers").unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&21i32.to_le_bytes()); // 4 + 4 + 11 + 2
    expected.extend_from_slice(&7i32.to_le_bytes());
    expected.extend_from_slice(&2i32.to_le_bytes());
    expected.extend_from_slice(b"ListPlayers");
    expected.extend_from_slice(&[0x00, 0x00]);

    assert_eq!(&encoded[..], &expected[..]);
}

#[test]
fn test_encode_empty_body() {
    let encoded = encode(TERMINATOR_ID, PacketType::ExecCommand.value(), "").unwrap();

    assert_eq!(encoded.len(), SIZE_PREFIX_LEN + 10);
    assert_eq!(&encoded[..4], &10i32.to_le_bytes());
    assert_eq!(&encoded[4..8], &99i32.to_le_bytes());
    assert_eq!(&encoded[12..], &[0x00, 0x00]);
}

#[test]
fn test_encode_size_counts_utf8_bytes() {
    let body = "AdminBroadcast Grüße 🎮";
    let encoded = encode(1, PacketType::ExecCommand.value(), body).unwrap();

    let size = i32::from_le_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize;
    assert_eq!(size, 4 + 4 + body.len() + 2);
    assert_eq!(encoded.len(), SIZE_PREFIX_LEN + size);
}

#[test]
fn test_encode_auth_command() {
    let command = OutboundCommand::auth("secret");
    let encoded = encode_command(&command).unwrap();

    assert_eq!(&encoded[4..8], &(-1i32).to_le_bytes());
    assert_eq!(&encoded[8..12], &3i32.to_le_bytes());
    assert_eq!(&encoded[12..18], b"secret");
}

#[test]
fn test_encode_body_at_limit() {
    let body = "a".repeat(MAX_BODY_SIZE);
    assert!(encode(1, PacketType::ExecCommand.value(), &body).is_ok());
}

#[test]
fn test_encode_body_too_large() {
    let body = "a".repeat(MAX_BODY_SIZE + 1);
    let result = encode(1, PacketType::ExecCommand.value(), &body);

    match result {
        Err(RconError::BodyTooLarge { size, max }) => {
            assert_eq!(size, MAX_BODY_SIZE + 1);
            assert_eq!(max, MAX_BODY_SIZE);
        }
        other => panic!("Expected BodyTooLarge, got {:?}", other),
    }
}

#[test]
fn test_wire_len_matches_size_prefix() {
    let command = OutboundCommand::exec(5, "ShowServerInfo");
    let encoded = encode_command(&command).unwrap();

    assert_eq!(command.wire_len(), 24);
    assert_eq!(encoded.len(), SIZE_PREFIX_LEN + command.wire_len());
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_round_trip() {
    for (id, packet_type, body) in [
        (0, 0, ""),
        (99, 2, ""),
        (-1, 3, "hunter2"),
        (42, 2, "AdminKick \"Some Player\" teamkilling"),
        (i32::MAX, 0, "line one\nline two\n"),
        (i32::MIN, 1, "ünïcödé"),
    ] {
        let encoded = encode(id, packet_type, body).unwrap();
        let frame = decode(&encoded[SIZE_PREFIX_LEN..]).unwrap();

        assert_eq!(frame.id, id);
        assert_eq!(frame.packet_type, packet_type);
        assert_eq!(frame.text(), body);
    }
}

#[test]
fn test_decode_incomplete_header() {
    let result = decode(&[0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00]);

    assert!(matches!(result, Err(RconError::MalformedFrame(_))));
    assert!(result.unwrap_err().to_string().contains("Incomplete header"));
}

#[test]
fn test_decode_header_only() {
    let mut body = Vec::new();
    body.extend_from_slice(&3i32.to_le_bytes());
    body.extend_from_slice(&0i32.to_le_bytes());

    let frame = decode(&body).unwrap();
    assert_eq!(frame.id, 3);
    assert_eq!(frame.packet_type, 0);
    assert!(frame.payload.is_empty());
}

#[test]
fn test_decode_invalid_utf8_is_lossy() {
    let mut body = Vec::new();
    body.extend_from_slice(&1i32.to_le_bytes());
    body.extend_from_slice(&0i32.to_le_bytes());
    body.extend_from_slice(&[b'o', b'k', 0xFF]);
    body.extend_from_slice(&[0x00, 0x00]);

    let frame = decode(&body).unwrap();
    assert_eq!(frame.payload.len(), 3);
    assert!(frame.text().starts_with("ok"));
}

// =============================================================================
// Size Prefix Tests
// =============================================================================

#[test]
fn test_decode_size_valid() {
    assert_eq!(decode_size(10i32.to_le_bytes(), 4096).unwrap(), 10);
    assert_eq!(decode_size(0i32.to_le_bytes(), 4096).unwrap(), 0);
    assert_eq!(decode_size(4096i32.to_le_bytes(), 4096).unwrap(), 4096);
}

#[test]
fn test_decode_size_negative() {
    let result = decode_size((-5i32).to_le_bytes(), 4096);
    assert!(matches!(result, Err(RconError::MalformedFrame(_))));
}

#[test]
fn test_decode_size_too_large() {
    let result = decode_size(4097i32.to_le_bytes(), 4096);
    assert!(result.unwrap_err().to_string().contains("Frame too large"));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_command_to_stream() {
    let command = OutboundCommand::exec(12, "ShowCurrentMap");

    let mut buffer = Vec::new();
    write_command(&mut buffer, &command).unwrap();

    assert_eq!(buffer, encode_command(&command).unwrap().to_vec());
}

#[test]
fn test_write_multiple_commands_to_stream() {
    let first = OutboundCommand::exec(1, "ListSquads");
    let terminator = OutboundCommand::terminator();

    let mut buffer = Vec::new();
    write_command(&mut buffer, &first).unwrap();
    write_command(&mut buffer, &terminator).unwrap();

    let first_len = SIZE_PREFIX_LEN + first.wire_len();
    assert_eq!(buffer.len(), first_len + SIZE_PREFIX_LEN + terminator.wire_len());

    let decoded = decode(&buffer[first_len + SIZE_PREFIX_LEN..]).unwrap();
    assert_eq!(decoded.id, TERMINATOR_ID);
    assert!(decoded.payload.is_empty());
}
