//! Tests for SessionState
//!
//! These tests verify:
//! - Forward-only transitions
//! - Closed is reachable from every state and final

use squadrcon::session::{ConnectionState, SessionState};

#[test]
fn test_starts_disconnected() {
    let state = SessionState::new();
    assert_eq!(state.get(), ConnectionState::Disconnected);
    assert!(!state.is_open());
    assert!(!state.is_authenticated());
    assert!(!state.is_authorized());
}

#[test]
fn test_full_lifecycle() {
    let state = SessionState::new();

    assert!(state.advance(ConnectionState::Connecting));
    assert!(state.advance(ConnectionState::Connected));
    assert!(state.is_open());
    assert!(state.advance(ConnectionState::Authenticated));
    assert!(state.is_authenticated());
    assert!(state.is_open());
    assert!(state.close());

    assert_eq!(state.get(), ConnectionState::Closed);
    assert!(!state.is_open());
}

#[test]
fn test_no_backward_transitions() {
    let state = SessionState::new();
    state.advance(ConnectionState::Connecting);
    state.advance(ConnectionState::Connected);

    assert!(!state.advance(ConnectionState::Connecting));
    assert!(!state.advance(ConnectionState::Connected));
    assert_eq!(state.get(), ConnectionState::Connected);
}

#[test]
fn test_close_from_any_state() {
    for target in [
        ConnectionState::Disconnected,
        ConnectionState::Connecting,
        ConnectionState::Connected,
        ConnectionState::Authenticated,
    ] {
        let state = SessionState::new();
        state.advance(target);
        assert!(state.close(), "close from {}", target);
        assert_eq!(state.get(), ConnectionState::Closed);
    }
}

#[test]
fn test_closed_is_terminal() {
    let state = SessionState::new();
    state.close();

    assert!(!state.close());
    assert!(!state.advance(ConnectionState::Connected));
    assert!(!state.advance(ConnectionState::Authenticated));
    assert_eq!(state.get(), ConnectionState::Closed);
}

#[test]
fn test_display() {
    assert_eq!(ConnectionState::Authenticated.to_string(), "authenticated");
    assert_eq!(ConnectionState::Closed.as_str(), "closed");
}

#[test]
fn test_authorized_flag_survives_close() {
    let state = SessionState::new();
    state.advance(ConnectionState::Connecting);
    state.advance(ConnectionState::Connected);

    assert!(state.mark_authorized());
    assert!(state.is_authorized());
    assert!(state.is_authenticated());

    state.close();
    assert!(state.is_authorized());
    assert!(!state.is_authenticated());

    // A late AuthSuccess cannot reopen the session
    assert!(!state.mark_authorized());
    assert_eq!(state.get(), ConnectionState::Closed);
}
