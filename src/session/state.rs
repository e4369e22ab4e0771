//! Connection state
//!
//! Lifecycle states and the shared, monotonic state holder.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

/// Lifecycle of one connection
///
/// States only move forward; `Closed` is reachable from anywhere and final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Authenticated,
    Closed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Authenticated => "authenticated",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared between the connection handle and its loops
///
/// ## Concurrency:
/// - `state`: RwLock, written by `connect`/`disconnect` and the read loop
/// - `authorized`: AtomicBool, written only by the read loop's accumulator
/// - Reads never block on I/O
#[derive(Debug)]
pub struct SessionState {
    state: RwLock<ConnectionState>,

    /// Set on the first AuthSuccess; survives `Closed`
    authorized: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Disconnected),
            authorized: AtomicBool::new(false),
        }
    }

    /// Current state
    pub fn get(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Move to `next` if that is a forward step
    ///
    /// Returns false (and leaves the state alone) for backward or repeated
    /// transitions and for anything after `Closed`.
    pub fn advance(&self, next: ConnectionState) -> bool {
        let mut state = self.state.write();
        if *state == ConnectionState::Closed || next <= *state {
            return false;
        }
        tracing::debug!("Connection state {} -> {}", *state, next);
        *state = next;
        true
    }

    /// Move to `Closed`; returns false if already closed
    pub fn close(&self) -> bool {
        self.advance(ConnectionState::Closed)
    }

    /// Record an accepted password and move to `Authenticated`
    ///
    /// Returns true if the state advanced.
    pub fn mark_authorized(&self) -> bool {
        self.authorized.store(true, Ordering::SeqCst);
        self.advance(ConnectionState::Authenticated)
    }

    /// True once the server has accepted the password, even after `Closed`
    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    /// True while the session is live and authenticated
    pub fn is_authenticated(&self) -> bool {
        self.get() == ConnectionState::Authenticated
    }

    /// True while the loops should keep running
    pub fn is_open(&self) -> bool {
        matches!(
            self.get(),
            ConnectionState::Connected | ConnectionState::Authenticated
        )
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
