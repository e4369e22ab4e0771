//! Error types for squadrcon
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

/// Result type alias using RconError
pub type Result<T> = std::result::Result<T, RconError>;

/// Unified error type for squadrcon operations
#[derive(Debug, Error)]
pub enum RconError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Command body too large: {size} bytes (max {max})")]
    BodyTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid connection state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RconError {
    /// True for errors that only signal a shutdown in progress
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RconError::Cancelled)
    }
}
