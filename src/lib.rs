//! # squadrcon
//!
//! RCON client for Squad game servers with:
//! - Little-endian, length-prefixed packet codec
//! - Shape-based response classification (auth, chat, fragment, completion)
//! - Response reassembly driven by an auto-appended terminator command
//! - Ordered, bounded command pipeline with backpressure
//! - Reader/writer worker threads with cooperative shutdown
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Caller (shell, keepalive timer)               │
//! └───────────┬─────────────────────────────────▲───────────────┘
//!             │ submit                          │ Event stream
//! ┌───────────▼───────────┐         ┌───────────┴───────────────┐
//! │    CommandPipeline    │         │  ReassemblyAccumulator    │
//! │  (bounded, FIFO)      │         │  (single writer)          │
//! └───────────┬───────────┘         └───────────▲───────────────┘
//!             │ writer thread                   │ classify
//! ┌───────────▼─────────────────────────────────┴───────────────┐
//! │                 TCP socket (Connection)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod events;

pub mod protocol;
pub mod session;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RconError, Result};
pub use config::Config;
pub use events::{Event, EventSink, EventStream};
pub use network::{CommandPipeline, Connection};
pub use session::ConnectionState;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of squadrcon
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
