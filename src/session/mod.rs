//! Session Module
//!
//! Per-connection state that lives for the duration of one TCP session.
//!
//! ## Components
//! - `SessionState`: monotonic lifecycle shared by the handle and its loops
//! - `ReassemblyAccumulator`: merges fragments into complete responses
//!   (single writer: the read loop)

mod state;
mod accumulator;

pub use state::{ConnectionState, SessionState};
pub use accumulator::ReassemblyAccumulator;
