//! Network Module
//!
//! TCP session handling for the client.
//!
//! ## Architecture
//! - Reader thread: frames -> classifier -> accumulator -> events
//! - Writer thread: command pipeline -> codec -> socket (under write lock)
//! - Shared shutdown signal, checked every poll interval by both

mod shutdown;
mod pipeline;
mod reader;
mod connection;

pub use shutdown::ShutdownSignal;
pub use pipeline::{pipeline, CommandPipeline, PendingEntry, PipelineDrain};
pub use reader::{FrameReader, ReadLoop};
pub use connection::Connection;
