//! Command pipeline
//!
//! Bounded FIFO of outbound commands with a single consumer (the drain loop).
//!
//! ## Ordering
//! Every console command is queued together with its empty terminator as one
//! [`PendingEntry`], so concurrent producers can never slip a frame between a
//! command and its terminator. The drain loop writes the command, flushes,
//! then writes and flushes the terminator.

use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use parking_lot::Mutex;

use super::ShutdownSignal;
use crate::error::{RconError, Result};
use crate::events::EventSink;
use crate::protocol::{write_command, OutboundCommand, MAX_BODY_SIZE};

/// One queue slot: a command and, for console commands, its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub command: OutboundCommand,
    pub terminator: Option<OutboundCommand>,
}

impl PendingEntry {
    /// Command followed by the empty terminator
    pub fn terminated(command: OutboundCommand) -> Self {
        Self {
            command,
            terminator: Some(OutboundCommand::terminator()),
        }
    }

    /// Command written on its own (authentication)
    pub fn single(command: OutboundCommand) -> Self {
        Self {
            command,
            terminator: None,
        }
    }

    /// Frames in write order
    pub fn frames(&self) -> impl Iterator<Item = &OutboundCommand> {
        std::iter::once(&self.command).chain(self.terminator.as_ref())
    }
}

/// Create a pipeline and its consumer
pub fn pipeline(
    capacity: usize,
    poll_interval: Duration,
    shutdown: ShutdownSignal,
) -> (CommandPipeline, PipelineDrain) {
    let (sender, receiver) = channel::bounded(capacity);

    let producer = CommandPipeline {
        sender,
        shutdown: shutdown.clone(),
        poll_interval,
        next_id: Arc::new(AtomicU32::new(0)),
    };
    let consumer = PipelineDrain {
        receiver,
        shutdown,
        poll_interval,
    };
    (producer, consumer)
}

// =============================================================================
// Producer side
// =============================================================================

/// Submission handle; clone freely to submit from several threads
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    sender: Sender<PendingEntry>,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
    next_id: Arc<AtomicU32>,
}

impl CommandPipeline {
    /// Queue a console command plus its terminator
    ///
    /// Blocks while the queue is full. Returns `Cancelled` if shutdown is
    /// signalled first.
    pub fn submit(&self, body: impl Into<String>) -> Result<()> {
        let command = OutboundCommand::exec(self.next_id(), body);
        self.submit_command(command)
    }

    /// Queue a prepared command plus its terminator
    pub fn submit_command(&self, command: OutboundCommand) -> Result<()> {
        check_body(&command)?;
        tracing::debug!("Queueing command id={} ({} bytes)", command.id, command.body.len());
        self.enqueue(PendingEntry::terminated(command))
    }

    /// Queue the authentication request (no terminator)
    pub fn authenticate(&self, password: &str) -> Result<()> {
        let command = OutboundCommand::auth(password);
        check_body(&command)?;
        tracing::debug!("Queueing authentication request");
        self.enqueue(PendingEntry::single(command))
    }

    /// Entries waiting to be written
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(usize::MAX)
    }

    fn enqueue(&self, mut entry: PendingEntry) -> Result<()> {
        loop {
            if self.shutdown.is_triggered() {
                return Err(RconError::Cancelled);
            }
            match self.sender.send_timeout(entry, self.poll_interval) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(returned)) => entry = returned,
                Err(SendTimeoutError::Disconnected(_)) => return Err(RconError::Cancelled),
            }
        }
    }

    /// Ids run 1..=i32::MAX and wrap; they are informational only
    fn next_id(&self) -> i32 {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        (n % i32::MAX as u32) as i32 + 1
    }
}

fn check_body(command: &OutboundCommand) -> Result<()> {
    if command.body.len() > MAX_BODY_SIZE {
        return Err(RconError::BodyTooLarge {
            size: command.body.len(),
            max: MAX_BODY_SIZE,
        });
    }
    Ok(())
}

// =============================================================================
// Consumer side
// =============================================================================

/// The single consumer of the queue
pub struct PipelineDrain {
    receiver: Receiver<PendingEntry>,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
}

impl PipelineDrain {
    /// Wait for the next entry
    ///
    /// Wakes every poll interval to check for shutdown.
    pub fn next_entry(&self) -> Result<PendingEntry> {
        loop {
            if self.shutdown.is_triggered() {
                return Err(RconError::Cancelled);
            }
            match self.receiver.recv_timeout(self.poll_interval) {
                Ok(entry) => return Ok(entry),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(RconError::Cancelled),
            }
        }
    }

    /// Write every frame of an entry, one locked write + flush per frame
    pub fn write_entry<W: Write>(&self, writer: &Mutex<W>, entry: &PendingEntry) -> Result<()> {
        for command in entry.frames() {
            let mut guard = writer.lock();
            write_command(&mut *guard, command)?;
            tracing::trace!(
                "Wrote frame id={} type={} size={}",
                command.id,
                command.kind.value(),
                command.wire_len()
            );
        }
        Ok(())
    }

    /// Drain loop: runs until shutdown or a write failure
    pub fn run<W: Write>(self, writer: Arc<Mutex<W>>, events: EventSink) {
        tracing::debug!("Drain loop started");

        loop {
            let entry = match self.next_entry() {
                Ok(entry) => entry,
                Err(_) => break,
            };

            match self.write_entry(&writer, &entry) {
                Ok(()) => {}
                // Socket shut down under an in-flight write
                Err(_) if self.shutdown.is_triggered() => break,
                Err(e) => {
                    tracing::error!("Command queue processing error: {}", e);
                    events.error(format!("command queue processing error: {}", e), Some(e));
                    break;
                }
            }
        }

        tracing::debug!("Drain loop stopped");
    }
}
