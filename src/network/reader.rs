//! Frame reader and read loop
//!
//! The underlying stream is expected to have a short read timeout (the poll
//! interval). A timeout with nothing read means "no data yet"; a timeout in
//! the middle of a frame just means "keep reading", after checking for
//! shutdown.

use std::io::{self, Read};
use std::sync::Arc;

use bytes::Bytes;

use super::ShutdownSignal;
use crate::error::{RconError, Result};
use crate::events::EventSink;
use crate::protocol::{classify, decode, decode_size, SIZE_PREFIX_LEN};
use crate::session::{ReassemblyAccumulator, SessionState};

/// Reads length-prefixed frames, tolerating short reads
pub struct FrameReader<R> {
    reader: R,
    shutdown: ShutdownSignal,
    max_frame_size: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R, shutdown: ShutdownSignal, max_frame_size: usize) -> Self {
        Self {
            reader,
            shutdown,
            max_frame_size,
        }
    }

    /// Read the next frame body, or `None` if no data arrived within one
    /// poll interval
    pub fn poll_frame(&mut self) -> Result<Option<Bytes>> {
        let mut prefix = [0u8; SIZE_PREFIX_LEN];
        if !self.read_full(&mut prefix, true)? {
            return Ok(None);
        }

        let size = decode_size(prefix, self.max_frame_size)?;

        let mut body = vec![0u8; size];
        self.read_full(&mut body, false)?;
        Ok(Some(Bytes::from(body)))
    }

    /// Fill `buf` completely
    ///
    /// Returns `Ok(false)` only when `idle_ok` is set and the wait expired
    /// before the first byte.
    fn read_full(&mut self, buf: &mut [u8], idle_ok: bool) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(RconError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by server",
                    )))
                }
                Ok(n) => filled += n,
                Err(e) if is_timeout(&e) => {
                    if idle_ok && filled == 0 {
                        return Ok(false);
                    }
                    if self.shutdown.is_triggered() {
                        return Err(RconError::Cancelled);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }
}

/// Read timeouts surface as WouldBlock on Unix and TimedOut on Windows
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// The read loop: frames in, events out
pub struct ReadLoop<R> {
    frames: FrameReader<R>,
    accumulator: ReassemblyAccumulator,
    state: Arc<SessionState>,
    shutdown: ShutdownSignal,
    events: EventSink,
}

impl<R: Read> ReadLoop<R> {
    pub fn new(
        frames: FrameReader<R>,
        state: Arc<SessionState>,
        shutdown: ShutdownSignal,
        events: EventSink,
    ) -> Self {
        Self {
            frames,
            accumulator: ReassemblyAccumulator::new(Arc::clone(&state), events.clone()),
            state,
            shutdown,
            events,
        }
    }

    /// Run until shutdown, connection close or a fatal read error
    pub fn run(mut self) {
        tracing::debug!("Read loop started");

        while !self.shutdown.is_triggered() && self.state.is_open() {
            match self.frames.poll_frame() {
                Ok(Some(body)) => self.route(&body),
                Ok(None) => continue,
                Err(RconError::Cancelled) => break,
                Err(_) if self.shutdown.is_triggered() => break,
                Err(e) => {
                    tracing::error!("Receive data error: {}", e);
                    self.state.close();
                    self.events.error(format!("receive data error: {}", e), Some(e));
                    break;
                }
            }
        }

        tracing::debug!("Read loop stopped");
    }

    fn route(&mut self, body: &[u8]) {
        let response = classify(body);

        match decode(body) {
            Ok(frame) => tracing::trace!(
                "Read frame id={} type={} size={} as {}",
                frame.id,
                frame.packet_type,
                body.len(),
                response.kind()
            ),
            Err(e) => tracing::trace!("Read undecodable frame size={}: {}", body.len(), e),
        }

        self.accumulator.feed(response);
    }
}
