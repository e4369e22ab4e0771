//! Connection Manager
//!
//! Owns the TCP session with the game server.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::SystemTime;

use parking_lot::Mutex;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::pipeline::{pipeline, CommandPipeline};
use super::reader::{FrameReader, ReadLoop};
use super::ShutdownSignal;
use crate::config::Config;
use crate::error::{RconError, Result};
use crate::events::{EventSink, EventStream};
use crate::session::{ConnectionState, SessionState};

/// A client session with one server
///
/// ## Threads
/// `connect` spawns two workers that run until `disconnect`:
/// - **reader**: sole owner of the read half, the accumulator and the
///   `Authenticated` transition
/// - **writer**: drains the command pipeline; sole user of the write lock
///
/// Both observe the same [`ShutdownSignal`].
pub struct Connection {
    /// Connection configuration
    config: Config,

    /// Lifecycle shared with the reader thread
    state: Arc<SessionState>,

    /// Cancellation for both workers and for blocked submitters
    shutdown: ShutdownSignal,

    /// Publishing side of the event channel
    events: EventSink,

    /// Submission handle, present once connected
    pipeline: Option<CommandPipeline>,

    /// Primary socket, kept to shut it down on disconnect
    stream: Option<TcpStream>,

    /// Reader and writer threads
    workers: Vec<JoinHandle<()>>,

    /// `host:port` as given to `connect`
    peer: Option<String>,

    /// When the socket opened
    connected_on: Option<SystemTime>,
}

impl Connection {
    /// Create a disconnected client and the stream its events arrive on
    pub fn new(config: Config) -> (Self, EventStream) {
        let (events, stream) = EventSink::channel();
        let connection = Self {
            config,
            state: Arc::new(SessionState::new()),
            shutdown: ShutdownSignal::new(),
            events,
            pipeline: None,
            stream: None,
            workers: Vec::new(),
            peer: None,
            connected_on: None,
        };
        (connection, stream)
    }

    /// Open the socket, start both workers and queue authentication
    ///
    /// No retry: a failed connect leaves the connection Closed.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let current = self.state.get();
        if current != ConnectionState::Disconnected {
            return Err(RconError::InvalidState {
                expected: ConnectionState::Disconnected.as_str(),
                actual: current.as_str(),
            });
        }
        self.config.validate()?;

        self.state.advance(ConnectionState::Connecting);
        let addr = format!("{}:{}", host, port);
        tracing::debug!("Connecting to {}", addr);

        let stream = match open_socket(host, port, &self.config) {
            Ok(stream) => stream,
            Err(source) => {
                tracing::error!("Failed to connect to {}: {}", addr, source);
                self.state.close();
                let event_cause = io::Error::new(source.kind(), source.to_string());
                self.events.error(
                    format!("connection error: {}", source),
                    Some(RconError::Connection {
                        addr: addr.clone(),
                        source: event_cause,
                    }),
                );
                return Err(RconError::Connection { addr, source });
            }
        };

        self.state.advance(ConnectionState::Connected);
        self.connected_on = Some(SystemTime::now());
        self.peer = Some(addr.clone());
        tracing::info!("Connected to {}", addr);

        if let Err(e) = self.start_workers(stream) {
            tracing::error!("Failed to start connection workers: {}", e);
            self.events.error(format!("connection error: {}", e), None);
            self.teardown();
            return Err(e);
        }

        let password = self.config.password.clone();
        self.authenticate(&password)
    }

    fn start_workers(&mut self, stream: TcpStream) -> Result<()> {
        let read_stream = stream.try_clone()?;
        read_stream.set_read_timeout(Some(self.config.read_poll_interval()))?;

        let write_stream = stream.try_clone()?;
        write_stream.set_write_timeout(self.config.write_timeout())?;

        self.stream = Some(stream);

        let (producer, drain) = pipeline(
            self.config.queue_capacity,
            self.config.read_poll_interval(),
            self.shutdown.clone(),
        );

        let frames = FrameReader::new(
            BufReader::new(read_stream),
            self.shutdown.clone(),
            self.config.max_frame_size,
        );
        let read_loop = ReadLoop::new(
            frames,
            Arc::clone(&self.state),
            self.shutdown.clone(),
            self.events.clone(),
        );
        let reader = thread::Builder::new()
            .name("rcon-reader".to_string())
            .spawn(move || read_loop.run())?;
        self.workers.push(reader);

        let writer = Arc::new(Mutex::new(BufWriter::new(write_stream)));
        let events = self.events.clone();
        let drainer = thread::Builder::new()
            .name("rcon-writer".to_string())
            .spawn(move || drain.run(writer, events))?;
        self.workers.push(drainer);

        self.pipeline = Some(producer);
        Ok(())
    }

    /// Queue an authentication request
    pub fn authenticate(&self, password: &str) -> Result<()> {
        self.open_pipeline()?.authenticate(password)
    }

    /// Queue a console command; its output arrives as `CommandResponse`
    ///
    /// Blocks while the queue is full.
    pub fn submit(&self, command: impl Into<String>) -> Result<()> {
        self.open_pipeline()?.submit(command)
    }

    /// Cloneable submission handle for other threads
    pub fn pipeline(&self) -> Option<CommandPipeline> {
        self.pipeline.clone()
    }

    fn open_pipeline(&self) -> Result<&CommandPipeline> {
        let current = self.state.get();
        match (&self.pipeline, self.state.is_open()) {
            (Some(pipeline), true) => Ok(pipeline),
            _ => Err(RconError::InvalidState {
                expected: ConnectionState::Connected.as_str(),
                actual: current.as_str(),
            }),
        }
    }

    /// Stop both workers, close the socket and wait for the workers to exit
    pub fn disconnect(&mut self) -> Result<()> {
        let was = self.state.get();
        self.teardown();
        if was != ConnectionState::Closed {
            tracing::info!("Disconnected");
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.shutdown.trigger();
        self.pipeline = None;

        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                tracing::debug!("Socket shutdown: {}", e);
            }
        }

        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("worker").to_string();
            if worker.join().is_err() {
                tracing::warn!("{} thread panicked", name);
            }
        }

        self.state.close();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// True once the server accepted the password, also after `Closed`
    pub fn is_authorized(&self) -> bool {
        self.state.is_authorized()
    }

    /// When the socket opened
    pub fn connected_on(&self) -> Option<SystemTime> {
        self.connected_on
    }

    /// `host:port` of the server
    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.stream.is_some() || !self.workers.is_empty() {
            self.teardown();
        }
    }
}

/// Try every resolved address in turn
fn open_socket(host: &str, port: u16, config: &Config) -> io::Result<TcpStream> {
    let mut last_err = None;

    for addr in (host, port).to_socket_addrs()? {
        match connect_addr(addr, config) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "host resolved to no addresses")
    }))
}

fn connect_addr(addr: SocketAddr, config: &Config) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_keepalive(true)?;
    socket.set_nodelay(config.tcp_nodelay)?;

    let target = SockAddr::from(addr);
    match config.connect_timeout() {
        Some(timeout) => socket.connect_timeout(&target, timeout)?,
        None => socket.connect(&target)?,
    }

    Ok(socket.into())
}
