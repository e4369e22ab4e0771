//! Configuration for squadrcon
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{RconError, Result};

/// Smallest frame the server can legally send: id + type + terminator
const MIN_FRAME_SIZE: usize = 10;

/// Main configuration for a client connection
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------
    /// RCON password sent right after the socket opens
    pub password: String,

    // -------------------------------------------------------------------------
    // Pipeline Configuration
    // -------------------------------------------------------------------------
    /// Max queued commands before `submit` blocks (backpressure)
    pub queue_capacity: usize,

    /// Bounded wait used by the read loop and drain loop between
    /// cancellation checks (milliseconds)
    pub read_poll_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP connect timeout per resolved address (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm
    pub tcp_nodelay: bool,

    /// Largest inbound size prefix accepted before the stream is
    /// considered corrupt (bytes)
    pub max_frame_size: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("password", &"<redacted>")
            .field("queue_capacity", &self.queue_capacity)
            .field("read_poll_interval_ms", &self.read_poll_interval_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .field("tcp_nodelay", &self.tcp_nodelay)
            .field("max_frame_size", &self.max_frame_size)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password: String::new(),
            queue_capacity: 100,
            read_poll_interval_ms: 10,
            connect_timeout_ms: 5000,
            write_timeout_ms: 5000,
            tcp_nodelay: true,
            max_frame_size: 1024 * 1024, // 1 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Poll interval as a Duration
    pub fn read_poll_interval(&self) -> Duration {
        Duration::from_millis(self.read_poll_interval_ms)
    }

    /// Connect timeout, `None` when left to the OS
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }

    /// Write timeout, `None` when writes may block indefinitely
    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// Check that the values can drive a connection
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(RconError::Config("queue_capacity must be at least 1".to_string()));
        }
        if self.read_poll_interval_ms == 0 {
            return Err(RconError::Config(
                "read_poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.max_frame_size < MIN_FRAME_SIZE {
            return Err(RconError::Config(format!(
                "max_frame_size must be at least {} bytes, got {}",
                MIN_FRAME_SIZE, self.max_frame_size
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the RCON password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the command queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the read poll interval (in milliseconds)
    pub fn read_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.read_poll_interval_ms = ms;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.config.tcp_nodelay = nodelay;
        self
    }

    /// Set the largest accepted inbound frame (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
