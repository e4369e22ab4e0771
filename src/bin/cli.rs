//! squadrcon CLI
//!
//! Interactive console for a Squad server over RCON.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam::channel::{self, RecvTimeoutError};
use crossbeam::select;
use parking_lot::Mutex;
use squadrcon::{CommandPipeline, Config, Connection, ConnectionState, Event, EventStream};
use tracing_subscriber::{fmt, EnvFilter};

/// squadrcon CLI
#[derive(Parser, Debug)]
#[command(name = "squadrcon-cli")]
#[command(about = "Interactive RCON console for Squad servers")]
#[command(version)]
struct Args {
    /// Server host name or IP
    #[arg(short = 'H', long)]
    host: String,

    /// RCON port
    #[arg(short, long, default_value = "21114")]
    port: u16,

    /// RCON password (prompted for when omitted)
    #[arg(short = 'P', long)]
    password: Option<String>,

    /// Seconds between keepalive commands (0 disables)
    #[arg(short, long, default_value = "30")]
    keepalive_secs: u64,

    /// How long to wait for the server to accept the password
    #[arg(long, default_value = "1000")]
    auth_wait_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,squadrcon=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let password = match args.password.clone() {
        Some(password) => password,
        None => match prompt("Password: ") {
            Ok(password) => password,
            Err(e) => {
                tracing::error!("Failed to read password: {}", e);
                std::process::exit(1);
            }
        },
    };

    let config = match Config::builder().password(password).build() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let (mut connection, events) = Connection::new(config);
    if let Err(e) = connection.connect(&args.host, args.port) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    if !wait_for_auth(&events, Duration::from_millis(args.auth_wait_ms)) {
        eprintln!("Authentication failed. Exiting...");
        let _ = connection.disconnect();
        std::process::exit(1);
    }

    tracing::info!("squadrcon v{} connected to {}:{}", squadrcon::VERSION, args.host, args.port);

    let pipeline = match connection.pipeline() {
        Some(pipeline) => pipeline,
        None => {
            tracing::error!("Connection closed during authentication");
            std::process::exit(1);
        }
    };

    // Responses to keepalive commands are not shown
    let submissions = Arc::new(SubmissionLog::default());

    let printer = {
        let submissions = Arc::clone(&submissions);
        thread::spawn(move || print_events(events, &submissions))
    };

    let (stop_keepalive, keepalive_stopped) = channel::bounded::<()>(0);
    let keepalive = (args.keepalive_secs > 0).then(|| {
        let interval = Duration::from_secs(args.keepalive_secs);
        let pipeline = pipeline.clone();
        let submissions = Arc::clone(&submissions);
        thread::spawn(move || run_keepalive(pipeline, interval, &submissions, keepalive_stopped))
    });

    run_shell(&connection, &submissions);

    drop(stop_keepalive);
    if let Some(handle) = keepalive {
        let _ = handle.join();
    }

    if let Err(e) = connection.disconnect() {
        tracing::warn!("Disconnect error: {}", e);
    }
    drop(pipeline);
    drop(connection);
    let _ = printer.join();
}

/// Read commands until `exit` or end of input
fn run_shell(connection: &Connection, submissions: &SubmissionLog) {
    let stdin = io::stdin();
    print_prompt();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read input: {}", e);
                break;
            }
        };
        let command = line.trim();

        if command.eq_ignore_ascii_case("exit") {
            break;
        }

        if !command.is_empty() {
            if let Err(e) = submissions.record(Submission::User, || connection.submit(command)) {
                eprintln!("Error: {}", e);
                if connection.state() == ConnectionState::Closed {
                    break;
                }
            }
        }

        print_prompt();
    }
}

/// Submit an empty command on every tick until stopped
fn run_keepalive(
    pipeline: CommandPipeline,
    interval: Duration,
    submissions: &SubmissionLog,
    stop: channel::Receiver<()>,
) {
    let ticker = channel::tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                if let Err(e) = submissions.record(Submission::Keepalive, || pipeline.submit("")) {
                    tracing::debug!("Keepalive not sent: {}", e);
                    break;
                }
            }
            recv(stop) -> _ => break,
        }
    }
}

/// Who submitted a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submission {
    User,
    Keepalive,
}

/// Submissions awaiting a response, oldest first
///
/// The server answers commands in submission order, so each
/// `CommandResponse` belongs to the oldest entry.
#[derive(Debug, Default)]
struct SubmissionLog {
    pending: Mutex<VecDeque<Submission>>,
}

impl SubmissionLog {
    /// Run `submit` and record its kind under one lock, so the log order
    /// matches the queue order
    fn record<F>(&self, kind: Submission, submit: F) -> squadrcon::Result<()>
    where
        F: FnOnce() -> squadrcon::Result<()>,
    {
        let mut pending = self.pending.lock();
        pending.push_back(kind);
        let result = submit();
        if result.is_err() {
            pending.pop_back();
        }
        result
    }

    /// Match a response to its submission; true if it should be shown
    fn should_print(&self, response: &str) -> bool {
        let kind = self.pending.lock().pop_front();
        kind != Some(Submission::Keepalive) && !response.trim().is_empty()
    }
}

/// Wait for the authentication result, printing anything that arrives first
fn wait_for_auth(events: &EventStream, wait: Duration) -> bool {
    let deadline = Instant::now() + wait;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(remaining) {
            Ok(Event::AuthenticationResult { success }) => return success,
            Ok(Event::Error { message, .. }) => eprintln!("Error: {}", message),
            Ok(Event::ChatMessage(message)) => println!("[CHAT] {}", message),
            Ok(Event::CommandResponse(_)) => {}
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return false,
        }
    }
}

fn print_events(events: EventStream, submissions: &SubmissionLog) {
    for event in events.iter() {
        match event {
            Event::ChatMessage(message) => println!("[CHAT] {}", message),
            Event::CommandResponse(response) => {
                if submissions.should_print(&response) {
                    println!("{}", response);
                }
            }
            Event::Error { message, .. } => eprintln!("Error: {}", message),
            Event::AuthenticationResult { .. } => {}
        }
    }
}

fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
