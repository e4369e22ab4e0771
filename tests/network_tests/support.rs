//! Shared helpers: a scripted reader and an in-process fake server

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use squadrcon::protocol::{decode, encode, Frame, SIZE_PREFIX_LEN};

pub const POLL: Duration = Duration::from_millis(10);

// =============================================================================
// Scripted Reader
// =============================================================================

/// One step of a scripted read
pub enum Step {
    /// Bytes handed out by the next read call(s)
    Data(Vec<u8>),
    /// Stream closed by the peer
    Eof,
    /// Hard I/O failure
    Fail(io::ErrorKind),
}

/// A `Read` that replays a script and behaves like a socket with a read
/// timeout when the script runs dry
#[derive(Clone)]
pub struct ScriptedReader {
    steps: Arc<Mutex<VecDeque<Step>>>,
    /// Largest chunk returned by one read call, to force short reads
    chunk: usize,
}

impl ScriptedReader {
    pub fn new(chunk: usize) -> Self {
        Self {
            steps: Arc::new(Mutex::new(VecDeque::new())),
            chunk,
        }
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().push_back(step);
    }

    pub fn push_frame(&self, id: i32, packet_type: i32, body: &str) {
        self.push(Step::Data(encode(id, packet_type, body).unwrap().to_vec()));
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut steps = self.steps.lock();
        match steps.pop_front() {
            Some(Step::Data(mut data)) => {
                let n = data.len().min(buf.len()).min(self.chunk);
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    steps.push_front(Step::Data(rest));
                }
                Ok(n)
            }
            Some(Step::Eof) => Ok(0),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            None => {
                drop(steps);
                std::thread::sleep(POLL);
                Err(io::Error::new(io::ErrorKind::WouldBlock, "no data"))
            }
        }
    }
}

// =============================================================================
// Fake Server
// =============================================================================

pub fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Read one frame the client wrote
pub fn read_frame(stream: &mut TcpStream) -> Frame {
    let mut prefix = [0u8; SIZE_PREFIX_LEN];
    stream.read_exact(&mut prefix).unwrap();
    let size = i32::from_le_bytes(prefix) as usize;
    let mut body = vec![0u8; size];
    stream.read_exact(&mut body).unwrap();
    decode(&body).unwrap()
}

/// Send one frame to the client
pub fn send_frame(stream: &mut TcpStream, id: i32, packet_type: i32, body: &str) {
    stream.write_all(&encode(id, packet_type, body).unwrap()).unwrap();
    stream.flush().unwrap();
}

/// Send a frame body padded to exactly `len` bytes (size prefix excluded)
pub fn send_padded(stream: &mut TcpStream, id: i32, packet_type: i32, len: usize) {
    let body = "\0".repeat(len - 10);
    send_frame(stream, id, packet_type, &body);
}

/// Accept one client and answer its authentication request
pub fn accept_and_authenticate(listener: &TcpListener, password: &str) -> TcpStream {
    let (mut stream, _) = listener.accept().unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    let auth = read_frame(&mut stream);
    assert_eq!(auth.packet_type, 3);
    assert_eq!(auth.text(), password);

    send_frame(&mut stream, auth.id, 2, "");
    stream
}
