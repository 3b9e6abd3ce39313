use std::{
    collections::HashMap,
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use native_protocol::{command::Command, errors::NativeError, frame::Frame, Serializable};

type Hashes = Arc<Mutex<HashMap<String, HashMap<String, String>>>>;

#[derive(Debug)]
pub enum RequestError {
    InvalidFrame(NativeError),
    InvalidCommand(NativeError),
}

/// Decodes the first complete request in `bytes`, returning it together with
/// the number of bytes it used, or `None` if more bytes are needed.
pub fn handle_client_request(bytes: &[u8]) -> Result<Option<(Command, usize)>, RequestError> {
    let Some((frame, used)) = Frame::parse(bytes).map_err(RequestError::InvalidFrame)? else {
        return Ok(None);
    };
    let command = Command::from_frame(frame).map_err(RequestError::InvalidCommand)?;
    Ok(Some((command, used)))
}

/// Applies a command to the in-memory hashes and builds the reply.
pub fn apply(command: Command, hashes: &mut HashMap<String, HashMap<String, String>>) -> Frame {
    match command {
        Command::Ping => Frame::Simple("PONG".to_string()),
        Command::HGet { key, field } => Frame::Bulk(
            hashes
                .get(&key)
                .and_then(|hash| hash.get(&field))
                .map(|value| value.as_bytes().to_vec()),
        ),
        Command::HSet { key, field, value } => {
            let previous = hashes.entry(key).or_default().insert(field, value);
            Frame::Integer(if previous.is_none() { 1 } else { 0 })
        }
        Command::HGetAll { key } => {
            let items: Vec<Frame> = hashes
                .get(&key)
                .map(|hash| {
                    hash.iter()
                        .flat_map(|(field, value)| [Frame::bulk(field), Frame::bulk(value)])
                        .collect()
                })
                .unwrap_or_default();
            Frame::Array(Some(items))
        }
    }
}

/// A small key-value server keeping its hashes in memory. It understands the
/// commands in `native_protocol::command` and is used to exercise the client
/// without an external server.
pub struct MemoryServer {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
}

impl MemoryServer {
    /// Binds a loopback port and serves every connection on its own thread.
    pub fn spawn() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let running = Arc::new(AtomicBool::new(true));
        let hashes: Hashes = Arc::new(Mutex::new(HashMap::new()));

        let accept_running = Arc::clone(&running);
        thread::Builder::new()
            .name("memory-server".to_string())
            .spawn(move || {
                while accept_running.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            let hashes = Arc::clone(&hashes);
                            thread::spawn(move || serve(stream, hashes));
                        }
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(10));
                        }
                        Err(_) => break,
                    }
                }
            })?;

        Ok(Self { addr, running })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MemoryServer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn serve(mut stream: TcpStream, hashes: Hashes) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        match handle_client_request(&buffer) {
            Ok(Some((command, used))) => {
                buffer.drain(..used);
                let reply = match hashes.lock() {
                    Ok(mut hashes) => apply(command, &mut hashes),
                    Err(_) => Frame::Error("ERR storage poisoned".to_string()),
                };
                let Ok(bytes) = reply.to_bytes() else {
                    return;
                };
                if stream.write_all(&bytes).is_err() {
                    return;
                }
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                let reply = Frame::Error(format!("ERR {:?}", e).replace(['\r', '\n'], " "));
                if let Ok(bytes) = reply.to_bytes() {
                    let _ = stream.write_all(&bytes);
                }
                return;
            }
        }

        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_needs_complete_frame() {
        let result = handle_client_request(b"*1\r\n$4\r\nPI").unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn request_is_decoded_with_used_bytes() {
        let bytes = Command::Ping.to_bytes().unwrap();
        let (command, used) = handle_client_request(&bytes).unwrap().unwrap();

        assert_eq!(command, Command::Ping);
        assert_eq!(used, bytes.len());
    }

    #[test]
    fn unknown_command_is_rejected() {
        let bytes = Frame::Array(Some(vec![Frame::bulk("FLUSHALL")]))
            .to_bytes()
            .unwrap();

        assert!(matches!(
            handle_client_request(&bytes),
            Err(RequestError::InvalidCommand(_))
        ));
    }

    #[test]
    fn apply_hset_reports_new_fields() {
        let mut hashes = HashMap::new();
        let set = |value: &str| Command::HSet {
            key: "routes".to_string(),
            field: "FV777".to_string(),
            value: value.to_string(),
        };

        assert_eq!(apply(set("a"), &mut hashes), Frame::Integer(1));
        assert_eq!(apply(set("b"), &mut hashes), Frame::Integer(0));
        assert_eq!(hashes["routes"]["FV777"], "b");
    }

    #[test]
    fn apply_hget_missing_is_null() {
        let mut hashes = HashMap::new();
        let get = Command::HGet {
            key: "routes".to_string(),
            field: "X".to_string(),
        };

        assert_eq!(apply(get, &mut hashes), Frame::Bulk(None));
    }
}
