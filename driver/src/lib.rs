use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};
pub mod server;

use native_protocol::{command::Command, errors::NativeError, frame::Frame, Serializable};
use thiserror::Error;

const IO_TIMEOUT: Duration = Duration::from_secs(3);
const READ_CHUNK: usize = 4096;

/// Blocking client for the key-value server that stores the flight routes.
pub struct RedisClient {
    stream: TcpStream,
    buffer: Vec<u8>,
    addr: SocketAddr,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to {0}")]
    ConnectionError(String),
    #[error("invalid address: {0}")]
    AddrError(String),
    #[error("the server did not answer in time")]
    TimeoutError,
    #[error("I/O error: {0}")]
    IOError(io::Error),
    #[error("the server closed the connection")]
    ConnectionClosed,
    #[error("could not encode request: {0}")]
    SerializationError(NativeError),
    #[error("could not decode reply: {0}")]
    DeserializationError(NativeError),
    #[error("server error: {0}")]
    ServerError(String),
    #[error("unexpected reply to {command}: {reply:?}")]
    UnexpectedReply { command: &'static str, reply: Frame },
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => ClientError::TimeoutError,
            _ => ClientError::IOError(err),
        }
    }
}

impl RedisClient {
    /// Creates a connection with the server at `addr`.
    pub fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect_timeout(&addr, IO_TIMEOUT)
            .map_err(|e| ClientError::ConnectionError(format!("{}: {}", addr, e)))?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;

        Ok(Self {
            stream,
            buffer: Vec::new(),
            addr,
        })
    }

    /// Resolves `host:port` and connects to the first address it yields.
    pub fn connect_to(host: &str, port: u16) -> Result<Self, ClientError> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| ClientError::AddrError(format!("{}:{}: {}", host, port, e)))?
            .next()
            .ok_or_else(|| ClientError::AddrError(format!("{}:{}", host, port)))?;
        Self::connect(addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends a command and waits for its reply. Error replies are turned
    /// into `ClientError::ServerError`.
    pub fn execute(&mut self, command: &Command) -> Result<Frame, ClientError> {
        let bytes = command
            .to_bytes()
            .map_err(ClientError::SerializationError)?;
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;

        match self.read_frame()? {
            Frame::Error(message) => Err(ClientError::ServerError(message)),
            reply => Ok(reply),
        }
    }

    pub fn ping(&mut self) -> Result<(), ClientError> {
        match self.execute(&Command::Ping)? {
            Frame::Simple(pong) if pong == "PONG" => Ok(()),
            reply => Err(ClientError::UnexpectedReply {
                command: "PING",
                reply,
            }),
        }
    }

    /// Reads one field of a hash, `None` when the field does not exist.
    pub fn hget(&mut self, key: &str, field: &str) -> Result<Option<String>, ClientError> {
        let command = Command::HGet {
            key: key.to_string(),
            field: field.to_string(),
        };
        match self.execute(&command)? {
            Frame::Bulk(None) => Ok(None),
            reply @ Frame::Bulk(Some(_)) => match reply.as_text() {
                Some(text) => Ok(Some(text)),
                None => Err(ClientError::UnexpectedReply {
                    command: "HGET",
                    reply,
                }),
            },
            reply => Err(ClientError::UnexpectedReply {
                command: "HGET",
                reply,
            }),
        }
    }

    /// Writes one field of a hash. Returns `true` if the field is new.
    pub fn hset(&mut self, key: &str, field: &str, value: &str) -> Result<bool, ClientError> {
        let command = Command::HSet {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        };
        match self.execute(&command)? {
            Frame::Integer(added) => Ok(added > 0),
            reply => Err(ClientError::UnexpectedReply {
                command: "HSET",
                reply,
            }),
        }
    }

    /// Reads every field of a hash as `(field, value)` pairs in server order.
    pub fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, ClientError> {
        let command = Command::HGetAll {
            key: key.to_string(),
        };
        let items = match self.execute(&command)? {
            Frame::Array(Some(items)) if items.len() % 2 == 0 => items,
            reply => {
                return Err(ClientError::UnexpectedReply {
                    command: "HGETALL",
                    reply,
                })
            }
        };

        let mut pairs = Vec::with_capacity(items.len() / 2);
        for pair in items.chunks(2) {
            match (pair[0].as_text(), pair[1].as_text()) {
                (Some(field), Some(value)) => pairs.push((field, value)),
                _ => {
                    return Err(ClientError::UnexpectedReply {
                        command: "HGETALL",
                        reply: Frame::Array(Some(pair.to_vec())),
                    })
                }
            }
        }
        Ok(pairs)
    }

    fn read_frame(&mut self) -> Result<Frame, ClientError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some((frame, used)) =
                Frame::parse(&self.buffer).map_err(ClientError::DeserializationError)?
            {
                self.buffer.drain(..used);
                return Ok(frame);
            }

            let read = self.stream.read(&mut chunk)?;
            if read == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::MemoryServer;

    fn connected() -> (MemoryServer, RedisClient) {
        let server = MemoryServer::spawn().expect("Failed to start server");
        let client = RedisClient::connect(server.addr()).expect("Failed to connect");
        (server, client)
    }

    #[test]
    fn ping_round_trip() {
        let (_server, mut client) = connected();

        assert!(client.ping().is_ok());
    }

    #[test]
    fn hset_then_hget() {
        let (_server, mut client) = connected();

        assert!(client.hset("routes", "FV777", "{\"a\":1}").unwrap());
        assert!(!client.hset("routes", "FV777", "{\"a\":2}").unwrap());

        assert_eq!(
            client.hget("routes", "FV777").unwrap(),
            Some("{\"a\":2}".to_string())
        );
        assert_eq!(client.hget("routes", "NOPE").unwrap(), None);
    }

    #[test]
    fn hgetall_returns_pairs() {
        let (_server, mut client) = connected();
        client.hset("routes", "A1", "one").unwrap();
        client.hset("routes", "B2", "two").unwrap();

        let mut pairs = client.hgetall("routes").unwrap();
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("A1".to_string(), "one".to_string()),
                ("B2".to_string(), "two".to_string())
            ]
        );
        assert!(client.hgetall("empty").unwrap().is_empty());
    }

    #[test]
    fn connect_to_unreachable_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = RedisClient::connect(addr);

        assert!(matches!(result, Err(ClientError::ConnectionError(_))));
    }

    #[test]
    fn bad_host_is_an_address_error() {
        let result = RedisClient::connect_to("not a host name", 6379);

        assert!(matches!(result, Err(ClientError::AddrError(_))));
    }
}
