use crate::{errors::NativeError, frame::Frame, Serializable};

/// Commands the flight store issues against the key-value server.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    HGet { key: String, field: String },
    HSet { key: String, field: String, value: String },
    HGetAll { key: String },
}

impl Command {
    /// Upper-case command name as sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::HGet { .. } => "HGET",
            Command::HSet { .. } => "HSET",
            Command::HGetAll { .. } => "HGETALL",
        }
    }

    /// Commands travel as an array of bulk strings.
    pub fn to_frame(&self) -> Frame {
        let mut parts = vec![Frame::bulk(self.name())];
        match self {
            Command::Ping => {}
            Command::HGet { key, field } => {
                parts.push(Frame::bulk(key));
                parts.push(Frame::bulk(field));
            }
            Command::HSet { key, field, value } => {
                parts.push(Frame::bulk(key));
                parts.push(Frame::bulk(field));
                parts.push(Frame::bulk(value));
            }
            Command::HGetAll { key } => parts.push(Frame::bulk(key)),
        }
        Frame::Array(Some(parts))
    }

    /// Decodes a command sent by a client.
    pub fn from_frame(frame: Frame) -> Result<Self, NativeError> {
        let Frame::Array(Some(parts)) = frame else {
            return Err(NativeError::InvalidCommand(
                "a command must be an array of bulk strings".to_string(),
            ));
        };
        let mut args = parts
            .iter()
            .map(|part| match part {
                Frame::Bulk(Some(_)) => part.as_text().ok_or(NativeError::InvalidUtf8),
                _ => Err(NativeError::InvalidCommand(format!(
                    "unexpected argument {:?}",
                    part
                ))),
            })
            .collect::<Result<Vec<String>, NativeError>>()?
            .into_iter();

        let name = args
            .next()
            .ok_or_else(|| NativeError::InvalidCommand("empty command".to_string()))?
            .to_uppercase();
        let args: Vec<String> = args.collect();

        let command = match (name.as_str(), args.as_slice()) {
            ("PING", []) => Command::Ping,
            ("HGET", [key, field]) => Command::HGet {
                key: key.clone(),
                field: field.clone(),
            },
            ("HSET", [key, field, value]) => Command::HSet {
                key: key.clone(),
                field: field.clone(),
                value: value.clone(),
            },
            ("HGETALL", [key]) => Command::HGetAll { key: key.clone() },
            _ => {
                return Err(NativeError::InvalidCommand(format!(
                    "unsupported command {} with {} argument(s)",
                    name,
                    args.len()
                )))
            }
        };
        Ok(command)
    }
}

impl Serializable for Command {
    fn to_bytes(&self) -> Result<Vec<u8>, NativeError> {
        self.to_frame().to_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, NativeError> {
        Command::from_frame(Frame::from_bytes(bytes)?)
    }
}
