use crate::{errors::NativeError, Serializable};

const CRLF: &[u8] = b"\r\n";

/// A single value of the key-value store wire protocol (RESP2).
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `+OK\r\n`
    Simple(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:42\r\n`
    Integer(i64),
    /// `$5\r\nhello\r\n`, or `$-1\r\n` for a missing value.
    Bulk(Option<Vec<u8>>),
    /// `*2\r\n...`, or `*-1\r\n` for a missing array.
    Array(Option<Vec<Frame>>),
}

impl Frame {
    /// Builds a bulk string frame from any byte-like value.
    pub fn bulk(value: impl AsRef<[u8]>) -> Self {
        Frame::Bulk(Some(value.as_ref().to_vec()))
    }

    /// Returns the textual content of a simple or bulk string frame.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Frame::Simple(text) => Some(text.clone()),
            Frame::Bulk(Some(bytes)) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }

    /// Parses the first complete frame found in `bytes`.
    ///
    /// Returns `Ok(None)` when more bytes are needed, otherwise the frame and
    /// the number of bytes it used.
    pub fn parse(bytes: &[u8]) -> Result<Option<(Frame, usize)>, NativeError> {
        parse_at(bytes, 0)
    }

    fn write_to(&self, out: &mut Vec<u8>) -> Result<(), NativeError> {
        match self {
            Frame::Simple(text) => write_line(out, b'+', text)?,
            Frame::Error(text) => write_line(out, b'-', text)?,
            Frame::Integer(value) => {
                out.push(b':');
                out.extend_from_slice(value.to_string().as_bytes());
                out.extend_from_slice(CRLF);
            }
            Frame::Bulk(None) => out.extend_from_slice(b"$-1\r\n"),
            Frame::Bulk(Some(bytes)) => {
                out.push(b'$');
                out.extend_from_slice(bytes.len().to_string().as_bytes());
                out.extend_from_slice(CRLF);
                out.extend_from_slice(bytes);
                out.extend_from_slice(CRLF);
            }
            Frame::Array(None) => out.extend_from_slice(b"*-1\r\n"),
            Frame::Array(Some(items)) => {
                out.push(b'*');
                out.extend_from_slice(items.len().to_string().as_bytes());
                out.extend_from_slice(CRLF);
                for item in items {
                    item.write_to(out)?;
                }
            }
        }
        Ok(())
    }
}

impl Serializable for Frame {
    fn to_bytes(&self) -> Result<Vec<u8>, NativeError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, NativeError> {
        match Frame::parse(bytes)? {
            Some((frame, used)) if used == bytes.len() => Ok(frame),
            Some(_) => Err(NativeError::TrailingBytes),
            None => Err(NativeError::NotEnoughBytes),
        }
    }
}

fn write_line(out: &mut Vec<u8>, marker: u8, text: &str) -> Result<(), NativeError> {
    if text.contains('\r') || text.contains('\n') {
        return Err(NativeError::SerializationError(format!(
            "line frame contains a line break: {:?}",
            text
        )));
    }
    out.push(marker);
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(CRLF);
    Ok(())
}

/// Finds the CRLF-terminated line starting at `start`.
fn read_line(bytes: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let rest = bytes.get(start..)?;
    rest.windows(2)
        .position(|window| window == CRLF)
        .map(|end| (&rest[..end], start + end + 2))
}

fn line_text(line: &[u8]) -> Result<String, NativeError> {
    String::from_utf8(line.to_vec()).map_err(|_| NativeError::InvalidUtf8)
}

fn line_integer(line: &[u8]) -> Result<i64, NativeError> {
    let text = line_text(line)?;
    text.parse::<i64>()
        .map_err(|_| NativeError::InvalidInteger(text))
}

fn line_length(line: &[u8]) -> Result<Option<usize>, NativeError> {
    match line_integer(line)? {
        -1 => Ok(None),
        length => usize::try_from(length)
            .map(Some)
            .map_err(|_| NativeError::InvalidLength(length.to_string())),
    }
}

fn parse_at(bytes: &[u8], pos: usize) -> Result<Option<(Frame, usize)>, NativeError> {
    let Some(&marker) = bytes.get(pos) else {
        return Ok(None);
    };
    let Some((line, next)) = read_line(bytes, pos + 1) else {
        return Ok(None);
    };

    match marker {
        b'+' => Ok(Some((Frame::Simple(line_text(line)?), next))),
        b'-' => Ok(Some((Frame::Error(line_text(line)?), next))),
        b':' => Ok(Some((Frame::Integer(line_integer(line)?), next))),
        b'$' => {
            let Some(length) = line_length(line)? else {
                return Ok(Some((Frame::Bulk(None), next)));
            };
            let end = next + length;
            if bytes.len() < end + CRLF.len() {
                return Ok(None);
            }
            if &bytes[end..end + CRLF.len()] != CRLF {
                return Err(NativeError::MissingTerminator);
            }
            Ok(Some((
                Frame::Bulk(Some(bytes[next..end].to_vec())),
                end + CRLF.len(),
            )))
        }
        b'*' => {
            let Some(count) = line_length(line)? else {
                return Ok(Some((Frame::Array(None), next)));
            };
            let mut items = Vec::new();
            let mut cursor = next;
            for _ in 0..count {
                match parse_at(bytes, cursor)? {
                    Some((item, after)) => {
                        items.push(item);
                        cursor = after;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((Frame::Array(Some(items)), cursor)))
        }
        other => Err(NativeError::InvalidType(other)),
    }
}
