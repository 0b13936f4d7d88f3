use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Bounds applied while reading a request from a client.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RequestLimits {
    /// Longest accepted line, terminator included
    pub max_line_bytes: usize,
    /// Most header lines after the request line
    pub max_header_lines: usize,
    /// Total bytes of request line plus headers
    pub max_head_bytes: usize,
    /// Largest POST body
    pub max_body_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 8 * 1024,
            max_header_lines: 100,
            max_head_bytes: 64 * 1024,
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("request line or header exceeds {0} bytes")]
    LineTooLong(usize),
    #[error("more than {0} header lines")]
    TooManyHeaders(usize),
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("request body of {0} bytes exceeds the limit")]
    BodyTooLarge(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Limit violations are answered with 400; everything else aborts the
    /// connection without a response.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ReadError::Io(_))
    }
}

/// Reads the request line and headers up to the terminating blank line.
///
/// Returns `Ok(None)` when the peer closes the connection before sending a
/// single line. Lines may end in LF or CRLF. An HTTP/0.9 request line ends
/// the head immediately, since such requests carry no headers.
pub async fn read_request_head<R>(
    reader: &mut R,
    limits: &RequestLimits,
) -> Result<Option<Vec<String>>, ReadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines: Vec<String> = Vec::new();
    let mut head_bytes = 0usize;
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        let n = (&mut *reader)
            .take(limits.max_line_bytes as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await?;

        if n == 0 {
            // peer closed; whatever we have is the request
            return Ok(if lines.is_empty() { None } else { Some(lines) });
        }

        if n > limits.max_line_bytes {
            return Err(ReadError::LineTooLong(limits.max_line_bytes));
        }
        let terminated = buf.last() == Some(&b'\n');

        head_bytes += n;
        if head_bytes > limits.max_head_bytes {
            return Err(ReadError::HeadTooLarge(limits.max_head_bytes));
        }

        let line = strip_terminator(&buf);

        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            return Ok(Some(lines));
        }

        if lines.len() > limits.max_header_lines {
            return Err(ReadError::TooManyHeaders(limits.max_header_lines));
        }

        let line = String::from_utf8_lossy(line).into_owned();
        let legacy = lines.is_empty() && is_http09_request_line(&line);
        lines.push(line);

        if legacy || !terminated {
            return Ok(Some(lines));
        }
    }
}

/// Reads exactly `len` body bytes.
pub async fn read_body<R>(
    reader: &mut R,
    len: usize,
    limits: &RequestLimits,
) -> Result<Vec<u8>, ReadError>
where
    R: AsyncBufRead + Unpin,
{
    if len > limits.max_body_bytes {
        return Err(ReadError::BodyTooLarge(len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

fn strip_terminator(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_http09_request_line(line: &str) -> bool {
    line.split_whitespace().nth(2) == Some("HTTP/0.9")
}
