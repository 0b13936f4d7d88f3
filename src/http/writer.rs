use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::date;
use crate::http::request::Version;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.0";

/// Terminator written after the status line and each header.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// RFC 1945 framing
    #[default]
    Crlf,
    /// Bare line feed, as some historical clients and scripts expect
    Lf,
}

impl LineEnding {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::Crlf => b"\r\n",
            LineEnding::Lf => b"\n",
        }
    }
}

/// Serializes `resp` for a client that spoke `version`.
///
/// HTTP/0.9 gets the body only. Everyone else gets an HTTP/1.0 status line,
/// `Date`, `Content-Length` computed from the body, `Content-Type` when set,
/// the extra headers, a blank line and the body.
pub fn serialize_response(
    resp: &Response,
    version: Version,
    ending: LineEnding,
    now: DateTime<Utc>,
) -> Bytes {
    if version.is_legacy() {
        return Bytes::copy_from_slice(&resp.body);
    }

    let eol = ending.as_bytes();
    let mut buf = BytesMut::with_capacity(256 + resp.body.len());

    // Status line
    buf.put_slice(
        format!(
            "{} {} {}",
            HTTP_VERSION,
            resp.status.as_u16(),
            resp.status.reason_phrase()
        )
        .as_bytes(),
    );
    buf.put_slice(eol);

    put_header(&mut buf, "Date", &date::format_http_date(&now), eol);
    put_header(&mut buf, "Content-Length", &resp.body.len().to_string(), eol);
    if let Some(content_type) = &resp.content_type {
        put_header(&mut buf, "Content-Type", content_type, eol);
    }
    for (k, v) in &resp.headers {
        put_header(&mut buf, k, v, eol);
    }

    // Header/body separator
    buf.put_slice(eol);

    buf.put_slice(&resp.body);

    buf.freeze()
}

fn put_header(buf: &mut BytesMut, key: &str, value: &str, eol: &[u8]) {
    buf.put_slice(key.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(eol);
}

pub struct ResponseWriter {
    buffer: Bytes,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, version: Version, ending: LineEnding) -> Self {
        Self::with_date(response, version, ending, date::now())
    }

    pub fn with_date(
        response: &Response,
        version: Version,
        ending: LineEnding,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            buffer: serialize_response(response, version, ending, now),
            written: 0,
        }
    }

    /// Total size of the serialized response.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Writes the whole buffer and returns the number of bytes written.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(self.written)
    }
}
