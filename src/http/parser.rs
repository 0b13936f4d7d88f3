use thiserror::Error;

use crate::http::request::{Method, Request, Version};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("request line must have exactly three tokens")]
    InvalidRequestLine,
    #[error("unsupported protocol version {0:?}")]
    InvalidVersion(String),
    #[error("malformed header line {0:?}")]
    InvalidHeader(String),
}

/// Builds a request from the raw lines returned by the request reader.
///
/// The first line is the request line; every following line is a header.
/// The body is left empty, the connection fills it in for POST.
pub fn parse_request(lines: &[String]) -> Result<Request, ParseError> {
    let (request_line, header_lines) = lines.split_first().ok_or(ParseError::Empty)?;

    let (method, path, version) = parse_request_line(request_line)?;

    let mut headers = Vec::with_capacity(header_lines.len());
    for line in header_lines {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidHeader(line.clone()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader(line.clone()));
        }

        headers.push((key.to_string(), value.trim().to_string()));
    }

    Ok(Request {
        method,
        path,
        version,
        headers,
        body: Vec::new(),
    })
}

/// Splits a request line into method, URI and version.
pub fn parse_request_line(line: &str) -> Result<(Method, String, Version), ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let [method, path, version] = parts.as_slice() else {
        return Err(ParseError::InvalidRequestLine);
    };

    let version = Version::from_token(version)
        .ok_or_else(|| ParseError::InvalidVersion(version.to_string()))?;

    Ok((Method::from_token(method), path.to_string(), version))
}
