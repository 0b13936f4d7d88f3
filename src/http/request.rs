/// HTTP request methods.
///
/// The engine serves GET, HEAD and POST. Any other token is kept verbatim in
/// `Other` so the router can answer 501 Not Implemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Submit form data
    POST,
    /// Any method the engine does not implement
    Other(String),
}

/// Protocol versions recognized on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// HTTP/0.9: single request line, body-only response
    Http09,
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1, accepted for negotiation only; answered with 1.0 semantics
    Http11,
}

/// Represents a parsed HTTP request from a client.
///
/// Lives for exactly one connection: built by the reader and parser, consumed
/// by the router, then dropped.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request URI exactly as sent (e.g., "/index.html")
    pub path: String,
    /// Protocol version from the request line
    pub version: Version,
    /// Header lines in arrival order
    pub headers: Vec<(String, String)>,
    /// Request body, only ever filled for POST
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<Version>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Method {
    /// Maps a request-line token to a method.
    ///
    /// Matching is case-sensitive, so `get` becomes `Method::Other("get")`.
    ///
    /// # Example
    ///
    /// ```
    /// # use relic::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Other("get".to_string()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::Other(s) => s,
        }
    }
}

impl Version {
    /// Parses the version token of a request line. Case-sensitive.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "HTTP/0.9" => Some(Version::Http09),
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http09 => "HTTP/0.9",
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }

    /// HTTP/0.9 responses carry no status line and no headers.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Version::Http09)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or(Version::Http10),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves the first header with the given name, ignoring ASCII case.
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Parses the Content-Length header.
    ///
    /// Returns `None` if the header is missing or not a valid number.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
    }
}
