use crate::http::pages;

/// HTTP status codes produced by the engine.
///
/// - `Ok` (200): Resource returned
/// - `Created` (201): Form submission stored
/// - `MovedPermanently` (301): Directory requested without trailing slash
/// - `NotModified` (304): Conditional GET, resource unchanged
/// - `BadRequest` (400): Malformed request
/// - `Unauthorized` (401): Protected realm, no credentials
/// - `Forbidden` (403): Wrong credentials or unreadable resource
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Unexpected filesystem failure
/// - `NotImplemented` (501): Method not supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use relic::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::MovedPermanently => 301,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use relic::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// A response ready to be serialized by the writer.
///
/// `Content-Length` and `Date` are never stored here: the writer derives them
/// from the body and the clock when the bytes are produced.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Value of the Content-Type header, if any
    pub content_type: Option<String>,
    /// Additional headers in emission order (Location, WWW-Authenticate, ...)
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type("text/plain")
///     .body(b"hi".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Appends a header. Headers are written in the order they were added.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            content_type: self.content_type,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a 200 OK response with the given body and content type.
    pub fn ok(body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .content_type(content_type)
            .body(body.into())
            .build()
    }

    /// Creates a response whose body is the HTML error page for `status`.
    pub fn error(status: StatusCode) -> Self {
        ResponseBuilder::new(status)
            .content_type(pages::HTML_CONTENT_TYPE)
            .body(pages::error_page(status))
            .build()
    }

    /// 404 with the not-found page.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NotFound)
    }

    /// 401 challenging the client for the given realm.
    pub fn unauthorized(realm: &str) -> Self {
        let mut response = Self::error(StatusCode::Unauthorized);
        response.headers.push((
            "WWW-Authenticate".to_string(),
            format!("Basic realm=\"{}\"", realm),
        ));
        response
    }

    /// 301 pointing the client at `location`.
    pub fn moved_permanently(location: &str) -> Self {
        let mut response = Self::error(StatusCode::MovedPermanently);
        response
            .headers
            .push(("Location".to_string(), location.to_string()));
        response
    }

    /// Looks up an additional header by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
