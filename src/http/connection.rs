use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::http::parser::parse_request;
use crate::http::reader::{self, ReadError, RequestLimits};
use crate::http::request::{Method, Request, Version};
use crate::http::response::{Response, StatusCode};
use crate::http::router::Router;
use crate::http::writer::{LineEnding, ResponseWriter};

/// Per-connection knobs shared by every worker.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub limits: RequestLimits,
    pub line_ending: LineEnding,
    /// Upper bound for receiving the request head and body
    pub client_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            limits: RequestLimits::default(),
            line_ending: LineEnding::default(),
            client_timeout: Duration::from_secs(5),
        }
    }
}

/// What happened on a connection, for the worker's log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Peer closed before sending anything
    Closed,
    /// A response was written
    Responded {
        method: String,
        path: String,
        status: u16,
        bytes: usize,
    },
}

/// One client connection, served for exactly one request.
///
/// There is no keep-alive: after the response is written the stream is shut
/// down and the connection is done.
pub struct Connection<S> {
    stream: BufReader<S>,
    router: Arc<Router>,
    settings: ConnectionSettings,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, settings: ConnectionSettings) -> Self {
        Self {
            stream: BufReader::new(stream),
            router,
            settings,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<Outcome> {
        let (request, response) = match self.receive().await? {
            Received::Nothing => return Ok(Outcome::Closed),
            Received::Request(request) => {
                let response = self.router.route(&request).await;
                (Some(request), response)
            }
            Received::Rejected(response) => (None, response),
        };

        let version = request
            .as_ref()
            .map(|r| r.version)
            .unwrap_or(Version::Http10);

        let mut writer = ResponseWriter::new(&response, version, self.settings.line_ending);
        let bytes = writer.write_to_stream(self.stream.get_mut()).await?;
        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::debug!(error = %e, "Shutdown after response failed");
        }

        let (method, path) = request
            .map(|r| (r.method.as_str().to_string(), r.path))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));

        Ok(Outcome::Responded {
            method,
            path,
            status: response.status.as_u16(),
            bytes,
        })
    }

    /// Reads and parses the request, including a POST body.
    async fn receive(&mut self) -> anyhow::Result<Received> {
        let limits = &self.settings.limits;

        let head = timeout(
            self.settings.client_timeout,
            reader::read_request_head(&mut self.stream, limits),
        )
        .await
        .map_err(|_| anyhow::anyhow!("timed out waiting for request"))?;

        let lines = match head {
            Ok(Some(lines)) => lines,
            Ok(None) => return Ok(Received::Nothing),
            Err(e) => return reject(e),
        };

        let mut request: Request = match parse_request(&lines) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed request");
                return Ok(Received::Rejected(Response::error(StatusCode::BadRequest)));
            }
        };

        if request.method == Method::POST {
            if let Some(len) = request.content_length() {
                let body = timeout(
                    self.settings.client_timeout,
                    reader::read_body(&mut self.stream, len, limits),
                )
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for request body"))?;

                match body {
                    Ok(body) => request.body = body,
                    Err(e) => return reject(e),
                }
            }
        }

        Ok(Received::Request(request))
    }
}

enum Received {
    Nothing,
    Request(Request),
    Rejected(Response),
}

fn reject(err: ReadError) -> anyhow::Result<Received> {
    if err.is_client_error() {
        tracing::debug!(error = %err, "Request exceeds limits");
        Ok(Received::Rejected(Response::error(StatusCode::BadRequest)))
    } else {
        Err(err.into())
    }
}
