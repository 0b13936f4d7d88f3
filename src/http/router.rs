//! The protocol engine: turns one parsed request into one response.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::auth::{Credentials, RealmTable};
use crate::http::date;
use crate::http::error::RouteError;
use crate::http::mime;
use crate::http::pages::{self, HTML_CONTENT_TYPE};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};

const FORM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Serves files below `root`, guarded by `realms`.
#[derive(Debug, Clone)]
pub struct Router {
    root: PathBuf,
    realms: RealmTable,
}

impl Router {
    pub fn new(root: impl Into<PathBuf>, realms: RealmTable) -> Self {
        Self {
            root: root.into(),
            realms,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Dispatches on the method and converts every failure into an error
    /// response, so the caller always has something to send.
    pub async fn route(&self, req: &Request) -> Response {
        let result = match &req.method {
            Method::GET => self.get(req, true).await,
            Method::HEAD => self.get(req, false).await,
            Method::POST => self.post(req).await,
            Method::Other(name) => Err(RouteError::MethodUnsupported(name.clone())),
        };

        let mut response = match result {
            Ok(response) => response,
            Err(RouteError::Internal(e)) => {
                tracing::warn!(path = %req.path, error = %e, "Filesystem error while routing");
                RouteError::Internal(e).into_response()
            }
            Err(e) => {
                tracing::debug!(path = %req.path, error = %e, "Request refused");
                e.into_response()
            }
        };

        if req.method == Method::HEAD {
            response.body.clear();
        }

        response
    }

    async fn get(&self, req: &Request, include_body: bool) -> Result<Response, RouteError> {
        // realms and the filesystem both see the decoded, canonical path
        let decoded = decode_path(&req.path)?;
        let uri = decoded.as_str();
        let relative = relative_path(uri)?;

        self.authorize(req, uri)?;

        if uri == "/" {
            return self.listing(&self.root, uri).await;
        }

        let full = self.root.join(&relative);

        let metadata = tokio::fs::metadata(&full)
            .await
            .map_err(|e| RouteError::from_io(e, uri))?;

        if metadata.is_dir() {
            if !uri.ends_with('/') {
                return Ok(Response::moved_permanently(&format!("{}/", req.path)));
            }
            return self.listing(&full, uri).await;
        }

        // fifos, sockets and devices could block the open
        if !metadata.is_file() {
            return Err(RouteError::Forbidden(uri.to_string()));
        }

        let content_type = mime::mime_for_path(uri);

        // metadata and contents come from the same handle
        let mut file = File::open(&full)
            .await
            .map_err(|e| RouteError::from_io(e, uri))?;
        let modified = date::truncate_to_seconds(file.metadata().await?.modified()?.into());

        if let Some(since) = req
            .header("If-Modified-Since")
            .and_then(date::parse_http_date)
        {
            if date::compare_dates(&since, &modified) >= 0 {
                return Ok(ResponseBuilder::new(StatusCode::NotModified)
                    .content_type(content_type)
                    .build());
            }
        }

        let mut body = Vec::new();
        if include_body {
            file.read_to_end(&mut body).await?;
        }

        Ok(ResponseBuilder::new(StatusCode::Ok)
            .content_type(content_type)
            .header("Last-Modified", date::format_http_date(&modified))
            .body(body)
            .build())
    }

    /// Rejects requests for protected URIs that lack matching credentials.
    fn authorize(&self, req: &Request, uri: &str) -> Result<(), RouteError> {
        let Some(realm) = self.realms.find(uri) else {
            return Ok(());
        };

        match req.header("Authorization").and_then(Credentials::from_header) {
            None => Err(RouteError::AuthRequired(realm.name.clone())),
            Some(creds) if realm.accepts(&creds.login, &creds.password) => Ok(()),
            Some(creds) => {
                tracing::info!(realm = %realm.name, login = %creds.login, "Credentials rejected");
                Err(RouteError::AuthFailed(realm.name.clone()))
            }
        }
    }

    async fn listing(&self, dir: &Path, uri: &str) -> Result<Response, RouteError> {
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| RouteError::from_io(e, uri))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "." || name == ".." {
                continue;
            }
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            entries.push((name, is_dir));
        }
        entries.sort();

        Ok(Response::ok(pages::listing_page(uri, &entries), HTML_CONTENT_TYPE))
    }

    /// Form submission: `filename` selects (and creates) a file, each
    /// `phrase` appends one line to it. Answers with the file's contents.
    async fn post(&self, req: &Request) -> Result<Response, RouteError> {
        if req.content_length().is_none() {
            return Err(RouteError::Protocol("POST without Content-Length".to_string()));
        }

        let mut target: Option<(PathBuf, File)> = None;

        for (key, value) in url::form_urlencoded::parse(&req.body) {
            match key.as_ref() {
                "filename" => {
                    if value.contains('\0') {
                        return Err(RouteError::Protocol("filename contains NUL".to_string()));
                    }
                    let relative = relative_path(&value)?;
                    if relative.as_os_str().is_empty() {
                        return Err(RouteError::Protocol("empty filename".to_string()));
                    }
                    let path = self.root.join(relative);
                    let file = OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(&path)
                        .await
                        .map_err(|e| RouteError::from_io(e, &value))?;
                    target = Some((path, file));
                }
                "phrase" => {
                    let Some((_, file)) = target.as_mut() else {
                        return Err(RouteError::Protocol("phrase before filename".to_string()));
                    };
                    file.write_all(format!("{}\n", value).as_bytes()).await?;
                }
                other => tracing::debug!(key = other, "Ignoring form field"),
            }
        }

        let Some((path, mut file)) = target else {
            return Err(RouteError::Protocol("form has no filename".to_string()));
        };
        file.flush().await?;
        drop(file);

        let contents = tokio::fs::read(&path).await?;

        Ok(ResponseBuilder::new(StatusCode::Created)
            .content_type(FORM_CONTENT_TYPE)
            .body(contents)
            .build())
    }
}

/// Percent-decodes a request path. NUL bytes and invalid UTF-8 are refused.
fn decode_path(uri: &str) -> Result<String, RouteError> {
    let decoded = percent_decode_str(uri)
        .decode_utf8()
        .map_err(|_| RouteError::Protocol(format!("{:?} is not valid UTF-8", uri)))?;
    if decoded.contains('\0') {
        return Err(RouteError::Protocol(format!("{:?} contains NUL", uri)));
    }
    Ok(decoded.into_owned())
}

/// Maps a decoded URI (or form filename) to a path relative to the document
/// root.
///
/// Every path has exactly one spelling: empty, `.` and `..` segments are
/// refused, except for a single trailing slash.
fn relative_path(uri: &str) -> Result<PathBuf, RouteError> {
    let mut path = PathBuf::new();

    let trimmed = uri.strip_prefix('/').unwrap_or(uri);
    if trimmed.is_empty() {
        return Ok(path);
    }
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    for segment in trimmed.split('/') {
        match segment {
            "" | "." | ".." => {
                return Err(RouteError::Protocol(format!("{:?} is not a canonical path", uri)));
            }
            s => path.push(s),
        }
    }
    Ok(path)
}
