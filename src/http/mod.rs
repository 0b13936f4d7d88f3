//! HTTP protocol implementation.
//!
//! This module implements an HTTP/1.0 server engine that also answers
//! HTTP/0.9 (body only) and accepts HTTP/1.1 request lines.
//!
//! # Architecture
//!
//! - **`connection`**: Drives one connection: read, route, write, close
//! - **`reader`**: Bounded, line-oriented reading of the request head and body
//! - **`parser`**: Request line and header parsing, version detection
//! - **`request`**: HTTP request representation
//! - **`router`**: The protocol engine (GET/HEAD/POST, auth, listings, conditional GET)
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`error`**: Routing failures and their status codes
//! - **`pages`**: Error pages and directory listings
//! - **`mime`**: MIME type detection based on file extensions
//! - **`date`**: RFC 1123 / RFC 850 / asctime dates
//!
//! # Connection Lifecycle
//!
//! Each client connection handles exactly one request:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Request line + headers (+ POST body)
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │     Routing      │ ← Generate response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │     Writing      │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               └─ Close
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use relic::auth::RealmTable;
//! use relic::http::connection::{Connection, ConnectionSettings};
//! use relic::http::router::Router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:6666").await?;
//!     let router = Arc::new(Router::new(".", RealmTable::default()));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, router.clone(), ConnectionSettings::default());
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod date;
pub mod error;
pub mod mime;
pub mod pages;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
