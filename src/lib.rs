//! relic - HTTP/1.0 file server
//!
//! Static files, directory listings, Basic-auth realms, conditional GET and
//! a small form-submission path, with one worker task per connection.

pub mod auth;
pub mod config;
pub mod http;
pub mod server;
