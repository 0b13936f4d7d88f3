//! Basic-scheme credentials from the `Authorization` header.

use base64ct::{Base64, Base64Unpadded, Encoding};

/// Login and password decoded from `Authorization: Basic <base64>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    /// Decodes the value of an `Authorization` header.
    ///
    /// Returns `None` for other schemes, invalid base64, or a payload without
    /// a `:` separator. Only the first `:` splits, so passwords may contain
    /// colons.
    pub fn from_header(value: &str) -> Option<Self> {
        let (scheme, payload) = value.trim().split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("Basic") {
            return None;
        }

        let decoded = decode_base64(payload.trim())?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (login, password) = decoded.split_once(':')?;

        Some(Self {
            login: login.to_string(),
            password: password.to_string(),
        })
    }
}

/// Decodes standard (RFC 4648) base64, padded or not.
pub fn decode_base64(input: &str) -> Option<Vec<u8>> {
    Base64::decode_vec(input)
        .or_else(|_| Base64Unpadded::decode_vec(input))
        .ok()
}
