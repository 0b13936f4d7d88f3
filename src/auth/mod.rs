//! Realm-based access control
//!
//! Realms are loaded once at start-up and never change; the router only
//! looks them up.

pub mod basic;
pub mod realm;

pub use basic::Credentials;
pub use realm::{Realm, RealmError, RealmTable};
