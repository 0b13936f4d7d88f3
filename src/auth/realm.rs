//! Authentication realms and the realm file format.
//!
//! ```text
//! [Private area]
//! login=alice
//! pass=secret
//! uri=/private/index.html
//! uri=/private/
//!
//! [Reports]
//! ...
//! ```
//!
//! A realm ends at a blank line or at the end of the file. Lines starting
//! with `#` are comments.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// A named set of URIs protected by one login/password pair.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Realm {
    pub name: String,
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub uris: HashSet<String>,
}

impl Realm {
    /// Exact string comparison, no prefix or pattern matching.
    pub fn protects(&self, uri: &str) -> bool {
        self.uris.contains(uri)
    }

    pub fn accepts(&self, login: &str, password: &str) -> bool {
        self.login == login && self.password == password
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RealmError {
    #[error("line {line}: {key}= outside of a realm section")]
    OutsideRealm { line: usize, key: String },
    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: expected key=value, got {text:?}")]
    Malformed { line: usize, text: String },
    #[error("line {line}: realm name is empty")]
    EmptyName { line: usize },
    #[error("line {line}: {key}= given twice in realm {realm:?}")]
    Duplicate { line: usize, realm: String, key: String },
    #[error("realm {realm:?} has no {key}=")]
    Missing { realm: String, key: &'static str },
}

/// Immutable list of realms, queried once per request.
#[derive(Debug, Clone, Default)]
pub struct RealmTable {
    realms: Vec<Realm>,
}

impl RealmTable {
    pub fn new(realms: Vec<Realm>) -> Self {
        Self { realms }
    }

    /// Reads and parses a realm file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read realm file {}: {}", path.display(), e))?;
        let realms = parse_realms(&text)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(Self { realms })
    }

    /// First realm protecting `uri`, if any.
    pub fn find(&self, uri: &str) -> Option<&Realm> {
        self.realms.iter().find(|r| r.protects(uri))
    }

    pub fn extend(&mut self, realms: impl IntoIterator<Item = Realm>) {
        self.realms.extend(realms);
    }

    pub fn into_realms(self) -> Vec<Realm> {
        self.realms
    }

    pub fn len(&self) -> usize {
        self.realms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realms.is_empty()
    }
}

struct PartialRealm {
    name: String,
    login: Option<String>,
    password: Option<String>,
    uris: HashSet<String>,
}

impl PartialRealm {
    fn finish(self) -> Result<Realm, RealmError> {
        let login = self.login.ok_or_else(|| RealmError::Missing {
            realm: self.name.clone(),
            key: "login",
        })?;
        let password = self.password.ok_or_else(|| RealmError::Missing {
            realm: self.name.clone(),
            key: "pass",
        })?;
        Ok(Realm {
            name: self.name,
            login,
            password,
            uris: self.uris,
        })
    }
}

/// Parses the text of a realm file.
pub fn parse_realms(text: &str) -> Result<Vec<Realm>, RealmError> {
    let mut realms = Vec::new();
    let mut current: Option<PartialRealm> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.starts_with('#') {
            continue;
        }

        if line.is_empty() {
            if let Some(realm) = current.take() {
                realms.push(realm.finish()?);
            }
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some(realm) = current.take() {
                realms.push(realm.finish()?);
            }
            let name = name.trim();
            if name.is_empty() {
                return Err(RealmError::EmptyName { line: line_no });
            }
            current = Some(PartialRealm {
                name: name.to_string(),
                login: None,
                password: None,
                uris: HashSet::new(),
            });
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| RealmError::Malformed {
            line: line_no,
            text: line.to_string(),
        })?;
        let (key, value) = (key.trim(), value.trim());

        let realm = current.as_mut().ok_or_else(|| RealmError::OutsideRealm {
            line: line_no,
            key: key.to_string(),
        })?;

        let slot = match key {
            "login" => &mut realm.login,
            "pass" => &mut realm.password,
            "uri" => {
                realm.uris.insert(value.to_string());
                continue;
            }
            _ => {
                return Err(RealmError::UnknownKey {
                    line: line_no,
                    key: key.to_string(),
                });
            }
        };

        if slot.is_some() {
            return Err(RealmError::Duplicate {
                line: line_no,
                realm: realm.name.clone(),
                key: key.to_string(),
            });
        }
        *slot = Some(value.to_string());
    }

    if let Some(realm) = current.take() {
        realms.push(realm.finish()?);
    }

    Ok(realms)
}
