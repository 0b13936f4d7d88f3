//! Server configuration
//!
//! Defaults mirror the classic setup: port 6666, a backlog of 20 and at most
//! 20 concurrent clients, serving the working directory. A YAML file named by
//! `RELIC_CONFIG` overrides the defaults, and a few environment variables
//! override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::{Realm, RealmTable};
use crate::http::connection::ConnectionSettings;
use crate::http::reader::RequestLimits;
use crate::http::writer::LineEnding;

/// Path of the YAML configuration file
pub const CONFIG_ENV: &str = "RELIC_CONFIG";
/// Listen address override
pub const LISTEN_ENV: &str = "LISTEN";
/// Document root override
pub const ROOT_ENV: &str = "RELIC_ROOT";
/// Realm file override
pub const REALMS_ENV: &str = "RELIC_REALMS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Directory requests are resolved against
    pub document_root: PathBuf,
    /// Realm file in the `[name]` / `login=` / `pass=` / `uri=` format
    pub realms_file: Option<PathBuf>,
    /// Realms given inline in the YAML file
    pub realms: Vec<Realm>,
    pub limits: RequestLimits,
    pub line_ending: LineEnding,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Pending connection queue passed to listen(2)
    pub backlog: u32,
    /// Size of the connection slot table
    pub max_connections: usize,
    /// Accept wait before a housekeeping pass
    pub housekeeping_interval_ms: u64,
    /// How long a client may take to send its request
    pub client_timeout_ms: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("listen address is empty")]
    EmptyListenAddr,
    #[error("realm #{index} is invalid: {reason}")]
    InvalidRealm { index: usize, reason: &'static str },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            document_root: PathBuf::from("."),
            realms_file: None,
            realms: Vec::new(),
            limits: RequestLimits::default(),
            line_ending: LineEnding::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:6666".to_string(),
            backlog: 20,
            max_connections: 20,
            housekeeping_interval_ms: 5000,
            client_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_millis(self.housekeeping_interval_ms)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading variables through `env`.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = match env(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(addr) = env(LISTEN_ENV) {
            cfg.server.listen_addr = addr;
        }
        if let Some(root) = env(ROOT_ENV) {
            cfg.document_root = PathBuf::from(root);
        }
        if let Some(realms) = env(REALMS_ENV) {
            cfg.realms_file = Some(PathBuf::from(realms));
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(ConfigError::EmptyListenAddr);
        }

        let positive = [
            ("server.backlog", self.server.backlog as u64),
            ("server.max_connections", self.server.max_connections as u64),
            ("server.housekeeping_interval_ms", self.server.housekeeping_interval_ms),
            ("server.client_timeout_ms", self.server.client_timeout_ms),
            ("limits.max_line_bytes", self.limits.max_line_bytes as u64),
            ("limits.max_head_bytes", self.limits.max_head_bytes as u64),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        for (index, realm) in self.realms.iter().enumerate() {
            let reason = if realm.name.trim().is_empty() {
                "empty name"
            } else if realm.login.is_empty() {
                "empty login"
            } else if realm.password.is_empty() {
                "empty password"
            } else {
                continue;
            };
            return Err(ConfigError::InvalidRealm { index, reason });
        }

        Ok(())
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            limits: self.limits.clone(),
            line_ending: self.line_ending,
            client_timeout: self.server.client_timeout(),
        }
    }

    /// Inline realms followed by the realms from `realms_file`.
    pub fn realm_table(&self) -> anyhow::Result<RealmTable> {
        let mut table = RealmTable::new(self.realms.clone());
        if let Some(path) = &self.realms_file {
            let from_file = RealmTable::load(path)?;
            tracing::info!(path = %path.display(), realms = from_file.len(), "Loaded realm file");
            table.extend(from_file.into_realms());
        }
        Ok(table)
    }
}
