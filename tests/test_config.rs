use std::collections::HashMap;
use std::time::Duration;

use relic::config::{Config, ConfigError};
use relic::http::writer::LineEnding;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::load_with(env_from(&[])).unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:6666");
    assert_eq!(cfg.server.backlog, 20);
    assert_eq!(cfg.server.max_connections, 20);
    assert_eq!(cfg.server.housekeeping_interval(), Duration::from_secs(5));
    assert_eq!(cfg.server.client_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.document_root, std::path::PathBuf::from("."));
    assert_eq!(cfg.line_ending, LineEnding::Crlf);
    assert!(cfg.realms_file.is_none());
    assert!(cfg.realms.is_empty());
}

#[test]
fn test_config_env_overrides() {
    let cfg = Config::load_with(env_from(&[
        ("LISTEN", "127.0.0.1:8000"),
        ("RELIC_ROOT", "/srv/www"),
        ("RELIC_REALMS", "/etc/relic/realms"),
    ]))
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8000");
    assert_eq!(cfg.document_root, std::path::PathBuf::from("/srv/www"));
    assert_eq!(
        cfg.realms_file.as_deref(),
        Some(std::path::Path::new("/etc/relic/realms"))
    );
}

#[test]
fn test_config_file_then_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relic.yaml");
    std::fs::write(
        &path,
        "server:\n  listen_addr: \"0.0.0.0:7000\"\n  max_connections: 4\nline_ending: lf\n",
    )
    .unwrap();

    let path = path.to_string_lossy().to_string();
    let cfg = Config::load_with(env_from(&[
        ("RELIC_CONFIG", path.as_str()),
        ("LISTEN", "127.0.0.1:7001"),
    ]))
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:7001");
    assert_eq!(cfg.server.max_connections, 4);
    assert_eq!(cfg.server.backlog, 20);
    assert_eq!(cfg.line_ending, LineEnding::Lf);
}

#[test]
fn test_config_missing_file_is_an_error() {
    let result = Config::load_with(env_from(&[("RELIC_CONFIG", "/nonexistent/relic.yaml")]));

    assert!(result.is_err());
}

#[test]
fn test_config_empty_yaml_is_default() {
    let cfg = Config::from_yaml_str("  \n").unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:6666");
    assert_eq!(cfg.limits.max_line_bytes, 8 * 1024);
}

#[test]
fn test_config_yaml_limits_and_realms() {
    let cfg = Config::from_yaml_str(
        r#"
limits:
  max_body_bytes: 2048
realms:
  - name: Staff
    login: alice
    password: secret
    uris: ["/private.html", "/vault/"]
"#,
    )
    .unwrap();

    assert_eq!(cfg.limits.max_body_bytes, 2048);
    assert_eq!(cfg.limits.max_header_lines, 100);
    assert_eq!(cfg.realms.len(), 1);
    assert!(cfg.realms[0].protects("/vault/"));
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_rejects_zero_values() {
    let mut cfg = Config::default();
    cfg.server.max_connections = 0;
    assert_eq!(
        cfg.validate().unwrap_err(),
        ConfigError::Zero("server.max_connections")
    );

    let mut cfg = Config::default();
    cfg.server.housekeeping_interval_ms = 0;
    assert_eq!(
        cfg.validate().unwrap_err(),
        ConfigError::Zero("server.housekeeping_interval_ms")
    );
}

#[test]
fn test_config_rejects_empty_listen_addr() {
    let result = Config::load_with(env_from(&[("LISTEN", "  ")]));

    assert!(result.is_err());

    let mut cfg = Config::default();
    cfg.server.listen_addr = String::new();
    assert_eq!(cfg.validate().unwrap_err(), ConfigError::EmptyListenAddr);
}

#[test]
fn test_config_rejects_incomplete_inline_realm() {
    let cfg = Config::from_yaml_str(
        "realms:\n  - name: Staff\n    login: alice\n    password: \"\"\n",
    )
    .unwrap();

    assert_eq!(
        cfg.validate().unwrap_err(),
        ConfigError::InvalidRealm {
            index: 0,
            reason: "empty password"
        }
    );
}

#[test]
fn test_config_realm_table_merges_inline_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let realms_path = dir.path().join("realms");
    std::fs::write(&realms_path, "[Reports]\nlogin=bob\npass=hunter2\nuri=/reports/\n").unwrap();

    let mut cfg = Config::from_yaml_str(
        "realms:\n  - name: Staff\n    login: alice\n    password: secret\n    uris: [\"/reports/\"]\n",
    )
    .unwrap();
    cfg.realms_file = Some(realms_path);

    let table = cfg.realm_table().unwrap();

    assert_eq!(table.len(), 2);
    // inline realms are consulted first
    assert_eq!(table.find("/reports/").unwrap().name, "Staff");
}

#[test]
fn test_config_connection_settings() {
    let mut cfg = Config::default();
    cfg.server.client_timeout_ms = 250;
    cfg.line_ending = LineEnding::Lf;

    let settings = cfg.connection_settings();

    assert_eq!(settings.client_timeout, Duration::from_millis(250));
    assert_eq!(settings.line_ending, LineEnding::Lf);
    assert_eq!(settings.limits, cfg.limits);
}
