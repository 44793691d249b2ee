use std::time::Duration;

use std::io::ErrorKind;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8005;
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:50040";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: DEFAULT_PORT, worker_threads: Some(4) }
    }
}

/// Where and how the broker reaches the storage backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_api_version() -> String { "v1alpha".to_string() }
fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 30 }
fn default_log_format() -> String { "compact".to_string() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn default_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Like [`load_from_file`], but a missing file yields defaults. Unreadable or
/// malformed files are still errors.
fn load_or_default(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if e.downcast_ref::<std::io::Error>().map(|io| io.kind()) == Some(ErrorKind::NotFound) => {
            Ok(AppConfig::default())
        }
        Err(e) => Err(e.context(format!("loading config file {path}"))),
    }
}

impl AppConfig {
    /// Read `path`, or `CONFIG_PATH`/`config.toml` when none is given. Only
    /// the implicit default file may be absent.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => load_from_file(p).map_err(|e| e.context(format!("loading config file {p}"))),
            None => load_or_default(&default_path()),
        }
    }

    pub fn load_and_validate(path: Option<&str>) -> Result<Self> {
        let mut cfg = Self::load(path)?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Environment overrides, then [`AppConfig::normalize`].
    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env();
        self.normalize()
    }

    pub fn apply_env(&mut self) {
        self.server.normalize_from_env();
        self.backend.normalize_from_env();
    }

    /// Fill blanks, trim the endpoint and reject values the broker cannot run with.
    pub fn normalize(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.backend.normalize();
        self.backend.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("BROKER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("BROKER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl BackendConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(endpoint) = std::env::var("OPENSDS_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint;
            }
        }
    }

    pub fn normalize(&mut self) {
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        self.api_version = self.api_version.trim().trim_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow!("backend.endpoint is empty; set it in config.toml, OPENSDS_ENDPOINT or --endpoint"));
        }
        let lower = self.endpoint.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("backend.endpoint must start with http:// or https://"));
        }
        if self.api_version.is_empty() {
            return Err(anyhow!("backend.api_version must not be empty"));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("backend timeouts must be positive seconds"));
        }
        if self.connect_timeout_secs > self.request_timeout_secs {
            return Err(anyhow!("backend.connect_timeout_secs must not exceed request_timeout_secs"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.backend.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.backend.api_version, "v1alpha");
        assert_eq!(cfg.backend.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.backend.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let cfg = parse(
            r#"
            [server]
            port = 9000

            [backend]
            endpoint = "http://opensds:50040/"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.backend.request_timeout_secs, 30);
    }

    #[test]
    fn backend_validation_rejects_bad_values() {
        let mut b = BackendConfig { endpoint: "opensds:50040".into(), ..BackendConfig::default() };
        assert!(b.validate().is_err());

        b.endpoint = "http://opensds:50040".into();
        assert!(b.validate().is_ok());

        b.connect_timeout_secs = 0;
        assert!(b.validate().is_err());

        b.connect_timeout_secs = 60;
        assert!(b.validate().is_err());
    }

    #[test]
    fn zero_worker_threads_normalized() {
        let mut s = ServerConfig { worker_threads: Some(0), ..ServerConfig::default() };
        s.normalize().unwrap();
        assert_eq!(s.worker_threads, Some(4));

        s.port = 0;
        assert!(s.normalize().is_err());
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = load_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.backend.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn malformed_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nrequest_timeout_secs = \"thirty\"\n").unwrap();
        let err = load_or_default(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));

        std::fs::write(&path, "[server\nport = 1").unwrap();
        assert!(load_or_default(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn normalize_trims_endpoint_and_checks_port() {
        let mut cfg = AppConfig::default();
        cfg.backend.endpoint = " http://opensds:50040/ ".into();
        cfg.normalize().unwrap();
        assert_eq!(cfg.backend.endpoint, "http://opensds:50040");

        cfg.server.port = 0;
        assert!(cfg.normalize().is_err());
    }
}
