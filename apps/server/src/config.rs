use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use std::{env, fmt, fs, io, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory: neither XDG_CONFIG_HOME nor HOME is set")]
    PathUnavailable,
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: path::PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: path::PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse { path: path::PathBuf, source: toml::de::Error },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sitemap: SitemapConfig,
    pub refresh: RefreshConfig,
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub batch_timeout_seconds: u64,
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub home: path::PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 9090 }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self { url: "https://musale.github.io/sitemap.xml".into() }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: sitemon::DEFAULT_REFRESH_INTERVAL.as_secs(),
            probe_timeout_seconds: sitemon::DEFAULT_PROBE_TIMEOUT.as_secs(),
            batch_timeout_seconds: 5 * 60,
            max_concurrency: 16,
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self { home: path::PathBuf::from("templates/home.html") }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.bind.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_seconds)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/sitemon/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Some(config_home) = env::var_os("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::var_os("HOME") {
        path::PathBuf::from(home_dir).join(".config")
    } else {
        return Err(ConfigError::PathUnavailable);
    };

    Ok(path.join("sitemon/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title = |f: &mut fmt::Formatter<'_>, label: &str| writeln!(f, "  {label}");
        let write_1 = write_indented(1);

        writeln!(f, "Current Configuration:")?;
        write_title(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title(f, "Sitemap")?;
        write_1(f, "URL", &self.sitemap.url)?;
        write_title(f, "Refresh")?;
        write_1(f, "Interval (s)", &self.refresh.interval_seconds)?;
        write_1(f, "Probe Timeout (s)", &self.refresh.probe_timeout_seconds)?;
        write_1(f, "Batch Timeout (s)", &self.refresh.batch_timeout_seconds)?;
        write_1(f, "Max Concurrency", &self.refresh.max_concurrency)?;
        write_title(f, "Templates")?;
        write_1(f, "Home", &self.templates.home.display())?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Reads `config.toml` from the given path or from the default location.
    /// When the file does not exist the defaults are returned and written
    /// there; a failed write is only logged.
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;
            toml::from_str(&raw_string)
                .map_err(|source| ConfigError::Parse { path: config_path, source })
        } else {
            let config = Self::default();
            if let Err(error) = config.write_config(&config_path) {
                warn!("Using built-in defaults, could not write config: {error}");
            }
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Write { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    /// Check every setting against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sitemap_url(&self.sitemap.url)?;
        validate_refresh_interval(self.refresh.interval_seconds)?;
        validate_timeout(self.refresh.probe_timeout_seconds)?;

        if self.refresh.batch_timeout_seconds < self.refresh.probe_timeout_seconds {
            return Err(ConfigError::Invalid(format!(
                "batch timeout ({}s) must not be shorter than the probe timeout ({}s)",
                self.refresh.batch_timeout_seconds, self.refresh.probe_timeout_seconds
            )));
        }
        validate_max_concurrency(self.refresh.max_concurrency)?;
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("port 0 is not valid".into()));
        }
        self.server
            .socket_addr()
            .map_err(|error| ConfigError::Invalid(format!("bind address {:?}: {error}", self.server.bind)))?;

        Ok(())
    }
}

fn validate_sitemap_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|error| ConfigError::Invalid(format!("sitemap URL {raw:?}: {error}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!("unsupported sitemap URL scheme: {other}"))),
    }
}

fn validate_max_concurrency(max_concurrency: usize) -> Result<(), ConfigError> {
    const MAX_CONCURRENCY: usize = 1024;

    if !(1..=MAX_CONCURRENCY).contains(&max_concurrency) {
        return Err(ConfigError::Invalid(format!(
            "max concurrency {max_concurrency} outside 1..={MAX_CONCURRENCY}"
        )));
    }
    Ok(())
}

fn validate_refresh_interval(interval_seconds: u64) -> Result<(), ConfigError> {
    const MIN_INTERVAL: u64 = 10;
    const MAX_INTERVAL: u64 = 86400; // 24 hours

    if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&interval_seconds) {
        return Err(ConfigError::Invalid(format!(
            "refresh interval {interval_seconds}s outside {MIN_INTERVAL}..={MAX_INTERVAL}s"
        )));
    }
    Ok(())
}

fn validate_timeout(timeout_seconds: u64) -> Result<(), ConfigError> {
    const MIN_TIMEOUT: u64 = 1;
    const MAX_TIMEOUT: u64 = 300;

    if !(MIN_TIMEOUT..=MAX_TIMEOUT).contains(&timeout_seconds) {
        return Err(ConfigError::Invalid(format!(
            "probe timeout {timeout_seconds}s outside {MIN_TIMEOUT}..={MAX_TIMEOUT}s"
        )));
    }
    Ok(())
}
