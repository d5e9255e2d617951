use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::HttpOptions;
use crate::io::DEFAULT_CHUNK_SIZE;
use crate::progress::ProgressOptions;
use crate::throughput::DEFAULT_WINDOW_SECS;

/// HTTP transfer parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds to wait for the TCP/TLS connection.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds.
    pub timeout_secs: u64,
    /// Follow 3xx redirects.
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 3600,
            follow_redirects: true,
        }
    }
}

impl HttpConfig {
    pub fn to_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            follow_redirects: self.follow_redirects,
            headers: Vec::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/streamtap/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamtapConfig {
    /// Minimum milliseconds between progress reports.
    pub interval_ms: u64,
    /// Throughput averaging window in seconds.
    pub window_secs: u32,
    /// Read buffer size for copies, in bytes.
    pub chunk_size: usize,
    /// Keep consuming input when the output side goes away.
    #[serde(default)]
    pub drain: bool,
    /// Optional HTTP settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for StreamtapConfig {
    fn default() -> Self {
        Self {
            interval_ms: 250,
            window_secs: DEFAULT_WINDOW_SECS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            drain: false,
            http: None,
        }
    }
}

impl StreamtapConfig {
    /// Stream options carrying the configured interval, window and drain flag.
    pub fn to_options(&self) -> ProgressOptions {
        ProgressOptions::default()
            .time(self.interval_ms)
            .speed(self.window_secs)
            .drain(self.drain)
    }

    pub fn http_options(&self) -> HttpOptions {
        self.http.clone().unwrap_or_default().to_options()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("streamtap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StreamtapConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = StreamtapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: StreamtapConfig = toml::from_str(&data)?;
    Ok(cfg)
}
