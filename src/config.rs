use crate::registry::{
    RefreshSettings, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_BODY_BYTES, DEFAULT_REFRESH_INTERVAL,
    DOTGOV_REGISTRY_URL,
};
use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct IsitgovConfig {
    /// URL (or local path) of the registry CSV
    pub source_url: String,

    /// Time between scheduled refreshes
    #[serde(with = "humantime_serde_compat")]
    pub refresh_interval: Duration,

    /// Refresh immediately when the scheduler starts
    pub initial_fetch_on_startup: bool,

    /// Upper bound for one fetch
    #[serde(with = "humantime_serde_compat")]
    pub fetch_timeout: Duration,

    /// Maximum accepted response body size
    pub max_body_bytes: u64,

    /// Publish a snapshot even when the document has no data rows
    pub publish_empty_snapshot: bool,

    /// Address for the HTTP server
    pub listen_address: String,

    /// Port for the HTTP server
    pub listen_port: u16,
}

const EMPTY_CONFIG: &str = r#"### isitgov configuration file

### registry source, an http(s) URL or a local file path
# source_url = "https://raw.githubusercontent.com/GSA/data/master/dotgov-domains/current-full.csv"

### refresh schedule (humantime durations, e.g. "14days", "12h")
# refresh_interval = "14days"
# initial_fetch_on_startup = true

### fetch limits
# fetch_timeout = "60s"
# max_body_bytes = 67108864

### publish an empty snapshot when the registry has no data rows
# publish_empty_snapshot = true

### http server
# listen_address = "127.0.0.1"
# listen_port = 8080
"#;

impl Default for IsitgovConfig {
    fn default() -> Self {
        Self {
            source_url: DOTGOV_REGISTRY_URL.to_string(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            initial_fetch_on_startup: true,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            publish_empty_snapshot: true,
            listen_address: "127.0.0.1".to_string(),
            listen_port: 8080,
        }
    }
}

impl IsitgovConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<IsitgovConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                // By default use $HOME/.isitgov/isitgov.toml as the configuration file path
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not find home directory"))?
                    .to_str()
                    .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
                    .to_owned();
                let isitgov_dir = format!("{}/.isitgov", home_dir.as_str());
                std::fs::create_dir_all(isitgov_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create isitgov directory: {}", e))?;
                let p = format!("{}/isitgov.toml", isitgov_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of ISITGOV)
        // E.g., `ISITGOV_SOURCE_URL=./current-full.csv ./isitgov serve` reads a local file
        builder = builder.add_source(config::Environment::with_prefix("ISITGOV"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    /// Build a configuration from flat key/value settings, falling back to
    /// defaults for missing keys
    pub fn from_map(config: &HashMap<String, String>) -> Result<IsitgovConfig> {
        let defaults = IsitgovConfig::default();

        let source_url = config
            .get("source_url")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.source_url);

        let refresh_interval = match config.get("refresh_interval") {
            Some(s) => parse_duration("refresh_interval", s)?,
            None => defaults.refresh_interval,
        };
        if refresh_interval.is_zero() {
            return Err(anyhow!("refresh_interval must be greater than zero"));
        }

        let fetch_timeout = match config.get("fetch_timeout") {
            Some(s) => parse_duration("fetch_timeout", s)?,
            None => defaults.fetch_timeout,
        };

        let max_body_bytes = config
            .get("max_body_bytes")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let initial_fetch_on_startup = config
            .get("initial_fetch_on_startup")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.initial_fetch_on_startup);

        let publish_empty_snapshot = config
            .get("publish_empty_snapshot")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.publish_empty_snapshot);

        let listen_address = config
            .get("listen_address")
            .cloned()
            .unwrap_or(defaults.listen_address);

        let listen_port = config
            .get("listen_port")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.listen_port);

        Ok(IsitgovConfig {
            source_url,
            refresh_interval,
            initial_fetch_on_startup,
            fetch_timeout,
            max_body_bytes,
            publish_empty_snapshot,
            listen_address,
            listen_port,
        })
    }

    /// Scheduler settings derived from this configuration
    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            refresh_interval: self.refresh_interval,
            initial_fetch_on_startup: self.initial_fetch_on_startup,
            publish_empty_snapshot: self.publish_empty_snapshot,
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Source:             {}", self.source_url),
            format!(
                "Refresh Interval:   {}",
                humantime::format_duration(self.refresh_interval)
            ),
            format!("Fetch On Startup:   {}", self.initial_fetch_on_startup),
            format!(
                "Fetch Timeout:      {}",
                humantime::format_duration(self.fetch_timeout)
            ),
            format!("Max Body Size:      {}", format_size(self.max_body_bytes)),
            format!("Publish Empty:      {}", self.publish_empty_snapshot),
            format!(
                "Listen Address:     {}:{}",
                self.listen_address, self.listen_port
            ),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.isitgov/isitgov.toml", home_dir)
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| anyhow!("Invalid duration for {} ('{}'): {}", key, value, e))
}

/// Serialize durations as humantime strings ("14days", "1m")
mod humantime_serde_compat {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }
}

/// Format byte size to human readable string
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
