//! Dashboard configuration, read from a RON file.
//!
//! A missing file means defaults; a broken file is reported and ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pricewatch_core::PollPolicy;
use pricewatch_engine::ApiSettings;
use pricewatch_logging::{pw_info, pw_warn, LogDestination};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "pricewatch.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogTarget {
    File,
    #[default]
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub grace_period_ms: u64,
    /// `None` keeps polling through any number of failed status checks.
    pub max_poll_failures: Option<u32>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub export_dir: PathBuf,
    pub active_only: bool,
    pub log_destination: LogTarget,
}

impl Default for AppConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            poll_interval_ms: duration_ms(policy.interval),
            grace_period_ms: duration_ms(policy.grace),
            max_poll_failures: policy.max_consecutive_failures,
            connect_timeout_ms: duration_ms(api.connect_timeout),
            request_timeout_ms: duration_ms(api.request_timeout),
            export_dir: PathBuf::from("."),
            active_only: true,
            log_destination: LogTarget::Terminal,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                pw_warn!("Failed to read config from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str(&content) {
            Ok(config) => {
                pw_info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                pw_warn!("Failed to parse config from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            grace: Duration::from_millis(self.grace_period_ms),
            max_consecutive_failures: self.max_poll_failures,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("absent.ron"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("pricewatch.ron");
        fs::write(
            &path,
            "(base_url: \"http://tracker.local:9000\", max_poll_failures: Some(5))",
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.base_url, "http://tracker.local:9000");
        assert_eq!(config.poll_policy().max_consecutive_failures, Some(5));
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("pricewatch.ron");
        fs::write(&path, "(base_url: ").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn serialized_config_loads_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("pricewatch.ron");
        let config = AppConfig {
            export_dir: PathBuf::from("exports"),
            log_destination: LogTarget::Both,
            ..AppConfig::default()
        };
        fs::write(&path, config.to_ron().unwrap()).unwrap();
        assert_eq!(AppConfig::load(&path), config);
    }
}
