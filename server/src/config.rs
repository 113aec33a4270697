use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Server settings, read from environment variables.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `production` hides internal error details from responses.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Directory served for `/app` and any unmatched path.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Requests allowed per client within one window.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    /// Insert the welcome records at start-up.
    #[serde(default = "default_seed_samples")]
    pub seed_samples: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            static_dir: default_static_dir(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            seed_samples: default_seed_samples(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_rate_limit_max() -> u32 {
    100
}

fn default_rate_limit_window_secs() -> u64 {
    15 * 60
}

fn default_seed_samples() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.address(), "127.0.0.1:3000");
        assert!(!config.is_production());
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(900));
        assert!(config.seed_samples);
    }

    #[test]
    fn production_is_case_insensitive() {
        let config = Config {
            environment: "Production".to_string(),
            ..Config::default()
        };
        assert!(config.is_production());
    }

    #[test]
    fn deserializes_with_every_field_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, PathBuf::from("frontend"));
    }
}
