use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8765";
pub const DEFAULT_SETTINGS_PATH: &str = "data/settings.yaml";

/// Runtime configuration for the desktop backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP boundary listens on
    /// Defaults to "127.0.0.1:8765"
    pub bind_address: String,

    /// YAML file holding the user settings
    /// Defaults to "./data/settings.yaml"
    pub settings_path: PathBuf,

    /// Whether to enable debug logging
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            debug: false,
        }
    }
}

impl Config {
    /// Create a new Config instance by reading from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(address) = env::var("GITDESK_BIND_ADDRESS") {
            if !address.trim().is_empty() {
                config.bind_address = address.trim().to_string();
                info!("Bind address configured from GITDESK_BIND_ADDRESS: {}", config.bind_address);
            } else {
                warn!("GITDESK_BIND_ADDRESS is empty, using default: {}", config.bind_address);
            }
        } else {
            info!("GITDESK_BIND_ADDRESS not set, using default: {}", config.bind_address);
        }

        if let Ok(path) = env::var("GITDESK_SETTINGS_PATH") {
            if !path.trim().is_empty() {
                config.settings_path = PathBuf::from(path.trim());
                info!("Settings path configured from GITDESK_SETTINGS_PATH: {:?}", config.settings_path);
            } else {
                warn!("GITDESK_SETTINGS_PATH is empty, using default: {:?}", config.settings_path);
            }
        } else {
            info!("GITDESK_SETTINGS_PATH not set, using default: {:?}", config.settings_path);
        }

        if let Ok(debug_str) = env::var("GITDESK_DEBUG") {
            config.debug = debug_str.eq_ignore_ascii_case("true") || debug_str == "1";
            info!("Debug logging configured from GITDESK_DEBUG: {}", config.debug);
        }

        config
    }

    /// Config for tests: settings under `settings_path`, bound to an ephemeral port
    pub fn with_settings_path(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            settings_path: settings_path.into(),
            debug: false,
        }
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("GITDESK_BIND_ADDRESS");
            env::remove_var("GITDESK_SETTINGS_PATH");
            env::remove_var("GITDESK_DEBUG");
        }
    }

    fn set_env_var(key: &str, value: &str) {
        unsafe {
            env::set_var(key, value);
        }
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env_vars();
        let config = Config::from_env();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address, "127.0.0.1:8765");
        assert_eq!(config.settings_path, PathBuf::from("data/settings.yaml"));
        assert!(!config.is_debug_enabled());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env_vars();
        set_env_var("GITDESK_BIND_ADDRESS", "0.0.0.0:9000");
        set_env_var("GITDESK_SETTINGS_PATH", "/tmp/gitdesk/settings.yaml");
        set_env_var("GITDESK_DEBUG", "TRUE");

        let config = Config::from_env();

        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.settings_path, PathBuf::from("/tmp/gitdesk/settings.yaml"));
        assert!(config.debug);
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_from_env_empty_values() {
        clear_env_vars();
        set_env_var("GITDESK_BIND_ADDRESS", "  ");
        set_env_var("GITDESK_SETTINGS_PATH", "");
        set_env_var("GITDESK_DEBUG", "no");

        let config = Config::from_env();

        assert_eq!(config, Config::default());
        clear_env_vars();
    }
}
