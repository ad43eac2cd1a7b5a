//! Service configuration

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

/// Runtime configuration for the pairing device service
///
/// Every field can be overridden with a `PAIRING_`-prefixed environment
/// variable, e.g. `PAIRING_LISTEN_ADDR=127.0.0.1:7400`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Address the bus ingress listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Populate the in-memory store with a few records (development only)
    #[serde(default)]
    pub seed_demo_records: bool,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7400))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            seed_demo_records: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PAIRING"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching the process environment must not interleave
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const LISTEN_ADDR: &str = "PAIRING_LISTEN_ADDR";
    const SEED_DEMO: &str = "PAIRING_SEED_DEMO_RECORDS";

    fn clear_env() {
        std::env::remove_var(LISTEN_ADDR);
        std::env::remove_var(SEED_DEMO);
    }

    #[test]
    fn test_default_config() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.listen_addr.port(), 7400);
        assert!(!config.seed_demo_records);
    }

    #[test]
    fn test_custom_config() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(LISTEN_ADDR, "127.0.0.1:9100");
        std::env::set_var(SEED_DEMO, "true");

        let config = ServiceConfig::from_env();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
        assert!(config.seed_demo_records);
    }

    #[test]
    fn test_invalid_listen_addr() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(LISTEN_ADDR, "nowhere");

        let result = ServiceConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
