//! Server settings

use anyhow::Result;
use serde::Deserialize;

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_address: String,
}

impl ServerConfig {
    /// Load settings from `SCOUTING_*` environment variables
    ///
    /// # Environment Variables
    /// - `SCOUTING_BIND_ADDRESS`: listen address (default: "0.0.0.0:3001")
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .add_source(config::Environment::with_prefix("SCOUTING"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_default() {
        unsafe {
            std::env::remove_var("SCOUTING_BIND_ADDRESS");
        }

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        unsafe {
            std::env::set_var("SCOUTING_BIND_ADDRESS", "127.0.0.1:9000");
        }

        let config = ServerConfig::load().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");

        unsafe {
            std::env::remove_var("SCOUTING_BIND_ADDRESS");
        }
    }
}
