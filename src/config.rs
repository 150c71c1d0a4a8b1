//! Relay server configuration, read from the environment.

use std::net::SocketAddr;

use crate::error::ConfigError;

pub const ADDR_VAR: &str = "COLLAB_RGA_ADDR";
pub const CHANNEL_CAPACITY_VAR: &str = "COLLAB_RGA_CHANNEL_CAPACITY";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);
const DEFAULT_CHANNEL_CAPACITY: usize = 100;
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for the relay server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the HTTP/websocket listener binds to
    pub bind_addr: SocketAddr,
    /// Capacity of each document's command queue and broadcast channel
    pub channel_capacity: usize,
    /// `tracing-subscriber` filter directive
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(DEFAULT_ADDR),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Unset
    /// variables fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(value) = lookup(ADDR_VAR) {
            config.bind_addr = value
                .parse()
                .map_err(|source| ConfigError::Address {
                    value: value.clone(),
                    source,
                })?;
        }

        if let Some(value) = lookup(CHANNEL_CAPACITY_VAR) {
            config.channel_capacity = match value.parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => return Err(ConfigError::ChannelCapacity(value)),
            };
        }

        if let Some(value) = lookup(LOG_FILTER_VAR) {
            config.log_filter = value;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.channel_capacity, 100);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ADDR_VAR, "0.0.0.0:8080"),
            (CHANNEL_CAPACITY_VAR, "16"),
            (LOG_FILTER_VAR, "collab_rga=debug"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.log_filter, "collab_rga=debug");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[(ADDR_VAR, "nowhere")])),
            Err(ConfigError::Address { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[(CHANNEL_CAPACITY_VAR, "0")])),
            Err(ConfigError::ChannelCapacity(_))
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[(CHANNEL_CAPACITY_VAR, "lots")])),
            Err(ConfigError::ChannelCapacity(_))
        ));
    }
}
