//! Gateway Configuration Settings
//!
//! Endpoint resolution from the service configuration map and the protocol
//! timing constants shared by the channel sessions.

use std::time::Duration;

use crate::application::ConfigMap;
use crate::domain::Channel;

/// Configuration key holding the venue host address.
pub const KEY_IP: &str = "Max:Active:Ip";

/// Configuration key holding a channel's TCP port.
#[must_use]
pub fn port_key(channel: Channel) -> String {
    format!("Max:Active:Port:{}", channel.number())
}

/// Resolve a channel's `host:port` endpoint from the configuration map.
///
/// # Errors
///
/// Fails when the address or port key is missing, or the port is not a
/// valid TCP port number. Sessions log the error and retry after the
/// reconnect backoff, so a partially loaded configuration degrades to
/// connect failures on the affected channel.
pub fn endpoint(config: &ConfigMap, channel: Channel) -> Result<String, SettingsError> {
    let ip = config
        .get(KEY_IP)
        .ok_or_else(|| SettingsError::MissingKey(KEY_IP.to_owned()))?;

    let key = port_key(channel);
    let port = config
        .get(&key)
        .ok_or_else(|| SettingsError::MissingKey(key.clone()))?;
    let port: u16 = port.parse().map_err(|_| SettingsError::InvalidPort {
        key,
        value: port.clone(),
    })?;

    Ok(format!("{ip}:{port}"))
}

/// Protocol timing constants for a channel session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    /// Poll probe interval for channels 1 and 3.
    pub poll_interval: Duration,
    /// Inbound staleness timeout for channel 2.
    pub beat_timeout: Duration,
    /// Fixed backoff between reconnect attempts.
    pub retry_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            beat_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(3),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required configuration key was not loaded.
    #[error("missing configuration key: {0}")]
    MissingKey(String),
    /// A port value failed to parse.
    #[error("configuration key {key} is not a port number: {value:?}")]
    InvalidPort {
        /// The offending key.
        key: String,
        /// The raw configured value.
        value: String,
    },
}
