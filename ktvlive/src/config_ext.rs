//! Extension integrating the channel API settings into ktvconfig
//!
//! This module provides the `ChannelsConfigExt` trait which adds channel
//! API settings to `ktvconfig::Config`.
//!
//! # Example
//!
//! ```no_run
//! use ktvconfig::get_config;
//! use ktvlive::{ChannelsClient, ChannelsConfigExt};
//!
//! # #[tokio::main]
//! # async fn main() -> ktvlive::Result<()> {
//! let config = get_config();
//! config.set_channels_api_base_url("http://192.168.1.10:7000/api")?;
//!
//! let client = ChannelsClient::from_config(&config).await?;
//! # Ok(())
//! # }
//! ```

use crate::client::{
    ChannelsClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use anyhow::Result;
use ktvconfig::Config;
use serde_yaml::Value;
use std::time::Duration;

const API_BASE_URL_PATH: &[&str] = &["server", "api_base_url"];
const REQUEST_TIMEOUT_PATH: &[&str] = &["server", "request_timeout_secs"];
const USER_AGENT_PATH: &[&str] = &["server", "user_agent"];

/// Extension trait for the channel API settings
///
/// # Auto-persist of defaults
///
/// Getters write the default value back into the configuration when the key
/// is missing or holds an unusable value.
pub trait ChannelsConfigExt {
    /// Base URL of the channel API
    fn get_channels_api_base_url(&self) -> Result<String>;

    fn set_channels_api_base_url(&self, url: &str) -> Result<()>;

    /// Per-request timeout in seconds
    fn get_channels_request_timeout_secs(&self) -> Result<u64>;

    fn set_channels_request_timeout_secs(&self, secs: u64) -> Result<()>;

    /// User-Agent sent with every request
    fn get_channels_user_agent(&self) -> Result<String>;

    fn set_channels_user_agent(&self, user_agent: &str) -> Result<()>;
}

impl ChannelsConfigExt for Config {
    fn get_channels_api_base_url(&self) -> Result<String> {
        match self.get_value(API_BASE_URL_PATH) {
            Ok(Value::String(url)) if !url.is_empty() => Ok(url),
            _ => {
                self.set_channels_api_base_url(DEFAULT_BASE_URL)?;
                Ok(DEFAULT_BASE_URL.to_string())
            }
        }
    }

    fn set_channels_api_base_url(&self, url: &str) -> Result<()> {
        self.set_value(API_BASE_URL_PATH, Value::String(url.to_string()))
    }

    fn get_channels_request_timeout_secs(&self) -> Result<u64> {
        let configured = match self.get_value(REQUEST_TIMEOUT_PATH) {
            Ok(Value::Number(n)) => n.as_u64().filter(|secs| *secs > 0),
            _ => None,
        };

        match configured {
            Some(secs) => Ok(secs),
            None => {
                self.set_channels_request_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)?;
                Ok(DEFAULT_REQUEST_TIMEOUT_SECS)
            }
        }
    }

    fn set_channels_request_timeout_secs(&self, secs: u64) -> Result<()> {
        self.set_value(REQUEST_TIMEOUT_PATH, Value::Number(secs.into()))
    }

    fn get_channels_user_agent(&self) -> Result<String> {
        match self.get_value(USER_AGENT_PATH) {
            Ok(Value::String(ua)) if !ua.is_empty() => Ok(ua),
            _ => {
                self.set_channels_user_agent(DEFAULT_USER_AGENT)?;
                Ok(DEFAULT_USER_AGENT.to_string())
            }
        }
    }

    fn set_channels_user_agent(&self, user_agent: &str) -> Result<()> {
        self.set_value(USER_AGENT_PATH, Value::String(user_agent.to_string()))
    }
}

impl ChannelsClient {
    /// Build a client from the `server.*` configuration section
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        Self::builder()
            .base_url(config.get_channels_api_base_url()?)
            .timeout(Duration::from_secs(
                config.get_channels_request_timeout_secs()?,
            ))
            .user_agent(config.get_channels_user_agent()?)
            .build()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        Config::load_config(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_from_embedded_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        assert_eq!(config.get_channels_api_base_url().unwrap(), DEFAULT_BASE_URL);
        assert_eq!(
            config.get_channels_request_timeout_secs().unwrap(),
            DEFAULT_REQUEST_TIMEOUT_SECS
        );
        assert_eq!(config.get_channels_user_agent().unwrap(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_timeout_is_reset_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        config
            .set_value(REQUEST_TIMEOUT_PATH, Value::String("soon".into()))
            .unwrap();

        assert_eq!(
            config.get_channels_request_timeout_secs().unwrap(),
            DEFAULT_REQUEST_TIMEOUT_SECS
        );
        assert_eq!(
            config.get_value(REQUEST_TIMEOUT_PATH).unwrap(),
            Value::Number(DEFAULT_REQUEST_TIMEOUT_SECS.into())
        );
    }

    #[tokio::test]
    async fn test_client_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        config
            .set_channels_api_base_url("http://tv.local:7000/api")
            .unwrap();
        config.set_channels_request_timeout_secs(5).unwrap();

        let client = ChannelsClient::from_config(&config).await.unwrap();
        assert_eq!(client.base_url().as_str(), "http://tv.local:7000/api");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }
}
