// Suite Configuration

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Which diagnostic families to run. An absent family is not scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<PingConfig>,
}

/// Ping family: one ping diagnostic per address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingConfig {
    #[serde(default)]
    pub addresses: Vec<String>,

    /// Packets per address. Zero means one.
    #[serde(default)]
    pub count: u32,
}

impl Config {
    pub fn with_ping(addresses: Vec<String>, count: u32) -> Self {
        Self {
            ping: Some(PingConfig { addresses, count }),
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Config = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the child-process argument grammar cannot carry.
    pub fn validate(&self) -> Result<()> {
        if let Some(ping) = &self.ping {
            if let Some(bad) = ping.addresses.iter().find(|a| a.contains(',')) {
                return Err(AppError::Config(format!(
                    "ping address must not contain ',': {}",
                    bad
                )));
            }
        }
        Ok(())
    }
}
