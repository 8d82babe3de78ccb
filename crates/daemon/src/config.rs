//! Environment-driven daemon configuration.

use std::time::Duration;

use anyhow::Context;

/// Everything the daemon needs to start, read once at boot.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Sleep between purchase cycles.
    pub cycle_interval: Duration,
    pub database_url: String,
    pub gateway_url: String,
    pub gateway_token: String,
}

impl DaemonConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let cycle_interval = match std::env::var("GIFTFLOW_CYCLE_INTERVAL_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .context("GIFTFLOW_CYCLE_INTERVAL_SECS must be a whole number of seconds")?,
            ),
            Err(_) => Duration::from_secs(300),
        };

        Ok(Self {
            cycle_interval,
            database_url: require("DATABASE_URL")?,
            gateway_url: require("GIFTFLOW_GATEWAY_URL")?,
            gateway_token: require("GIFTFLOW_GATEWAY_TOKEN")?,
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}
