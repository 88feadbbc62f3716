//! Server settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use address_core::TrainingConfig;
use anyhow::Context;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// `ADDRESS_WEB_ADDR`
    pub addr: SocketAddr,
    /// `ADDRESS_REFERENCE_CSV`: postcode/town table; the built-in sample when unset.
    pub reference_csv: Option<PathBuf>,
    /// `ADDRESS_TRAINING_ITERATIONS`
    pub training: TrainingConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("ADDRESS_WEB_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("invalid ADDRESS_WEB_ADDR")?;

        let reference_csv = lookup("ADDRESS_REFERENCE_CSV")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let mut training = TrainingConfig::default();
        if let Some(raw) = lookup("ADDRESS_TRAINING_ITERATIONS") {
            training.iterations = raw
                .trim()
                .parse()
                .context("invalid ADDRESS_TRAINING_ITERATIONS")?;
        }

        Ok(Self {
            addr,
            reference_csv,
            training,
        })
    }
}
