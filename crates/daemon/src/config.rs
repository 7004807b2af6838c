//! Daemon configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `JUMPQUEUE_*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "JUMPQUEUE";
const CONFIG_PATH_VAR: &str = "JUMPQUEUE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "~/.jumpqueue/config.toml";
const DEFAULT_DB_PATH: &str = "~/.jumpqueue/jumpqueue.db";

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

impl DaemonConfig {
    /// Load from `JUMPQUEUE_CONFIG` (or the default path) and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(Path::new(&expand(&path)), None)
    }

    /// `env` replaces the process environment when given
    pub fn load_from(file: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
        let settings = Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("rpc_host", "127.0.0.1")?
            .set_default("rpc_port", 9527_i64)?
            .set_default("max_connections", 10_i64)?
            .set_default("busy_timeout_secs", 5_i64)?
            .add_source(File::from(file.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read configuration ({})", file.display()))?;

        let mut cfg: DaemonConfig = settings
            .try_deserialize()
            .context("Invalid daemon configuration")?;
        cfg.db_path = expand(&cfg.db_path);
        Ok(cfg)
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

fn expand(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}
