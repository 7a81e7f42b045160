use std::collections::HashMap;
use std::time::Duration;

use common_database::DatabaseConfig;
use envconfig::Envconfig;
use thiserror::Error;

use crate::env;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration")]
    Env(#[from] envconfig::Error),
}

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "HTTP_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "HTTP_PORT", default = "8080")]
    pub port: u16,

    /// How long in-flight requests get once shutdown starts.
    #[envconfig(from = "SHUTDOWN_TIMEOUT_SECS", default = "5")]
    pub shutdown_timeout_secs: u64,

    #[envconfig(from = "SHUTDOWN_FORCE_ON_SECOND_SIGNAL", default = "true")]
    pub force_on_second_signal: bool,

    #[envconfig(from = "ENABLE_METRICS", default = "false")]
    pub enable_metrics: bool,

    #[envconfig(nested = true)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load from the process environment. Empty variables fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::init_from_hashmap(&env::non_empty_vars())?)
    }

    /// Load from an explicit set of variables, with the same empty-means-unset rule.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = env::non_empty(vars);
        Ok(Self::init_from_hashmap(&vars)?)
    }

    /// Produce a host:port address for binding a TcpListener.
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
