//! Settings resolution for ipgeo-batch
//!
//! **Priority:** CLI → ENV → TOML → built-in default, per setting.

use crate::error::{Error, Result};
use crate::fields::FieldSet;
use crate::services::lookup_client::{LookupClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::services::resolution_engine::ResolutionEngine;
use ipgeo_common::config::{env_override, resolve, TomlConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const ENDPOINT_ENV: &str = "IPGEO_ENDPOINT";
pub const POOL_SIZE_ENV: &str = "IPGEO_POOL_SIZE";
pub const TIMEOUT_ENV: &str = "IPGEO_TIMEOUT_SECS";
pub const RATE_LIMIT_ENV: &str = "IPGEO_REQUESTS_PER_MINUTE";

/// Default CSV destination
pub const DEFAULT_OUTPUT: &str = "ip_lookup_results.csv";

/// Default log filter for this tool's crates at `level`
pub fn log_directives(level: &str) -> String {
    format!("ipgeo_batch={0},ipgeo_common={0}", level)
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub pool_size: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub requests_per_minute: Option<u32>,
    pub fields: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub endpoint: String,
    pub pool_size: usize,
    pub timeout: Duration,
    /// 0 disables the client-side throttle
    pub requests_per_minute: u32,
    pub fields: FieldSet,
    pub output: PathBuf,
}

impl LookupSettings {
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let endpoint = resolve(
            cli.endpoint.clone(),
            env_override::<String>(ENDPOINT_ENV)?,
            toml.endpoint.clone(),
            DEFAULT_ENDPOINT.to_string(),
        );

        let pool_size = resolve(
            cli.pool_size,
            env_override(POOL_SIZE_ENV)?,
            toml.pool_size,
            ResolutionEngine::default_pool_size(),
        );
        if pool_size == 0 {
            return Err(invalid("pool size must be at least 1"));
        }

        let timeout_secs = resolve(
            cli.timeout_secs,
            env_override(TIMEOUT_ENV)?,
            toml.timeout_secs,
            DEFAULT_TIMEOUT.as_secs(),
        );
        if timeout_secs == 0 {
            return Err(invalid("timeout must be at least 1 second"));
        }

        let requests_per_minute = resolve(
            cli.requests_per_minute,
            env_override(RATE_LIMIT_ENV)?,
            toml.requests_per_minute,
            0,
        );

        let fields = match cli.fields.as_ref().or(toml.fields.as_ref()) {
            Some(names) => FieldSet::parse(names.iter().map(String::as_str))?,
            None => FieldSet::catalog(),
        };

        let output = cli
            .output
            .clone()
            .or_else(|| toml.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let settings = Self {
            endpoint,
            pool_size,
            timeout: Duration::from_secs(timeout_secs),
            requests_per_minute,
            fields,
            output,
        };

        info!(
            endpoint = %settings.endpoint,
            pool_size = settings.pool_size,
            timeout_secs,
            requests_per_minute = settings.requests_per_minute,
            fields = %settings.fields.query_param(),
            "Settings resolved"
        );
        Ok(settings)
    }

    /// Engine over HTTP configured from these settings
    pub fn build_engine(&self) -> Result<ResolutionEngine> {
        let client = LookupClient::http(&self.endpoint, self.timeout)?
            .with_rate_limit(self.requests_per_minute);
        Ok(ResolutionEngine::new(client, self.pool_size))
    }

    /// Config file content matching these settings
    pub fn to_toml_config(&self) -> TomlConfig {
        TomlConfig {
            endpoint: Some(self.endpoint.clone()),
            pool_size: Some(self.pool_size),
            timeout_secs: Some(self.timeout.as_secs()),
            requests_per_minute: Some(self.requests_per_minute),
            fields: Some(
                self.fields
                    .names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            output: Some(self.output.clone()),
            logging: Default::default(),
        }
    }
}

fn invalid(msg: &str) -> Error {
    Error::Common(ipgeo_common::Error::Config(msg.to_string()))
}
