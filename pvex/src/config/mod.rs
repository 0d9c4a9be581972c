// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{ArgAction, Parser};
use pvex_client::ClientConfig;
use pvex_config::{
    APP_NAME, DEFAULT_DISCOVERY_INTERVAL_SECS, DEFAULT_INSECURE_SKIP_VERIFY, DEFAULT_LISTEN_ADDRESS, DEFAULT_LOG_LEVEL,
    DEFAULT_PROXMOX_ADDRESS, DEFAULT_PROXMOX_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SCRAPE_CONCURRENCY, ENV_CONFIG_FILE,
    ENV_DISCOVERY_INTERVAL, ENV_LISTEN_ADDRESS, ENV_LOG_LEVEL, ENV_PROXMOX_ADDRESS, ENV_PROXMOX_INSECURE_SKIP_VERIFY,
    ENV_PROXMOX_PORT, ENV_PROXMOX_TIMEOUT, ENV_PROXMOX_TOKEN, ENV_PROXMOX_USERNAME, ENV_SCRAPE_CONCURRENCY,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;


#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about = "Prometheus exporter for Proxmox VE")]
pub struct Opt {
    /// YAML file with Proxmox VE connection settings
    #[arg(long = "config.file", env = ENV_CONFIG_FILE)]
    pub config_file: Option<PathBuf>,

    /// Address to listen on for HTTP requests
    #[arg(long = "listen.address", env = ENV_LISTEN_ADDRESS, default_value = DEFAULT_LISTEN_ADDRESS)]
    pub listen_address: String,

    /// Log level (trace, debug, info, warn, error or none)
    #[arg(long = "log.level", env = ENV_LOG_LEVEL, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Proxmox VE API host [default: 127.0.0.1]
    #[arg(long = "proxmox.address", env = ENV_PROXMOX_ADDRESS)]
    pub proxmox_address: Option<String>,

    /// Proxmox VE API port [default: 8006]
    #[arg(long = "proxmox.port", env = ENV_PROXMOX_PORT)]
    pub proxmox_port: Option<u16>,

    /// API token owner and id, e.g. root@pam!monitoring
    #[arg(long = "proxmox.username", env = ENV_PROXMOX_USERNAME)]
    pub proxmox_username: Option<String>,

    /// API token secret
    #[arg(long = "proxmox.token", env = ENV_PROXMOX_TOKEN, hide_env_values = true)]
    pub proxmox_token: Option<String>,

    /// Accept any certificate presented by the Proxmox VE API
    #[arg(
        long = "proxmox.insecure-skip-verify",
        env = ENV_PROXMOX_INSECURE_SKIP_VERIFY,
        default_value_t = DEFAULT_INSECURE_SKIP_VERIFY,
        action = ArgAction::Set
    )]
    pub insecure_skip_verify: bool,

    /// Timeout of one Proxmox VE API request, in seconds
    #[arg(long = "proxmox.timeout", env = ENV_PROXMOX_TIMEOUT, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Seconds between two node discoveries
    #[arg(long = "discovery.interval", env = ENV_DISCOVERY_INTERVAL, default_value_t = DEFAULT_DISCOVERY_INTERVAL_SECS)]
    pub discovery_interval_secs: u64,

    /// Maximum concurrent Proxmox VE API requests per scrape
    #[arg(long = "scrape.concurrency", env = ENV_SCRAPE_CONCURRENCY, default_value_t = DEFAULT_SCRAPE_CONCURRENCY)]
    pub scrape_concurrency: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing Proxmox VE {what}: set {flag} or {env}")]
    MissingCredential {
        what: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("failed to load config file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("{flag} must be greater than zero")]
    Zero { flag: &'static str },
}

/// Settings accepted from the YAML config file. Flags and environment
/// variables take precedence over every key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    proxmox_address: Option<String>,
    proxmox_port: Option<u16>,
    proxmox_username: Option<String>,
    proxmox_token: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        ::config::Config::builder()
            .add_source(::config::File::from(path).format(::config::FileFormat::Yaml).required(true))
            .build()
            .and_then(|loaded| loaded.try_deserialize())
            .map_err(|source| ConfigError::File {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: String,
    pub log_level: String,
    pub client: ClientConfig,
    pub discovery_interval: Duration,
    pub scrape_concurrency: usize,
}

impl Config {
    /// Merges flags, environment and the optional config file, then
    /// validates the result.
    pub fn from_opt(opt: Opt) -> Result<Self, ConfigError> {
        let file = match &opt.config_file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let username = required(
            opt.proxmox_username.or(file.proxmox_username),
            ConfigError::MissingCredential {
                what: "username",
                flag: "--proxmox.username",
                env: ENV_PROXMOX_USERNAME,
            },
        )?;
        let token = required(
            opt.proxmox_token.or(file.proxmox_token),
            ConfigError::MissingCredential {
                what: "token",
                flag: "--proxmox.token",
                env: ENV_PROXMOX_TOKEN,
            },
        )?;

        let address = opt
            .proxmox_address
            .or(file.proxmox_address)
            .unwrap_or_else(|| DEFAULT_PROXMOX_ADDRESS.to_string());
        let port = opt.proxmox_port.or(file.proxmox_port).unwrap_or(DEFAULT_PROXMOX_PORT);

        let mut client = ClientConfig::new(&address, port, username, token);
        client.insecure_skip_verify = opt.insecure_skip_verify;
        client.timeout = Duration::from_secs(non_zero("--proxmox.timeout", opt.timeout_secs)?);

        Ok(Self {
            listen_address: opt.listen_address,
            log_level: opt.log_level,
            client,
            discovery_interval: Duration::from_secs(non_zero("--discovery.interval", opt.discovery_interval_secs)?),
            scrape_concurrency: non_zero("--scrape.concurrency", opt.scrape_concurrency)?,
        })
    }
}

fn required(value: Option<String>, missing: ConfigError) -> Result<String, ConfigError> {
    value.filter(|v| !v.is_empty()).ok_or(missing)
}

fn non_zero<T: Default + PartialEq>(flag: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Zero { flag });
    }
    Ok(value)
}
