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

use crate::{ClientError, Document, Result};
use async_trait::async_trait;
use pvex_config::{
    APP_NAME, DEFAULT_INSECURE_SKIP_VERIFY, DEFAULT_REQUEST_TIMEOUT_SECS, PROXMOX_API_PATH, PROXMOX_TOKEN_PREFIX,
};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of API documents.
///
/// Implemented by [`ApiClient`]; collectors only depend on this trait.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `path` (relative to the API root, e.g. `/nodes`).
    async fn fetch(&self, path: &str) -> Result<Document>;
}

/// Builds `https://<address>:<port>/api2/json`, bracketing IPv6 literals.
pub fn api_base_url(address: &str, port: u16) -> String {
    let host = if address.contains(':') && !address.starts_with('[') {
        format!("[{address}]")
    } else {
        address.to_string()
    };
    format!("https://{host}:{port}{PROXMOX_API_PATH}")
}

/// Connection settings for [`ApiClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Token owner and token id, e.g. `root@pam!monitoring`.
    pub username: String,
    /// Token secret.
    pub token: String,
    /// Accept any upstream certificate.
    pub insecure_skip_verify: bool,
    /// Timeout for one request, connect included.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(address: &str, port: u16, username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: api_base_url(address, port),
            username: username.into(),
            token: token.into(),
            insecure_skip_verify: DEFAULT_INSECURE_SKIP_VERIFY,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Value of the `Authorization` header: `PVEAPIToken=<username>=<token>`.
    pub fn authorization(&self) -> String {
        format!("{}={}={}", PROXMOX_TOKEN_PREFIX, self.username, self.token)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authenticated client for the Proxmox VE JSON API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    authorization: HeaderValue,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut authorization =
            HeaderValue::from_str(&config.authorization()).map_err(|_| ClientError::InvalidCredentials)?;
        authorization.set_sensitive(true);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;

        if config.insecure_skip_verify {
            warn!(base_url = %config.base_url, "TLS certificate verification is disabled for the Proxmox API");
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    async fn get(&self, path: &str) -> Result<Document> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                path: path.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| ClientError::Transport {
            path: path.to_string(),
            source,
        })?;

        Document::from_slice(&body).map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetch for ApiClient {
    async fn fetch(&self, path: &str) -> Result<Document> {
        let result = self.get(path).await;
        match &result {
            Ok(_) => debug!(path, "Proxmox API request succeeded"),
            Err(err) => warn!(path, error = %err, "Proxmox API request failed"),
        }
        result
    }
}
