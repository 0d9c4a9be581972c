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

use const_str::concat;

/// Application name
/// Default value: pvex
pub const APP_NAME: &str = "pvex";

/// Namespace shared by every exported metric name.
pub const METRIC_NAMESPACE: &str = "proxmox";

/// Metric families, one per API subtree.
pub const CLUSTER_METRIC_PREFIX: &str = concat!(METRIC_NAMESPACE, "_cluster");
pub const NODE_METRIC_PREFIX: &str = concat!(METRIC_NAMESPACE, "_node");
pub const STORAGE_METRIC_PREFIX: &str = concat!(METRIC_NAMESPACE, "_storage");
pub const VM_METRIC_PREFIX: &str = concat!(METRIC_NAMESPACE, "_vm");
pub const EXPORTER_METRIC_PREFIX: &str = concat!(METRIC_NAMESPACE, "_exporter");

/// Default log level for the exporter.
/// `none` turns logging off entirely.
pub const DEFAULT_LOG_LEVEL: &str = "none";

/// Default port the exporter listens on.
pub const DEFAULT_PORT: u16 = 9914;

/// Default listen address, loopback only.
/// Example: 127.0.0.1:9914
pub const DEFAULT_LISTEN_ADDRESS: &str = concat!("127.0.0.1:", DEFAULT_PORT);

/// Default Proxmox VE API host.
pub const DEFAULT_PROXMOX_ADDRESS: &str = "127.0.0.1";

/// Default Proxmox VE API port (pveproxy).
pub const DEFAULT_PROXMOX_PORT: u16 = 8006;

/// Path prefix of the Proxmox VE JSON API.
pub const PROXMOX_API_PATH: &str = "/api2/json";

/// Prefix of the API token authorization header value.
pub const PROXMOX_TOKEN_PREFIX: &str = "PVEAPIToken";

/// Skip upstream certificate verification unless told otherwise.
/// Proxmox VE ships with self-signed certificates.
pub const DEFAULT_INSECURE_SKIP_VERIFY: bool = true;

/// Timeout for a single upstream API call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Interval between two topology discoveries, in seconds.
pub const DEFAULT_DISCOVERY_INTERVAL_SECS: u64 = 300;

/// Maximum number of upstream calls in flight within one scrape.
pub const DEFAULT_SCRAPE_CONCURRENCY: usize = 8;

/// Label value used for storage entries from the cluster-wide listing.
pub const CLUSTER_NODE_LABEL: &str = "cluster";

/// Content type of the Prometheus text exposition format.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
