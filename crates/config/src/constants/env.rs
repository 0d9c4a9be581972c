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

//! Environment variable names read at startup.

pub const ENV_CONFIG_FILE: &str = "CONFIG_FILE";
pub const ENV_LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

pub const ENV_PROXMOX_ADDRESS: &str = "PROXMOX_ADDRESS";
pub const ENV_PROXMOX_PORT: &str = "PROXMOX_PORT";
pub const ENV_PROXMOX_USERNAME: &str = "PROXMOX_USERNAME";
pub const ENV_PROXMOX_TOKEN: &str = "PROXMOX_TOKEN";
pub const ENV_PROXMOX_INSECURE_SKIP_VERIFY: &str = "PROXMOX_INSECURE_SKIP_VERIFY";
pub const ENV_PROXMOX_TIMEOUT: &str = "PROXMOX_TIMEOUT";

pub const ENV_DISCOVERY_INTERVAL: &str = "DISCOVERY_INTERVAL";
pub const ENV_SCRAPE_CONCURRENCY: &str = "SCRAPE_CONCURRENCY";
