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

//! Client for the Proxmox VE JSON API.
//!
//! Responses are decoded into [`Document`], an untyped tree that keeps
//! numbers as the exact decimal text sent by the server. Consumers decide
//! per field whether a value is a measurement or a label.

mod client;
mod document;
mod error;

pub use client::{ApiClient, ClientConfig, Fetch, api_base_url};
pub use document::Document;
pub use error::{ClientError, Result};
pub use reqwest::StatusCode;
