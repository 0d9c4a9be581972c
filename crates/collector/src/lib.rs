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

//! Metric collection for a Proxmox VE cluster.
//!
//! [`TopologyCache`] holds the discovered node list and is refreshed in the
//! background. [`Collector`] runs one scrape against that snapshot and
//! returns a duplicate-free list of gauges.

mod collect;
mod error;
pub mod flatten;
mod topology;

#[cfg(test)]
mod fake;

pub use collect::Collector;
pub use error::TopologyError;
pub use topology::{ClusterNode, NODES_PATH, TopologyCache, TopologyRefresher};
