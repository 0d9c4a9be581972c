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

use crate::error::TopologyError;
use arc_swap::ArcSwap;
use pvex_client::{Document, Fetch};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// API path listing the cluster members.
pub const NODES_PATH: &str = "/nodes";

/// A cluster member as reported by node discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNode {
    pub name: String,
    pub id: String,
}

impl ClusterNode {
    /// Reads one `/nodes` entry. Entries without a node name are unusable
    /// for per-node requests and yield `None`.
    fn from_entry(entry: &Document) -> Option<Self> {
        let name = entry.get("node").map(Document::to_text).filter(|name| !name.is_empty())?;
        let id = entry.get("id").map(Document::to_text).unwrap_or_default();
        Some(Self { name, id })
    }
}

/// Latest known list of cluster nodes.
///
/// Readers take a snapshot and never observe a partially updated list. A
/// failed refresh leaves the previous snapshot in place.
pub struct TopologyCache {
    api: Arc<dyn Fetch>,
    nodes: ArcSwap<Vec<ClusterNode>>,
}

impl TopologyCache {
    pub fn new(api: Arc<dyn Fetch>) -> Self {
        Self {
            api,
            nodes: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Current node list, in discovery order.
    pub fn snapshot(&self) -> Arc<Vec<ClusterNode>> {
        self.nodes.load_full()
    }

    /// Fetches the node list and replaces the snapshot.
    ///
    /// Returns the number of nodes now cached.
    pub async fn refresh(&self) -> Result<usize, TopologyError> {
        match self.discover().await {
            Ok(nodes) => {
                let count = nodes.len();
                self.nodes.store(Arc::new(nodes));
                info!(nodes = count, "cluster topology refreshed");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, cached = self.nodes.load().len(), "cluster topology refresh failed, keeping previous node list");
                Err(err)
            }
        }
    }

    async fn discover(&self) -> Result<Vec<ClusterNode>, TopologyError> {
        let response = self.api.fetch(NODES_PATH).await?;
        let entries = response
            .data()
            .and_then(Document::as_list)
            .ok_or(TopologyError::Malformed { path: NODES_PATH })?;

        let nodes: Vec<ClusterNode> = entries.iter().filter_map(ClusterNode::from_entry).collect();
        if nodes.len() < entries.len() {
            debug!(skipped = entries.len() - nodes.len(), "ignored node entries without a name");
        }
        Ok(nodes)
    }

    /// Starts a task refreshing the cache every `period`.
    ///
    /// The first refresh happens one full period after the call. The task
    /// stops when `token` is cancelled or [`TopologyRefresher::shutdown`] is
    /// called.
    pub fn spawn_refresher(self: &Arc<Self>, period: Duration, token: &CancellationToken) -> TopologyRefresher {
        let cache = Arc::clone(self);
        let token = token.child_token();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = task_token.cancelled() => break,
                            // errors are logged by refresh
                            _ = cache.refresh() => {}
                        }
                    }
                }
            }
            debug!("topology refresher stopped");
        });

        TopologyRefresher { token, handle }
    }
}

/// Handle to the background refresh task.
pub struct TopologyRefresher {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl TopologyRefresher {
    /// Stops the task and waits for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "topology refresher did not exit cleanly");
        }
    }
}
