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

use crate::flatten::{InfoLabel, Nested, Unit, info_records, nested_fields, numeric_fields};
use crate::topology::{ClusterNode, TopologyCache};
use futures::future::join_all;
use pvex_client::{Document, Fetch};
use pvex_config::{
    CLUSTER_METRIC_PREFIX, CLUSTER_NODE_LABEL, EXPORTER_METRIC_PREFIX, NODE_METRIC_PREFIX, STORAGE_METRIC_PREFIX,
    VM_METRIC_PREFIX,
};
use pvex_metrics::{MetricSet, PrometheusMetric, join_metric_name};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

const CLUSTER_HELP: &str = "Proxmox VE cluster status field";
const NODE_HELP: &str = "Proxmox VE node status field";
const NODE_CPU_USAGE_HELP: &str = "Proxmox VE node CPU usage";
const STORAGE_HELP: &str = "Proxmox VE storage status field";
const STORAGE_INFO_HELP: &str = "Proxmox VE storage definition";
const STORAGE_TYPE_COUNT_HELP: &str = "Number of configured storages per type";
const VM_HELP: &str = "Proxmox VE QEMU guest status field";
const VM_UP_HELP: &str = "Whether the QEMU guest is running";
const SCRAPE_DURATION_HELP: &str = "Duration of the last scrape of the Proxmox VE API";
const FETCH_ERRORS_HELP: &str = "Failed Proxmox VE API requests during the last scrape";
const TOPOLOGY_NODES_HELP: &str = "Cluster nodes known to the exporter";

const NODE_NESTED: &[Nested] = &[
    Nested::new("memory", Unit::Bytes),
    Nested::new("swap", Unit::Bytes),
    Nested::new("rootfs", Unit::Bytes),
    Nested::new("cpuinfo", Unit::None),
];

const STORAGE_INFO_FIELDS: &[InfoLabel] = &[
    InfoLabel::text("storage", "storage"),
    InfoLabel::text("type", "type"),
    InfoLabel::flag("shared", "shared"),
];

const STORAGE_GROUP_FIELD: &str = "type";

/// Runs scrapes against the nodes in a [`TopologyCache`].
pub struct Collector {
    api: Arc<dyn Fetch>,
    topology: Arc<TopologyCache>,
    concurrency: usize,
}

impl Collector {
    /// `concurrency` bounds the API calls in flight within one scrape.
    pub fn new(api: Arc<dyn Fetch>, topology: Arc<TopologyCache>, concurrency: usize) -> Self {
        Self {
            api,
            topology,
            concurrency: concurrency.max(1),
        }
    }

    /// Collects one set of observations.
    ///
    /// Never fails: a failed API call drops the metrics of its subtree and
    /// is counted in `proxmox_exporter_fetch_errors`.
    #[instrument(level = "debug", skip(self))]
    pub async fn collect(&self) -> Vec<PrometheusMetric> {
        let started = Instant::now();
        let nodes = self.topology.snapshot();
        let scrape = Scrape::new(self.api.as_ref(), self.concurrency);

        let (cluster, node_status, (storage_info, type_counts), node_storage, vms) = futures::join!(
            scrape.cluster_status(),
            scrape.each_node(&nodes, |node| scrape.node_status(node)),
            scrape.cluster_storage(),
            scrape.each_node(&nodes, |node| scrape.node_storage(node)),
            scrape.each_node(&nodes, |node| scrape.node_vms(node)),
        );

        let mut set = MetricSet::new();
        set.extend(cluster);
        set.extend(node_status);
        set.extend(storage_info);
        set.extend(node_storage);
        set.extend(type_counts);
        set.extend(vms);

        let failures = scrape.failures();
        let elapsed = started.elapsed();
        set.insert(self_metric("topology_nodes", TOPOLOGY_NODES_HELP, nodes.len() as f64));
        set.insert(self_metric("fetch_errors", FETCH_ERRORS_HELP, failures as f64));
        set.insert(self_metric("scrape_duration_seconds", SCRAPE_DURATION_HELP, elapsed.as_secs_f64()));

        let metrics = set.into_vec();
        debug!(
            nodes = nodes.len(),
            series = metrics.len(),
            failures,
            elapsed_ms = elapsed.as_millis() as u64,
            "scrape finished"
        );
        metrics
    }
}

fn self_metric(name: &str, help: &'static str, value: f64) -> PrometheusMetric {
    PrometheusMetric::gauge(join_metric_name(&[EXPORTER_METRIC_PREFIX, name]), help, value)
}

/// State of one scrape.
struct Scrape<'a> {
    api: &'a dyn Fetch,
    permits: Semaphore,
    failures: AtomicUsize,
}

impl<'a> Scrape<'a> {
    fn new(api: &'a dyn Fetch, concurrency: usize) -> Self {
        Self {
            api,
            permits: Semaphore::new(concurrency),
            failures: AtomicUsize::new(0),
        }
    }

    fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Fetches `path` and unwraps the response envelope. Failures are
    /// logged by the client and counted here.
    async fn fetch_data(&self, path: &str) -> Option<Document> {
        let _permit = self.permits.acquire().await.ok()?;
        match self.api.fetch(path).await {
            Ok(response) => response.into_data(),
            Err(_) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn each_node<'n, F, Fut>(&self, nodes: &'n [ClusterNode], per_node: F) -> Vec<PrometheusMetric>
    where
        F: Fn(&'n ClusterNode) -> Fut,
        Fut: Future<Output = Vec<PrometheusMetric>>,
    {
        join_all(nodes.iter().map(per_node)).await.into_iter().flatten().collect()
    }

    async fn cluster_status(&self) -> Vec<PrometheusMetric> {
        let Some(data) = self.fetch_data("/cluster/status").await else {
            return Vec::new();
        };
        data.as_list()
            .unwrap_or_default()
            .iter()
            .flat_map(|entry| {
                let labels = [("type", text_of(entry, "type")), ("name", text_of(entry, "name"))];
                numeric_fields(entry, CLUSTER_METRIC_PREFIX, CLUSTER_HELP, &labels)
            })
            .collect()
    }

    async fn node_status(&self, node: &ClusterNode) -> Vec<PrometheusMetric> {
        let Some(status) = self.fetch_data(&format!("/nodes/{}/status", node.name)).await else {
            return Vec::new();
        };
        let labels = [("node", node.name.clone())];

        let mut metrics = numeric_fields(&status, NODE_METRIC_PREFIX, NODE_HELP, &labels);
        for nested in NODE_NESTED {
            metrics.extend(nested_fields(&status, NODE_METRIC_PREFIX, *nested, NODE_HELP, &labels));
        }
        if let Some(cpu) = status.get("cpu").and_then(Document::as_f64) {
            metrics.push(
                PrometheusMetric::gauge(join_metric_name(&[NODE_METRIC_PREFIX, "cpu_usage"]), NODE_CPU_USAGE_HELP, cpu)
                    .with_labels(labels),
            );
        }
        metrics
    }

    /// Cluster-wide storage definitions and the per-type counts.
    async fn cluster_storage(&self) -> (Vec<PrometheusMetric>, Vec<PrometheusMetric>) {
        let Some(data) = self.fetch_data("/storage").await else {
            return (Vec::new(), Vec::new());
        };
        let labels = [("node", CLUSTER_NODE_LABEL.to_string())];
        let (infos, counter) = info_records(
            data.as_list().unwrap_or_default(),
            STORAGE_METRIC_PREFIX,
            STORAGE_INFO_HELP,
            STORAGE_INFO_FIELDS,
            &labels,
            STORAGE_GROUP_FIELD,
        );
        (infos, counter.into_metrics(STORAGE_METRIC_PREFIX, STORAGE_TYPE_COUNT_HELP))
    }

    async fn node_storage(&self, node: &ClusterNode) -> Vec<PrometheusMetric> {
        let Some(data) = self.fetch_data(&format!("/nodes/{}/storage", node.name)).await else {
            return Vec::new();
        };
        data.as_list()
            .unwrap_or_default()
            .iter()
            .flat_map(|entry| {
                let labels = [("storage", text_of(entry, "storage")), ("node", node.name.clone())];
                numeric_fields(entry, STORAGE_METRIC_PREFIX, STORAGE_HELP, &labels)
            })
            .collect()
    }

    async fn node_vms(&self, node: &ClusterNode) -> Vec<PrometheusMetric> {
        let Some(data) = self.fetch_data(&format!("/nodes/{}/qemu", node.name)).await else {
            return Vec::new();
        };
        let guests = data.as_list().unwrap_or_default().iter().filter_map(|entry| {
            let vmid = entry.get("vmid").map(Document::to_text).filter(|id| !id.is_empty())?;
            Some((vmid, text_of(entry, "name")))
        });
        join_all(guests.map(|(vmid, name)| self.vm_status(node, vmid, name)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn vm_status(&self, node: &ClusterNode, vmid: String, name: String) -> Vec<PrometheusMetric> {
        let path = format!("/nodes/{}/qemu/{}/status/current", node.name, vmid);
        let Some(status) = self.fetch_data(&path).await else {
            return Vec::new();
        };
        let labels = [("vmid", vmid), ("vmname", name), ("proxmox_node", node.name.clone())];

        let mut metrics = numeric_fields(&status, VM_METRIC_PREFIX, VM_HELP, &labels);
        if let Some(state) = status.get("status").and_then(Document::as_str) {
            let up = if state == "running" { 1.0 } else { 0.0 };
            metrics.push(PrometheusMetric::gauge(join_metric_name(&[VM_METRIC_PREFIX, "up"]), VM_UP_HELP, up).with_labels(labels));
        }
        metrics
    }
}

fn text_of(entry: &Document, key: &str) -> String {
    entry.get(key).map(Document::to_text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeApi;
    use crate::topology::NODES_PATH;
    use std::collections::HashSet;
    use std::time::Duration;

    const NODES: &str = r#"{"data":[{"node":"pve1","id":"node/pve1"},{"node":"pve2","id":"node/pve2"}]}"#;

    fn healthy_cluster() -> FakeApi {
        FakeApi::new()
            .with(NODES_PATH, NODES)
            .with(
                "/cluster/status",
                r#"{"data":[{"type":"cluster","name":"lab","nodes":2,"quorate":1,"version":4},
                            {"type":"node","name":"pve1","online":1,"nodeid":1,"ip":"10.0.0.1"}]}"#,
            )
            .with(
                "/nodes/pve1/status",
                r#"{"data":{"uptime":3600,"cpu":"0.05","kversion":"Linux",
                            "memory":{"total":8589934592,"used":4294967296,"free":4294967296},
                            "swap":{"total":0,"used":0},"cpuinfo":{"cpus":8,"model":"Xeon"}}}"#,
            )
            .with("/nodes/pve2/status", r#"{"data":{"uptime":60,"cpu":0.5}}"#)
            .with(
                "/storage",
                r#"{"data":[{"storage":"nfs1","type":"nfs","shared":1},
                            {"storage":"local","type":"dir","shared":0},
                            {"storage":"backup","type":"dir"}]}"#,
            )
            .with(
                "/nodes/pve1/storage",
                r#"{"data":[{"storage":"local","total":100,"used":40,"avail":60,"active":1,"content":"iso"}]}"#,
            )
            .with("/nodes/pve2/storage", r#"{"data":[{"storage":"local","total":200,"used":10}]}"#)
            .with("/nodes/pve1/qemu", r#"{"data":[{"vmid":100,"name":"web1","status":"running"}]}"#)
            .with(
                "/nodes/pve1/qemu/100/status/current",
                r#"{"data":{"vmid":100,"name":"web1","cpu":"0.05","status":"running","maxmem":2147483648}}"#,
            )
            .with("/nodes/pve2/qemu", r#"{"data":[{"vmid":200,"name":"db1"}]}"#)
            .with(
                "/nodes/pve2/qemu/200/status/current",
                r#"{"data":{"vmid":200,"name":"db1","cpu":0,"status":"stopped"}}"#,
            )
    }

    async fn scrape(api: FakeApi) -> Vec<PrometheusMetric> {
        let api: Arc<dyn Fetch> = Arc::new(api);
        let topology = Arc::new(TopologyCache::new(api.clone()));
        topology.refresh().await.unwrap();
        Collector::new(api, topology, 4).collect().await
    }

    fn find<'m>(metrics: &'m [PrometheusMetric], name: &str, labels: &[(&str, &str)]) -> Option<&'m PrometheusMetric> {
        metrics
            .iter()
            .find(|m| m.name == name && labels.iter().all(|(k, v)| m.label(k) == Some(*v)))
    }

    #[tokio::test]
    async fn test_vm_status_fields() {
        let metrics = scrape(healthy_cluster()).await;

        let cpu = find(&metrics, "proxmox_vm_cpu", &[("vmid", "100")]).unwrap();
        assert_eq!(cpu.value, 0.05);
        assert_eq!(
            cpu.labels,
            vec![
                ("vmid", "100".to_string()),
                ("vmname", "web1".to_string()),
                ("proxmox_node", "pve1".to_string()),
            ]
        );
        assert!(metrics.iter().all(|m| m.name != "proxmox_vm_status" && m.name != "proxmox_vm_name"));

        assert_eq!(find(&metrics, "proxmox_vm_up", &[("vmid", "100")]).unwrap().value, 1.0);
        assert_eq!(find(&metrics, "proxmox_vm_up", &[("vmid", "200")]).unwrap().value, 0.0);
        assert_eq!(find(&metrics, "proxmox_vm_maxmem", &[("vmid", "100")]).unwrap().value, 2147483648.0);
    }

    #[tokio::test]
    async fn test_node_status_fields() {
        let metrics = scrape(healthy_cluster()).await;
        let pve1 = [("node", "pve1")];

        assert_eq!(find(&metrics, "proxmox_node_uptime", &pve1).unwrap().value, 3600.0);
        assert_eq!(find(&metrics, "proxmox_node_cpu", &pve1).unwrap().value, 0.05);
        assert_eq!(find(&metrics, "proxmox_node_cpu_usage", &pve1).unwrap().value, 0.05);
        assert_eq!(find(&metrics, "proxmox_node_memory_total_bytes", &pve1).unwrap().value, 8589934592.0);
        assert!(find(&metrics, "proxmox_node_swap_total_bytes", &pve1).is_some());
        assert_eq!(find(&metrics, "proxmox_node_cpuinfo_cpus", &pve1).unwrap().value, 8.0);
        assert!(find(&metrics, "proxmox_node_kversion", &pve1).is_none());
        assert!(find(&metrics, "proxmox_node_cpuinfo_model", &pve1).is_none());

        assert_eq!(find(&metrics, "proxmox_node_cpu_usage", &[("node", "pve2")]).unwrap().value, 0.5);
    }

    #[tokio::test]
    async fn test_storage_metrics() {
        let metrics = scrape(healthy_cluster()).await;

        let dir = find(&metrics, "proxmox_storage_type_count", &[("type", "dir")]).unwrap();
        assert_eq!(dir.value, 2.0);
        let nfs = find(&metrics, "proxmox_storage_type_count", &[("type", "nfs")]).unwrap();
        assert_eq!(nfs.value, 1.0);

        let info = find(&metrics, "proxmox_storage_info", &[("storage", "nfs1")]).unwrap();
        assert_eq!(info.label("shared"), Some("1"));
        assert_eq!(info.label("node"), Some(CLUSTER_NODE_LABEL));
        let backup = find(&metrics, "proxmox_storage_info", &[("storage", "backup")]).unwrap();
        assert_eq!(backup.label("shared"), Some("0"));

        let used = find(&metrics, "proxmox_storage_used", &[("storage", "local"), ("node", "pve1")]).unwrap();
        assert_eq!(used.value, 40.0);
        let used = find(&metrics, "proxmox_storage_used", &[("storage", "local"), ("node", "pve2")]).unwrap();
        assert_eq!(used.value, 10.0);
        assert!(find(&metrics, "proxmox_storage_content", &[]).is_none());
    }

    #[tokio::test]
    async fn test_cluster_status_fields() {
        let metrics = scrape(healthy_cluster()).await;

        let quorate = find(&metrics, "proxmox_cluster_quorate", &[("type", "cluster"), ("name", "lab")]).unwrap();
        assert_eq!(quorate.value, 1.0);
        let online = find(&metrics, "proxmox_cluster_online", &[("type", "node"), ("name", "pve1")]).unwrap();
        assert_eq!(online.value, 1.0);
        assert!(find(&metrics, "proxmox_cluster_ip", &[]).is_none());
    }

    #[tokio::test]
    async fn test_failed_guest_listing_only_drops_guests() {
        let metrics = scrape(healthy_cluster().failing("/nodes/pve1/qemu")).await;

        assert!(find(&metrics, "proxmox_node_uptime", &[("node", "pve1")]).is_some());
        assert!(find(&metrics, "proxmox_storage_used", &[("node", "pve1")]).is_some());
        assert!(
            !metrics
                .iter()
                .any(|m| m.name.starts_with("proxmox_vm_") && m.label("proxmox_node") == Some("pve1"))
        );
        assert!(find(&metrics, "proxmox_vm_cpu", &[("proxmox_node", "pve2")]).is_some());
        assert_eq!(find(&metrics, "proxmox_exporter_fetch_errors", &[]).unwrap().value, 1.0);
    }

    #[tokio::test]
    async fn test_missing_endpoints_do_not_abort_scrape() {
        let api = FakeApi::new().with(NODES_PATH, NODES);
        let metrics = scrape(api).await;

        let names: HashSet<_> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            HashSet::from([
                "proxmox_exporter_topology_nodes",
                "proxmox_exporter_fetch_errors",
                "proxmox_exporter_scrape_duration_seconds",
            ])
        );
        // /cluster/status, /storage, then status, storage and qemu for both nodes
        assert_eq!(find(&metrics, "proxmox_exporter_fetch_errors", &[]).unwrap().value, 8.0);
        assert_eq!(find(&metrics, "proxmox_exporter_topology_nodes", &[]).unwrap().value, 2.0);
    }

    #[tokio::test]
    async fn test_no_duplicate_series() {
        let api = healthy_cluster().with(
            "/storage",
            r#"{"data":[{"storage":"local","type":"dir","shared":0},{"storage":"local","type":"dir","shared":0}]}"#,
        );
        let metrics = scrape(api).await;

        let mut seen = HashSet::new();
        for metric in &metrics {
            let mut labels = metric.labels.clone();
            labels.sort();
            assert!(seen.insert((metric.name.clone(), labels)), "duplicate series {}", metric.name);
        }
        let infos = metrics.iter().filter(|m| m.name == "proxmox_storage_info").count();
        assert_eq!(infos, 1);
    }

    #[tokio::test]
    async fn test_empty_topology_scrapes_cluster_endpoints_only() {
        let api = Arc::new(healthy_cluster());
        let fetch: Arc<dyn Fetch> = api.clone();
        let topology = Arc::new(TopologyCache::new(fetch.clone()));
        let metrics = Collector::new(fetch, topology, 1).collect().await;

        assert_eq!(api.calls(NODES_PATH), 0);
        assert_eq!(api.calls("/nodes/pve1/status"), 0);
        assert!(find(&metrics, "proxmox_storage_type_count", &[("type", "dir")]).is_some());
        assert_eq!(find(&metrics, "proxmox_exporter_topology_nodes", &[]).unwrap().value, 0.0);
    }

    #[tokio::test]
    async fn test_scrape_respects_concurrency_limit() {
        let mut api = FakeApi::new()
            .with(
                NODES_PATH,
                r#"{"data":[{"node":"pve1"},{"node":"pve2"},{"node":"pve3"},{"node":"pve4"}]}"#,
            )
            .with_latency(Duration::from_millis(5));
        for node in ["pve1", "pve2", "pve3", "pve4"] {
            let guests: Vec<String> = (0..20).map(|i| format!(r#"{{"vmid":{i},"name":"vm{i}"}}"#)).collect();
            api = api.with(&format!("/nodes/{node}/qemu"), &format!(r#"{{"data":[{}]}}"#, guests.join(",")));
            for i in 0..20 {
                api = api.with(
                    &format!("/nodes/{node}/qemu/{i}/status/current"),
                    r#"{"data":{"cpu":0.1,"status":"running"}}"#,
                );
            }
        }
        let api = Arc::new(api);
        let fetch: Arc<dyn Fetch> = api.clone();
        let topology = Arc::new(TopologyCache::new(fetch.clone()));
        topology.refresh().await.unwrap();

        let metrics = Collector::new(fetch, topology, 3).collect().await;

        assert_eq!(api.calls("/nodes/pve4/qemu/19/status/current"), 1);
        assert_eq!(metrics.iter().filter(|m| m.name == "proxmox_vm_up").count(), 80);
        assert!(api.peak_in_flight() <= 3, "peak in flight {}", api.peak_in_flight());
        assert!(api.peak_in_flight() > 1, "requests never overlapped");
    }
}
