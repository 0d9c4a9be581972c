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

use crate::PrometheusMetric;
use std::collections::HashSet;
use tracing::debug;

type SeriesKey = (String, Vec<(&'static str, String)>);

/// Accumulates the metrics of one scrape, keeping at most one sample per
/// series.
///
/// A series is identified by its name and its full label set; label order
/// does not matter. The first sample of a series wins.
#[derive(Debug, Default)]
pub struct MetricSet {
    metrics: Vec<PrometheusMetric>,
    seen: HashSet<SeriesKey>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `metric` unless its series is already present.
    ///
    /// Returns `false` when the sample was dropped as a duplicate.
    pub fn insert(&mut self, metric: PrometheusMetric) -> bool {
        let mut labels = metric.labels.clone();
        labels.sort();
        if !self.seen.insert((metric.name.clone(), labels)) {
            debug!(metric = %metric.name, labels = ?metric.labels, "dropping duplicate series");
            return false;
        }
        self.metrics.push(metric);
        true
    }

    pub fn into_vec(self) -> Vec<PrometheusMetric> {
        self.metrics
    }
}

impl Extend<PrometheusMetric> for MetricSet {
    fn extend<T: IntoIterator<Item = PrometheusMetric>>(&mut self, iter: T) {
        for metric in iter {
            self.insert(metric);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_series_is_dropped() {
        let mut set = MetricSet::new();
        assert!(set.insert(PrometheusMetric::gauge("m", "h", 1.0).with_label("node", "pve1")));
        assert!(!set.insert(PrometheusMetric::gauge("m", "h", 2.0).with_label("node", "pve1")));
        let metrics = set.into_vec();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].value, 1.0);
    }

    #[test]
    fn test_label_order_does_not_matter() {
        let mut set = MetricSet::new();
        set.insert(PrometheusMetric::gauge("m", "h", 1.0).with_label("a", "1").with_label("b", "2"));
        set.insert(PrometheusMetric::gauge("m", "h", 1.0).with_label("b", "2").with_label("a", "1"));
        assert_eq!(set.into_vec().len(), 1);
    }

    #[test]
    fn test_distinct_label_values_are_distinct_series() {
        let mut set = MetricSet::new();
        set.extend([
            PrometheusMetric::gauge("m", "h", 1.0).with_label("node", "pve1"),
            PrometheusMetric::gauge("m", "h", 1.0).with_label("node", "pve2"),
            PrometheusMetric::gauge("n", "h", 1.0).with_label("node", "pve1"),
        ]);
        assert_eq!(set.into_vec().len(), 3);
    }
}
