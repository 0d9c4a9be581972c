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

use crate::MetricType;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write;

/// A single Prometheus metric with labels and value.
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusMetric {
    /// The metric name (e.g., "proxmox_node_cpu_usage").
    pub name: String,
    /// The type of this metric.
    pub metric_type: MetricType,
    /// Human-readable description shown in Prometheus UI.
    pub help: Cow<'static, str>,
    /// Key-value label pairs for this metric instance. Keys are unique.
    pub labels: Vec<(&'static str, String)>,
    /// The numeric value of this metric.
    pub value: f64,
}

impl PrometheusMetric {
    /// Creates a new metric with the given name, type, help text, and value.
    pub fn new(name: impl Into<String>, metric_type: MetricType, help: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self {
            name: name.into(),
            metric_type,
            help: help.into(),
            labels: Vec::new(),
            value,
        }
    }

    /// Shorthand for a gauge.
    pub fn gauge(name: impl Into<String>, help: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(name, MetricType::Gauge, help, value)
    }

    /// Adds a single label to this metric.
    ///
    /// Setting a label that is already present replaces its value, so label
    /// names stay unique.
    pub fn with_label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.labels.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.labels.push((key, value)),
        }
        self
    }

    /// Adds every label of `labels` in order.
    pub fn with_labels<I, V>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<String>,
    {
        labels.into_iter().fold(self, |metric, (k, v)| metric.with_label(k, v))
    }

    /// Returns the value of the label `key`, if set.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }
}

/// Renders metrics in the Prometheus text exposition format.
///
/// Samples sharing a name are written as one contiguous family, in order of
/// first appearance, with a single `# HELP` and `# TYPE` header taken from
/// the first sample.
pub fn render_metrics(metrics: &[PrometheusMetric]) -> String {
    let mut families: Vec<Vec<&PrometheusMetric>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for metric in metrics {
        match index.get(metric.name.as_str()) {
            Some(&i) => families[i].push(metric),
            None => {
                index.insert(&metric.name, families.len());
                families.push(vec![metric]);
            }
        }
    }

    let mut output = String::new();
    for family in families {
        let head = family[0];
        let _ = writeln!(output, "# HELP {} {}", head.name, escape_help(&head.help));
        let _ = writeln!(output, "# TYPE {} {}", head.name, head.metric_type.as_str());

        for metric in family {
            if metric.labels.is_empty() {
                let _ = writeln!(output, "{} {}", metric.name, format_value(metric.value));
            } else {
                let labels: Vec<String> = metric
                    .labels
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
                    .collect();
                let _ = writeln!(output, "{}{{{}}} {}", metric.name, labels.join(","), format_value(metric.value));
            }
        }
    }

    output
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        String::from(if v.is_sign_positive() { "+Inf" } else { "-Inf" })
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}
