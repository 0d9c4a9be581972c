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

//! Rules turning API documents into gauges.
//!
//! Every rule is a pure function of its input document. Metric names are
//! built from a fixed prefix and the document's own keys, so new numeric
//! fields added by Proxmox VE show up without code changes.

use pvex_client::Document;
use pvex_metrics::{PrometheusMetric, join_metric_name};
use std::collections::BTreeMap;

/// Unit suffix appended to names produced by [`nested_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    None,
    Bytes,
}

impl Unit {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Bytes => "bytes",
        }
    }
}

/// A child mapping whose numeric members are flattened one level deep.
#[derive(Debug, Clone, Copy)]
pub struct Nested {
    pub key: &'static str,
    pub unit: Unit,
}

impl Nested {
    pub const fn new(key: &'static str, unit: Unit) -> Self {
        Self { key, unit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// The field's text, verbatim.
    Text,
    /// `"1"` when the field is set, `"0"` otherwise.
    Flag,
}

/// Maps a document field onto a label of an info series.
#[derive(Debug, Clone, Copy)]
pub struct InfoLabel {
    pub label: &'static str,
    pub field: &'static str,
    pub kind: LabelKind,
}

impl InfoLabel {
    pub const fn text(label: &'static str, field: &'static str) -> Self {
        Self {
            label,
            field,
            kind: LabelKind::Text,
        }
    }

    pub const fn flag(label: &'static str, field: &'static str) -> Self {
        Self {
            label,
            field,
            kind: LabelKind::Flag,
        }
    }

    fn value(&self, item: &Document) -> String {
        let field = item.get(self.field);
        match self.kind {
            LabelKind::Text => field.map(Document::to_text).unwrap_or_default(),
            LabelKind::Flag => String::from(if field.is_some_and(Document::flag) { "1" } else { "0" }),
        }
    }
}

/// Emits `<prefix>_<key>` for every numeric top-level member of `doc`.
///
/// Non-numeric members and non-mapping documents produce nothing.
pub fn numeric_fields(doc: &Document, prefix: &str, help: &'static str, labels: &[(&'static str, String)]) -> Vec<PrometheusMetric> {
    let Some(map) = doc.as_map() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let value = value.as_f64()?;
            Some(gauge(join_metric_name(&[prefix, key.as_str()]), help, value, labels))
        })
        .collect()
}

/// Emits `<prefix>_<nested.key>_<member>[_<unit>]` for every numeric member
/// of the child mapping `nested.key`.
pub fn nested_fields(
    doc: &Document,
    prefix: &str,
    nested: Nested,
    help: &'static str,
    labels: &[(&'static str, String)],
) -> Vec<PrometheusMetric> {
    let Some(child) = doc.get(nested.key).and_then(Document::as_map) else {
        return Vec::new();
    };
    child
        .iter()
        .filter_map(|(member, value)| {
            let value = value.as_f64()?;
            let name = join_metric_name(&[prefix, nested.key, member.as_str(), nested.unit.suffix()]);
            Some(gauge(name, help, value, labels))
        })
        .collect()
}

/// Emits `<prefix>_info` with value 1 describing `item` through `fields`.
///
/// `labels` are appended after the field labels. Returns `None` when `item`
/// is not a mapping.
pub fn info_record(
    item: &Document,
    prefix: &str,
    help: &'static str,
    fields: &[InfoLabel],
    labels: &[(&'static str, String)],
) -> Option<PrometheusMetric> {
    item.as_map()?;
    let metric = PrometheusMetric::gauge(join_metric_name(&[prefix, "info"]), help, 1.0)
        .with_labels(fields.iter().map(|field| (field.label, field.value(item))))
        .with_labels(labels.iter().cloned());
    Some(metric)
}

/// Counts items per distinct value of one field.
#[derive(Debug, Clone)]
pub struct GroupCounter {
    field: &'static str,
    counts: BTreeMap<String, u64>,
}

impl GroupCounter {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            counts: BTreeMap::new(),
        }
    }

    /// Counts `item` under its value of the grouping field. Items missing
    /// the field are counted under `""`, the text their info label gets.
    pub fn observe(&mut self, item: &Document) {
        let value = item.get(self.field).map(Document::to_text).unwrap_or_default();
        *self.counts.entry(value).or_default() += 1;
    }

    /// Emits `<prefix>_<field>_count{<field>="<value>"}` per group.
    pub fn into_metrics(self, prefix: &str, help: &'static str) -> Vec<PrometheusMetric> {
        let name = join_metric_name(&[prefix, self.field, "count"]);
        let field = self.field;
        self.counts
            .into_iter()
            .map(|(value, count)| PrometheusMetric::gauge(name.clone(), help, count as f64).with_label(field, value))
            .collect()
    }
}

/// Applies [`info_record`] to every item and counts them by `group_by`.
pub fn info_records(
    items: &[Document],
    prefix: &str,
    help: &'static str,
    fields: &[InfoLabel],
    labels: &[(&'static str, String)],
    group_by: &'static str,
) -> (Vec<PrometheusMetric>, GroupCounter) {
    let mut counter = GroupCounter::new(group_by);
    let metrics = items
        .iter()
        .filter_map(|item| {
            let metric = info_record(item, prefix, help, fields, labels)?;
            counter.observe(item);
            Some(metric)
        })
        .collect();
    (metrics, counter)
}

fn gauge(name: String, help: &'static str, value: f64, labels: &[(&'static str, String)]) -> PrometheusMetric {
    PrometheusMetric::gauge(name, help, value).with_labels(labels.iter().cloned())
}
