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

use serde_json::Value;
use std::collections::BTreeMap;

/// Untyped JSON tree returned by the Proxmox VE API.
///
/// Numbers are stored as the decimal text found in the response body, so
/// large byte counters survive decoding unchanged. Use [`Document::as_f64`]
/// to read a value as a measurement and [`Document::to_text`] to read it as
/// a label.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(String),
    String(String),
    List(Vec<Document>),
    Map(BTreeMap<String, Document>),
}

impl Document {
    /// Decodes a JSON body without converting numbers to floating point.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice::<Value>(bytes).map(Self::from)
    }

    /// Looks up `key` when this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The `data` member of the standard API response envelope.
    pub fn data(&self) -> Option<&Document> {
        self.get("data")
    }

    /// Takes the `data` member out of the response envelope.
    pub fn into_data(self) -> Option<Document> {
        match self {
            Self::Map(mut map) => map.remove("data"),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Document]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reads the value as a measurement.
    ///
    /// Numbers always qualify. Strings qualify when their whole content is a
    /// decimal number, which is how Proxmox VE reports some gauges
    /// (e.g. `"cpu": "0.05"`). Non-finite results are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(text) | Self::String(text) => parse_numeric(text),
            Self::Null | Self::Bool(_) | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Reads the value as label text.
    ///
    /// Scalars render as their JSON text without quotes; `null` and
    /// containers render as an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(text) | Self::String(text) => text.clone(),
            Self::Null | Self::List(_) | Self::Map(_) => String::new(),
        }
    }

    /// Reads a 0/1 style flag. Any non-zero number and `true` are set.
    pub fn flag(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            other => other.as_f64().is_some_and(|v| v != 0.0),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.to_string()),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    let shaped = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !shaped {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
