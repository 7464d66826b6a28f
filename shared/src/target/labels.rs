use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scrape address label understood by Prometheus.
pub const ADDRESS_LABEL: &str = "__address__";

/// Metrics path label understood by Prometheus.
pub const METRICS_PATH_LABEL: &str = "__metrics_path__";

/// Hostname of the discovered endpoint. A `__meta_` label, so it is dropped
/// after relabeling unless copied into a regular label.
pub const HOSTNAME_LABEL: &str = "__meta_hostname_";

/// Label name -> value mapping attached to one discovered endpoint.
///
/// Backed by a `BTreeMap` so iteration and serialization order are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a label, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn address(&self) -> Option<&str> {
        self.get(ADDRESS_LABEL)
    }
}

impl FromIterator<(String, String)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether `name` is a valid Prometheus label name: `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
