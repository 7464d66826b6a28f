use super::labels::{LabelSet, ADDRESS_LABEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default `source` name of the group produced by the database adapter.
pub const DEFAULT_SOURCE: &str = "database";

/// A named batch of discovered endpoints delivered in one refresh cycle.
///
/// Every group is a full replacement snapshot, never a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    /// Logical name identifying the adapter instance.
    pub source: String,
    /// One label set per distinct valid endpoint, in row order.
    pub targets: Vec<LabelSet>,
}

impl TargetGroup {
    /// An empty group. Failed cycles deliver this so consumers reconcile to
    /// "no targets" instead of holding on to stale ones.
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            targets: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Convert to Prometheus `file_sd` entries: one entry per target, with
    /// the address moved into `targets` and every other label kept.
    ///
    /// Label sets without an address are skipped.
    pub fn to_file_sd(&self) -> Vec<FileSdEntry> {
        self.targets
            .iter()
            .filter_map(|set| {
                let address = set.address()?.to_string();
                let labels = set
                    .iter()
                    .filter(|(name, _)| *name != ADDRESS_LABEL)
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                Some(FileSdEntry {
                    targets: vec![address],
                    labels,
                })
            })
            .collect()
    }
}

/// One element of a Prometheus `file_sd` JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSdEntry {
    pub targets: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::labels::{HOSTNAME_LABEL, METRICS_PATH_LABEL};

    fn target(host: &str, port: &str) -> LabelSet {
        let mut set = LabelSet::new();
        set.insert(HOSTNAME_LABEL, host);
        set.insert(ADDRESS_LABEL, format!("{host}:{port}"));
        set.insert(METRICS_PATH_LABEL, "/metrics");
        set
    }

    #[test]
    fn file_sd_moves_address_into_targets() {
        let group = TargetGroup {
            source: DEFAULT_SOURCE.to_string(),
            targets: vec![target("a", "1"), target("b", "2")],
        };

        let entries = group.to_file_sd();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].targets, vec!["a:1".to_string()]);
        assert!(!entries[0].labels.contains_key(ADDRESS_LABEL));
        assert_eq!(entries[1].labels[HOSTNAME_LABEL], "b");
    }

    #[test]
    fn file_sd_skips_sets_without_address() {
        let mut orphan = LabelSet::new();
        orphan.insert("env", "prod");
        let group = TargetGroup {
            source: DEFAULT_SOURCE.to_string(),
            targets: vec![orphan],
        };
        assert!(group.to_file_sd().is_empty());
    }

    #[test]
    fn empty_group_serializes_with_empty_targets() {
        let json = serde_json::to_string(&TargetGroup::empty("database")).unwrap();
        assert_eq!(json, r#"{"source":"database","targets":[]}"#);
    }
}
