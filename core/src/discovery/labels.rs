use shared::error::DiscoveryError;
use shared::target::{
  is_valid_label_name, EndpointRecord, LabelSet, ADDRESS_LABEL, HOSTNAME_LABEL, METRICS_PATH_LABEL,
};

/// Turns endpoint records into label sets.
///
/// A pure function of the record and the default metrics path: the same
/// record always yields the same labels. Derived labels are written first
/// and custom labels after, so a custom label with a derived name wins.
#[derive(Debug, Clone)]
pub struct LabelBuilder {
  default_metrics_path: String,
}

/// Output of [`LabelBuilder::build`].
#[derive(Debug)]
pub struct BuiltLabels {
  pub labels: LabelSet,
  /// Custom label pairs that were dropped, one `LabelParse` error each.
  pub rejected: Vec<DiscoveryError>,
}

impl LabelBuilder {
  pub fn new(default_metrics_path: impl Into<String>) -> Self {
    Self {
      default_metrics_path: default_metrics_path.into(),
    }
  }

  pub fn default_metrics_path(&self) -> &str {
    &self.default_metrics_path
  }

  /// Build the label set for one record.
  pub fn build(&self, record: &EndpointRecord) -> BuiltLabels {
    let mut labels = LabelSet::new();
    labels.insert(HOSTNAME_LABEL, record.host());
    labels.insert(ADDRESS_LABEL, record.address());

    let path = if record.path().is_empty() {
      self.default_metrics_path.as_str()
    } else {
      record.path()
    };
    labels.insert(METRICS_PATH_LABEL, path);

    let (pairs, rejected) = parse_custom_labels(record.labels());
    for (name, value) in pairs {
      labels.insert(name, value);
    }

    BuiltLabels { labels, rejected }
  }
}

/// Parse a `key=value,key=value` custom label list.
///
/// Each candidate is split on its first `=`. The key is trimmed, the value is
/// kept verbatim. Blank candidates (`"a=1,,b=2"`, trailing commas) are
/// ignored. A candidate without `=`, or whose key is not a valid label name,
/// is returned as a `LabelParse` error and left out; the remaining pairs are
/// still returned.
pub fn parse_custom_labels(raw: &str) -> (Vec<(String, String)>, Vec<DiscoveryError>) {
  let mut pairs = Vec::new();
  let mut rejected = Vec::new();

  for candidate in raw.split(',') {
    if candidate.trim().is_empty() {
      continue;
    }

    let Some((key, value)) = candidate.split_once('=') else {
      rejected.push(DiscoveryError::label_parse(candidate.trim(), "missing '='"));
      continue;
    };

    let key = key.trim();
    if key.is_empty() {
      rejected.push(DiscoveryError::label_parse(candidate.trim(), "empty label name"));
      continue;
    }
    if !is_valid_label_name(key) {
      rejected.push(DiscoveryError::label_parse(
        candidate.trim(),
        format!("'{key}' is not a valid label name"),
      ));
      continue;
    }

    pairs.push((key.to_string(), value.to_string()));
  }

  (pairs, rejected)
}
