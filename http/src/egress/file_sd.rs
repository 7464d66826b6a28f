use shared::target::{FileSdEntry, TargetGroup};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes delivered target groups as a Prometheus `file_sd` JSON document.
///
/// The file is replaced atomically: the document goes to `<path>.tmp` first
/// and is renamed over `<path>`, so Prometheus never reads a half-written
/// file.
pub struct FileSdWriter {
  path: PathBuf,
}

impl FileSdWriter {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Replace the file with `groups`. Returns the number of entries written.
  pub async fn write(&self, groups: &[TargetGroup]) -> anyhow::Result<usize> {
    let entries: Vec<FileSdEntry> = groups.iter().flat_map(TargetGroup::to_file_sd).collect();
    let body = serde_json::to_vec_pretty(&entries)?;

    let mut tmp = self.path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &body).await?;
    tokio::fs::rename(&tmp, &self.path).await?;

    debug!(path = %self.path.display(), entries = entries.len(), "file_sd document written");
    Ok(entries.len())
  }
}
