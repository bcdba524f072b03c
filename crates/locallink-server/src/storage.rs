//! [`LocalFileStorage`] — an [`ObjectStorage`] that writes uploads to a
//! directory served by this process.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use locallink_core::upload::ObjectStorage;
use tracing::debug;

use crate::Error;

pub struct LocalFileStorage {
  root:            PathBuf,
  public_base_url: String,
}

impl LocalFileStorage {
  /// Store files under `root`; they are reachable at
  /// `{public_base_url}/{key}`.
  pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    Self { root: root.into(), public_base_url: public_base_url.into() }
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Resolve `key` to a path under the root. Only plain relative segments
  /// are accepted.
  fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
    let relative = Path::new(key);
    let plain = !key.is_empty()
      && !key.contains('\\')
      && relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
      return Err(Error::InvalidKey(key.to_owned()));
    }
    Ok(self.root.join(relative))
  }
}

impl ObjectStorage for LocalFileStorage {
  type Error = Error;

  async fn put(&self, key: String, content_type: String, data: Bytes) -> Result<String, Error> {
    let path = self.path_for(&key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &data).await?;
    debug!(?path, %content_type, size = data.len(), "file stored");

    Ok(format!("{}/{key}", self.public_base_url.trim_end_matches('/')))
  }
}
