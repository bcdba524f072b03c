//! Error type for the local object storage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The key would escape the upload directory or is otherwise unusable as
  /// a relative path.
  #[error("invalid storage key {0:?}")]
  InvalidKey(String),
}
