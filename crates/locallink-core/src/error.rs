//! Error types for `locallink-core`.

use thiserror::Error;

use crate::store::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{collection} {id} not found")]
  NotFound { collection: Collection, id: String },

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("{collection} {id} already exists")]
  Conflict { collection: Collection, id: String },

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The activity record was written but one or more dependent steps failed.
  #[error("activity {activity_id} partially applied; failed: {}", failed_steps.join(", "))]
  PartialCompletion {
    activity_id:  String,
    failed_steps: Vec<String>,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StoreUnavailable(Box::new(e))
  }

  pub(crate) fn not_found(collection: Collection, id: impl Into<String>) -> Self {
    Self::NotFound { collection, id: id.into() }
  }

  pub(crate) fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
