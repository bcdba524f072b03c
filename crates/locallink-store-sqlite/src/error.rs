//! Error type for `locallink-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A document was handed to the store without a string `id`.
  #[error("document has no string id")]
  MissingId,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
