//! HTTP server for locallink.
//!
//! Mounts the JSON API under `/api`, serves uploaded files from the upload
//! directory under `/files`, and traces every request.

pub mod error;
pub mod storage;

pub use error::Error;
pub use storage::LocalFileStorage;

use std::path::PathBuf;

use axum::Router;
use locallink_api::{ApiState, api_router};
use locallink_core::{
  feed::{DEFAULT_PAGE_SIZE, check_page_size},
  store::DocumentStore,
  upload::ObjectStorage,
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LOCALLINK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Directory uploaded files are written to and served from.
  pub upload_dir:            PathBuf,
  /// Prefix of the URLs returned for uploads, e.g.
  /// `http://localhost:8080/files`.
  pub public_base_url:       String,
  #[serde(default = "default_page_size")]
  pub default_page_size:     usize,
  /// Avatar given to profiles created without an image.
  pub default_profile_image: Option<String>,
}

impl ServerConfig {
  /// Check values that would otherwise only fail on the first request.
  pub fn validate(&self) -> locallink_core::Result<()> {
    check_page_size(self.default_page_size)
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_page_size() -> usize { DEFAULT_PAGE_SIZE }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, F>(config: &ServerConfig, state: ApiState<S, F>) -> Router
where
  S: DocumentStore + 'static,
  F: ObjectStorage + 'static,
{
  let state = state
    .with_default_page_size(config.default_page_size)
    .with_default_image(config.default_profile_image.clone());

  Router::new()
    .nest("/api", api_router(state))
    .nest_service("/files", ServeDir::new(&config.upload_dir))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
