//! Handler for `POST /uploads/:category`, plus the helper that turns a raw
//! request body into an [`Upload`].

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use locallink_core::{
  store::DocumentStore,
  upload::{ObjectStorage, StorageCategory, Upload},
};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiState, actor::Actor, error::ApiError};

/// Build an [`Upload`] from a raw body. Without a file name one is made up
/// from the declared subtype, e.g. `upload.png` for `image/png`.
pub(crate) fn upload_from(headers: &HeaderMap, file_name: Option<String>, data: Bytes) -> Upload {
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("application/octet-stream")
    .to_owned();
  let file_name = file_name.unwrap_or_else(|| {
    let subtype = content_type
      .split_once('/')
      .map_or("bin", |(_, sub)| sub.split(';').next().unwrap_or(sub).trim());
    format!("upload.{subtype}")
  });
  Upload { file_name, content_type, data }
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub filename: Option<String>,
}

/// `POST /uploads/:category[?filename=<name>]` — returns 201 + `{"url": ...}`.
pub async fn create<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(_actor): Actor,
  Path(category): Path<StorageCategory>,
  Query(params): Query<UploadParams>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let upload = upload_from(&headers, params.filename, body);
  let url = state.uploader.upload_image(upload, category, None).await?;
  Ok((StatusCode::CREATED, Json(json!({ "url": url }))))
}
