//! Image uploads to an external object storage service.

use std::{future::Future, sync::Arc};

use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::{Error, Result};

/// The top-level folders uploads are sorted into.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageCategory {
  Profile,
  Object,
  Link,
  Activity,
}

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name:    String,
  /// The MIME type the client declared.
  pub content_type: String,
  pub data:         Bytes,
}

/// Abstraction over a binary object store that serves what it stores at a
/// public URL.
pub trait ObjectStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `data` under `key` and return its public URL.
  fn put(
    &self,
    key: String,
    content_type: String,
    data: Bytes,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}

/// Image types accepted for upload. Raster only: SVG can carry scripts.
pub const IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

fn is_accepted_image(content_type: &str) -> bool {
  let essence = content_type.split(';').next().unwrap_or_default().trim();
  IMAGE_TYPES.iter().any(|t| t.eq_ignore_ascii_case(essence))
}

/// Replace the base name of `before` with `to`, keeping the extension.
/// Names without an extension, or whose only dot is the first character,
/// are returned unchanged.
pub fn change_file_name_ext(before: &str, to: &str) -> String {
  match before.rfind('.') {
    None | Some(0) => before.to_owned(),
    Some(dot) => format!("{to}{}", &before[dot..]),
  }
}

pub struct ImageUploader<F> {
  storage: Arc<F>,
}

impl<F: ObjectStorage> ImageUploader<F> {
  pub fn new(storage: Arc<F>) -> Self { Self { storage } }

  /// Upload an image and return its public URL.
  ///
  /// Anything not declared as one of [`IMAGE_TYPES`] is rejected before the
  /// storage service is contacted. When `rename` is given it replaces the
  /// file's base name; the extension is kept.
  pub async fn upload_image(
    &self,
    file: Upload,
    category: StorageCategory,
    rename: Option<&str>,
  ) -> Result<String> {
    if !is_accepted_image(&file.content_type) {
      return Err(Error::validation(format!(
        "only png, jpeg, gif and webp images can be uploaded, got {:?}",
        file.content_type
      )));
    }
    if file.data.is_empty() {
      return Err(Error::validation("uploaded file is empty"));
    }

    let name = match rename {
      Some(to) => change_file_name_ext(&file.file_name, to),
      None => file.file_name,
    };
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with("..") {
      return Err(Error::validation(format!("invalid file name {name:?}")));
    }
    let key = format!("{category}/{name}");
    let size = file.data.len();

    let url = self
      .storage
      .put(key.clone(), file.content_type, file.data)
      .await
      .map_err(Error::store)?;
    info!(%key, size, %url, "image uploaded");
    Ok(url)
  }
}
