//! Profiles of signed-up users.
//!
//! Sign-up itself (credentials, tokens) belongs to the identity provider; this
//! service only creates and edits the profile record keyed by the identity id.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::{
  Error, Result,
  profile::{NewProfile, Profile, ProfilePatch},
  records::Records,
  store::{Collection, DocQuery, DocumentStore, to_document},
  upload::{ImageUploader, ObjectStorage, StorageCategory, Upload},
};

pub struct AccountService<S, F> {
  store:         Arc<S>,
  uploader:      ImageUploader<F>,
  default_image: Option<String>,
}

impl<S: DocumentStore, F: ObjectStorage> AccountService<S, F> {
  pub fn new(store: Arc<S>, storage: Arc<F>) -> Self {
    Self { store, uploader: ImageUploader::new(storage), default_image: None }
  }

  /// Image URL given to profiles created without one.
  pub fn with_default_image(mut self, url: Option<String>) -> Self {
    self.default_image = url;
    self
  }

  fn records(&self) -> Records<'_, S> { Records::new(self.store.as_ref()) }

  /// Create the profile for a new identity. The email must not belong to
  /// another live profile.
  pub async fn create_profile(
    &self,
    input: NewProfile,
    image: Option<Upload>,
  ) -> Result<Profile> {
    let mut profile = input.build(Utc::now())?;

    let same_email = DocQuery::new().eq("email", profile.email.as_str()).limit(1);
    if !self.records().query::<Profile>(&same_email).await?.is_empty() {
      return Err(Error::Conflict {
        collection: Collection::Profile,
        id:         profile.email,
      });
    }

    profile.image = match image {
      Some(file) => Some(self.upload_avatar(&profile.id, file).await?),
      None => profile.image.or_else(|| self.default_image.clone()),
    };

    self.records().insert(&profile).await?;
    info!(id = %profile.id, name = %profile.name, "profile created");
    Ok(profile)
  }

  pub async fn get_profile(&self, id: &str) -> Result<Profile> {
    self.records().require(id).await
  }

  pub async fn find_by_name(&self, name: &str) -> Result<Vec<Profile>> {
    let query = DocQuery::new().eq("name", name);
    self.records().query(&query).await
  }

  pub async fn update_profile(&self, id: &str, patch: ProfilePatch) -> Result<Profile> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::validation("name must not be empty"));
    }
    let records = self.records();
    records.require::<Profile>(id).await?;
    records.patch::<Profile>(id, to_document(&patch)?).await?;
    records.require(id).await
  }

  /// Upload a new avatar and point the profile at it.
  pub async fn update_profile_image(&self, id: &str, image: Upload) -> Result<Profile> {
    let records = self.records();
    records.require::<Profile>(id).await?;

    let url = self.upload_avatar(id, image).await?;
    records
      .patch::<Profile>(id, to_document(&json!({ "image": url }))?)
      .await?;
    records.require(id).await
  }

  async fn upload_avatar(&self, id: &str, image: Upload) -> Result<String> {
    let name = format!("{id}-{}", Utc::now().timestamp_millis());
    self
      .uploader
      .upload_image(image, StorageCategory::Profile, Some(&name))
      .await
  }
}
