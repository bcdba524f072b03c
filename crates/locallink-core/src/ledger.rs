//! The profile ledger: sole writer of `Profile::activity_point`.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::{Result, profile::Profile, records::Records, store::DocumentStore};

pub struct ProfileLedger<S> {
  store: Arc<S>,
}

impl<S: DocumentStore> ProfileLedger<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Credit `delta` points to `actor_id` and return the updated profile.
  ///
  /// This is a plain read-modify-write of the whole profile document: two
  /// concurrent credits to the same profile can lose one of the updates.
  pub async fn add_points(&self, actor_id: &str, delta: u32) -> Result<Profile> {
    let records = Records::new(self.store.as_ref());
    let mut profile: Profile = records.require(actor_id).await?;

    profile.activity_point += u64::from(delta);
    profile.updated_at = Some(Utc::now());
    records.replace(&profile).await?;

    debug!(actor = actor_id, delta, total = profile.activity_point, "credited points");
    Ok(profile)
  }
}
