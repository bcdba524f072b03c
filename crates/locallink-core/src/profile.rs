//! Profile — one per actor, keyed by the identity provider's user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  object::{ObjectType, require_text},
  store::{Collection, Record},
};

/// A named link shown on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
  pub name: String,
  pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  /// Same as the auth identity id.
  pub id:             String,
  #[serde(rename = "type")]
  pub kind:           ObjectType,
  pub name:           String,
  pub email:          String,
  /// HTML content.
  pub summary:        Option<String>,
  pub image:          Option<String>,
  /// Background image.
  pub header:         Option<String>,
  #[serde(default)]
  pub links:          Vec<ProfileLink>,
  /// Accumulated reward for executed activities. Only the profile ledger
  /// writes this field.
  #[serde(default)]
  pub activity_point: u64,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     Option<DateTime<Utc>>,
  pub deleted_at:     Option<DateTime<Utc>>,
}

impl Record for Profile {
  const COLLECTION: Collection = Collection::Profile;

  fn id(&self) -> &str { &self.id }
}

/// Input for creating a [`Profile`] after sign-up.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
  pub id:      String,
  pub name:    String,
  pub email:   String,
  pub summary: Option<String>,
  pub image:   Option<String>,
}

impl NewProfile {
  pub fn build(self, now: DateTime<Utc>) -> Result<Profile> {
    require_text("id", &self.id)?;
    require_text("name", &self.name)?;
    require_text("email", &self.email)?;
    if !self.email.contains('@') {
      return Err(Error::validation(format!(
        "{:?} is not an email address",
        self.email
      )));
    }

    Ok(Profile {
      id:             self.id,
      kind:           ObjectType::Profile,
      name:           self.name,
      email:          self.email,
      summary:        self.summary,
      image:          self.image,
      header:         None,
      links:          Vec::new(),
      activity_point: 0,
      created_at:     now,
      updated_at:     None,
      deleted_at:     None,
    })
  }
}

/// Fields a user may edit on their own profile. `activityPoint` is not one
/// of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
  pub name:    Option<String>,
  pub summary: Option<String>,
  pub header:  Option<String>,
  pub links:   Option<Vec<ProfileLink>>,
}
