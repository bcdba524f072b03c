//! Response shapes: persisted records wrapped with request-scoped join data.
//!
//! Views are never written to the store, so the transient fields cannot leak
//! into persisted documents.

use serde::Serialize;

use crate::{activity::Activity, object::Note, profile::Profile};

/// A note enriched with its author's profile and, when a requester is known,
/// whether they liked it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
  #[serde(flatten)]
  pub note:     Note,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile:  Option<Profile>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_liked: Option<bool>,
}

impl From<Note> for NoteView {
  fn from(note: Note) -> Self {
    Self { note, profile: None, is_liked: None }
  }
}

/// An activity with its actor's (updated) profile and the object it acted on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
  #[serde(flatten)]
  pub activity:      Activity,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile:       Option<Profile>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub object_detail: Option<NoteView>,
}

impl From<Activity> for ActivityView {
  fn from(activity: Activity) -> Self {
    Self { activity, profile: None, object_detail: None }
  }
}
