//! Activities — the append-only ledger of actions taken by actors.
//!
//! An activity is written exactly once and never updated or deleted. Its
//! reward (`activityPoint`) is fixed by its [`ActivityKind`]; callers cannot
//! choose it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  object::{new_id, require_text},
  store::{Collection, Record},
};

/// The ActivityStreams activity types this system records.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
pub enum ActivityType {
  Add,
  Announce,
  Create,
  Delete,
  Follow,
  Invite,
  Join,
  Like,
  Undo,
  Update,
  View,
}

/// The actions the executor knows how to run, each with a fixed reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  Like,
  CreateNote,
  CreateReply,
  CreateVote,
}

impl ActivityKind {
  pub fn activity_type(self) -> ActivityType {
    match self {
      Self::Like => ActivityType::Like,
      Self::CreateNote | Self::CreateReply | Self::CreateVote => {
        ActivityType::Create
      }
    }
  }

  /// Points credited to the actor's profile.
  pub fn points(self) -> u32 {
    match self {
      Self::Like => 10,
      Self::CreateNote => 30,
      Self::CreateReply => 30,
      Self::CreateVote => 20,
    }
  }

  pub fn default_summary(self) -> &'static str {
    match self {
      Self::Like => "Liked a post.",
      Self::CreateNote => "Wrote a post.",
      Self::CreateReply => "Wrote a reply.",
      Self::CreateVote => "Voted on an agenda.",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id:             String,
  #[serde(rename = "type")]
  pub kind:           ActivityType,
  pub actor:          String,
  /// Id of the entity acted upon.
  pub object:         Option<String>,
  /// Id of a secondary target, e.g. the board a note was written on.
  pub target:         Option<String>,
  pub summary:        String,
  pub activity_point: u32,
  pub created_at:     DateTime<Utc>,
}

impl Record for Activity {
  const COLLECTION: Collection = Collection::Activity;

  fn id(&self) -> &str { &self.id }
}

/// Who did what to which entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActivityParams {
  pub actor:  String,
  pub object: Option<String>,
  pub target: Option<String>,
}

impl ActivityParams {
  pub fn new(actor: impl Into<String>) -> Self {
    Self { actor: actor.into(), ..Self::default() }
  }

  pub fn object(mut self, object: impl Into<String>) -> Self {
    self.object = Some(object.into());
    self
  }

  pub fn target(mut self, target: impl Into<String>) -> Self {
    self.target = Some(target.into());
    self
  }
}

impl Activity {
  /// Construct the ledger record for `kind`, with a fresh id and `createdAt`
  /// set to `now`.
  pub fn from_kind(
    kind: ActivityKind,
    params: ActivityParams,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    require_text("actor", &params.actor)?;
    if kind == ActivityKind::Like && params.object.is_none() {
      return Err(Error::validation("a like needs an object"));
    }

    Ok(Self {
      id:             new_id(),
      kind:           kind.activity_type(),
      actor:          params.actor,
      object:         params.object,
      target:         params.target,
      summary:        kind.default_summary().to_owned(),
      activity_point: kind.points(),
      created_at:     now,
    })
  }
}
