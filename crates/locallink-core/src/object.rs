//! Content entities: notes and the containers they are attributed to.
//!
//! These are the canonical persisted shapes. Request-scoped join data
//! (author profile, like state) never lives here; see [`crate::view`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{Collection, Record},
};

/// Length, in characters, of the summary derived from a note's content.
pub const SUMMARY_LEN: usize = 100;

/// The `type` discriminator stored on every object document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
  Note,
  Profile,
  Group,
  Board,
  AgendaBoard,
}

impl ObjectType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Note => "Note",
      Self::Profile => "Profile",
      Self::Group => "Group",
      Self::Board => "Board",
      Self::AgendaBoard => "AgendaBoard",
    }
  }
}

pub(crate) fn new_id() -> String { Uuid::new_v4().to_string() }

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(format!("{field} must not be empty")));
  }
  Ok(())
}

// ─── Note ────────────────────────────────────────────────────────────────────

/// A post on a board, or a reply to another note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id:            String,
  #[serde(rename = "type")]
  pub kind:          ObjectType,
  pub name:          Option<String>,
  pub summary:       Option<String>,
  /// HTML content.
  pub content:       String,
  pub image:         Option<String>,
  /// Id of the authoring profile.
  pub actor:         String,
  /// Id of the board or group this note belongs to.
  pub attributed_to: Option<String>,
  pub in_reply_to:   Option<String>,
  #[serde(default)]
  pub like_count:    u64,
  #[serde(default)]
  pub replies_count: u64,
  /// The option selected when the note is a vote on an agenda board.
  pub vote_value:    Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    Option<DateTime<Utc>>,
  pub deleted_at:    Option<DateTime<Utc>>,
}

impl Note {
  pub fn is_live(&self) -> bool { self.deleted_at.is_none() }
}

impl Record for Note {
  const COLLECTION: Collection = Collection::Object;

  fn id(&self) -> &str { &self.id }
}

/// Input for creating a [`Note`]. `id` is generated when absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
  pub id:            Option<String>,
  /// Usually filled from the authenticated requester rather than the body.
  #[serde(default)]
  pub actor:         String,
  pub content:       String,
  pub name:          Option<String>,
  pub summary:       Option<String>,
  pub image:         Option<String>,
  pub attributed_to: Option<String>,
  pub in_reply_to:   Option<String>,
  pub vote_value:    Option<String>,
}

impl NewNote {
  pub fn new(actor: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      actor: actor.into(),
      content: content.into(),
      ..Self::default()
    }
  }

  /// Validate and turn the input into a persisted-shape [`Note`] created at
  /// `now`. Counters start at zero.
  pub fn build(self, now: DateTime<Utc>) -> Result<Note> {
    require_text("actor", &self.actor)?;
    require_text("content", &self.content)?;

    let summary = self
      .summary
      .unwrap_or_else(|| self.content.chars().take(SUMMARY_LEN).collect());

    Ok(Note {
      id: self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id),
      kind: ObjectType::Note,
      name: self.name,
      summary: Some(summary),
      content: self.content,
      image: self.image,
      actor: self.actor,
      attributed_to: self.attributed_to,
      in_reply_to: self.in_reply_to,
      like_count: 0,
      replies_count: 0,
      vote_value: self.vote_value,
      created_at: now,
      updated_at: None,
      deleted_at: None,
    })
  }
}

// ─── Group ───────────────────────────────────────────────────────────────────

/// A community space; boards are attributed to a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
  pub id:            String,
  #[serde(rename = "type")]
  pub kind:          ObjectType,
  pub name:          String,
  pub summary:       Option<String>,
  pub image:         Option<String>,
  #[serde(default)]
  pub banner_images: Vec<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    Option<DateTime<Utc>>,
  pub deleted_at:    Option<DateTime<Utc>>,
}

impl Record for Group {
  const COLLECTION: Collection = Collection::Group;

  fn id(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
  pub id:            Option<String>,
  pub name:          String,
  pub summary:       Option<String>,
  pub image:         Option<String>,
  #[serde(default)]
  pub banner_images: Vec<String>,
}

impl NewGroup {
  pub fn build(self, now: DateTime<Utc>) -> Result<Group> {
    require_text("name", &self.name)?;
    Ok(Group {
      id:            self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id),
      kind:          ObjectType::Group,
      name:          self.name,
      summary:       self.summary,
      image:         self.image,
      banner_images: self.banner_images,
      created_at:    now,
      updated_at:    None,
      deleted_at:    None,
    })
  }
}

/// Fields of a group that may be changed after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
  pub name:          Option<String>,
  pub summary:       Option<String>,
  pub image:         Option<String>,
  pub banner_images: Option<Vec<String>>,
}

// ─── Board ───────────────────────────────────────────────────────────────────

/// The voting window and choices of an agenda board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
  pub start_time:   DateTime<Utc>,
  pub end_time:     DateTime<Utc>,
  pub vote_options: Vec<String>,
}

impl Agenda {
  /// Check that `value` is a valid vote cast at `now`.
  pub fn accepts(&self, value: &str, now: DateTime<Utc>) -> Result<()> {
    if !self.vote_options.iter().any(|o| o == value) {
      return Err(Error::validation(format!(
        "{value:?} is not one of the vote options"
      )));
    }
    if now < self.start_time || now > self.end_time {
      return Err(Error::validation("voting is closed for this agenda"));
    }
    Ok(())
  }
}

/// A board inside a group. Agenda boards carry an [`Agenda`] and are stored
/// with type `AgendaBoard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
  pub id:            String,
  #[serde(rename = "type")]
  pub kind:          ObjectType,
  pub name:          String,
  pub content:       Option<String>,
  pub image:         Option<String>,
  pub actor:         Option<String>,
  /// Id of the owning group.
  pub attributed_to: String,
  #[serde(flatten)]
  pub agenda:        Option<Agenda>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    Option<DateTime<Utc>>,
  pub deleted_at:    Option<DateTime<Utc>>,
}

impl Record for Board {
  const COLLECTION: Collection = Collection::Board;

  fn id(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
  pub id:            Option<String>,
  pub name:          String,
  #[serde(default)]
  pub attributed_to: String,
  pub content:       Option<String>,
  pub image:         Option<String>,
  pub actor:         Option<String>,
}

impl NewBoard {
  pub fn build(self, now: DateTime<Utc>) -> Result<Board> {
    require_text("name", &self.name)?;
    require_text("attributedTo", &self.attributed_to)?;
    Ok(Board {
      id:            self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id),
      kind:          ObjectType::Board,
      name:          self.name,
      content:       self.content,
      image:         self.image,
      actor:         self.actor,
      attributed_to: self.attributed_to,
      agenda:        None,
      created_at:    now,
      updated_at:    None,
      deleted_at:    None,
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgendaBoard {
  #[serde(flatten)]
  pub board:        NewBoard,
  pub start_time:   DateTime<Utc>,
  pub end_time:     DateTime<Utc>,
  pub vote_options: Vec<String>,
}

impl NewAgendaBoard {
  pub fn build(self, now: DateTime<Utc>) -> Result<Board> {
    if self.end_time <= self.start_time {
      return Err(Error::validation("endTime must be after startTime"));
    }
    let mut seen = Vec::with_capacity(self.vote_options.len());
    for option in &self.vote_options {
      require_text("vote option", option)?;
      if seen.contains(&option) {
        return Err(Error::validation(format!(
          "duplicate vote option {option:?}"
        )));
      }
      seen.push(option);
    }
    if seen.len() < 2 {
      return Err(Error::validation("an agenda needs at least two vote options"));
    }

    let mut board = self.board.build(now)?;
    board.kind = ObjectType::AgendaBoard;
    board.agenda = Some(Agenda {
      start_time:   self.start_time,
      end_time:     self.end_time,
      vote_options: self.vote_options,
    });
    Ok(board)
  }
}
