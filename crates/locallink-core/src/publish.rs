//! User-facing write flows: each stores content and then runs the matching
//! activity so the author is rewarded.

use std::sync::Arc;

use serde::Serialize;

use crate::{
  Result,
  activity::{ActivityKind, ActivityParams},
  board::BoardService,
  executor::{ActivityExecutor, Execution},
  object::{NewNote, Note},
  store::DocumentStore,
  upload::{ObjectStorage, Upload},
};

/// A newly written note together with the activity run for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Published {
  pub note:     Note,
  pub activity: Execution,
}

pub struct Publisher<S, F> {
  boards:   BoardService<S, F>,
  executor: ActivityExecutor<S>,
}

impl<S: DocumentStore, F: ObjectStorage> Publisher<S, F> {
  pub fn new(store: Arc<S>, storage: Arc<F>) -> Self {
    Self {
      boards:   BoardService::new(store.clone(), storage),
      executor: ActivityExecutor::new(store),
    }
  }

  /// Write a note on a board. A note carrying a `voteValue` counts as a vote
  /// rather than a post.
  pub async fn publish_note(
    &self,
    board_id: &str,
    input: NewNote,
    image: Option<Upload>,
  ) -> Result<Published> {
    let note = self.boards.create_note(board_id, input, image).await?;
    let kind = if note.vote_value.is_some() {
      ActivityKind::CreateVote
    } else {
      ActivityKind::CreateNote
    };
    let params = ActivityParams::new(note.actor.clone())
      .object(note.id.clone())
      .target(board_id);
    let activity = self.executor.execute(kind, params).await?;
    Ok(Published { note, activity })
  }

  pub async fn publish_reply(&self, parent_id: &str, input: NewNote) -> Result<Published> {
    let note = self.boards.create_reply(parent_id, input).await?;
    let params = ActivityParams::new(note.actor.clone())
      .object(note.id.clone())
      .target(parent_id);
    let activity = self
      .executor
      .execute(ActivityKind::CreateReply, params)
      .await?;
    Ok(Published { note, activity })
  }

  /// Like a live note.
  pub async fn like_note(&self, actor: &str, note_id: &str) -> Result<Execution> {
    self.boards.get_note(note_id).await?;
    let params = ActivityParams::new(actor).object(note_id);
    self.executor.execute(ActivityKind::Like, params).await
  }
}
