//! Groups, boards, and the notes written on them.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::{
  Error, Result,
  feed::check_page_size,
  object::{
    Board, Group, GroupPatch, NewAgendaBoard, NewBoard, NewGroup, NewNote, Note,
  },
  records::Records,
  store::{DocQuery, DocumentStore, to_document},
  upload::{ImageUploader, ObjectStorage, StorageCategory, Upload},
};

pub struct BoardService<S, F> {
  store:    Arc<S>,
  uploader: ImageUploader<F>,
}

impl<S: DocumentStore, F: ObjectStorage> BoardService<S, F> {
  pub fn new(store: Arc<S>, storage: Arc<F>) -> Self {
    Self { store, uploader: ImageUploader::new(storage) }
  }

  fn records(&self) -> Records<'_, S> { Records::new(self.store.as_ref()) }

  // ── Groups ────────────────────────────────────────────────────────────────

  pub async fn create_group(&self, input: NewGroup) -> Result<Group> {
    let group = input.build(Utc::now())?;
    self.records().insert(&group).await?;
    info!(id = %group.id, name = %group.name, "group created");
    Ok(group)
  }

  pub async fn get_group(&self, id: &str) -> Result<Group> {
    self.records().require(id).await
  }

  pub async fn update_group(&self, id: &str, patch: GroupPatch) -> Result<Group> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::validation("name must not be empty"));
    }
    let records = self.records();
    records.require::<Group>(id).await?;
    records.patch::<Group>(id, to_document(&patch)?).await?;
    records.require(id).await
  }

  /// Live groups, newest first.
  pub async fn list_groups(
    &self,
    cursor: Option<&str>,
    limit: usize,
  ) -> Result<Vec<Group>> {
    check_page_size(limit)?;
    let records = self.records();
    let start_after = records.cursor::<Group>(cursor).await?;
    let query = DocQuery::new().start_after(start_after).limit(limit);
    records.query(&query).await
  }

  // ── Boards ────────────────────────────────────────────────────────────────

  pub async fn create_board(&self, input: NewBoard) -> Result<Board> {
    let board = input.build(Utc::now())?;
    self.insert_board(board).await
  }

  pub async fn create_agenda_board(&self, input: NewAgendaBoard) -> Result<Board> {
    let board = input.build(Utc::now())?;
    self.insert_board(board).await
  }

  async fn insert_board(&self, board: Board) -> Result<Board> {
    let records = self.records();
    records.require::<Group>(&board.attributed_to).await?;
    records.insert(&board).await?;
    info!(id = %board.id, group = %board.attributed_to, kind = ?board.kind, "board created");
    Ok(board)
  }

  pub async fn get_board(&self, id: &str) -> Result<Board> {
    self.records().require(id).await
  }

  /// Every live board of a group, agenda boards included.
  pub async fn list_boards(&self, group_id: &str) -> Result<Vec<Board>> {
    let query = DocQuery::new().eq("attributedTo", group_id);
    self.records().query(&query).await
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  /// Write a note on a board. `attributedTo` defaults to `board_id`, and an
  /// attached image is uploaded first and its URL stored on the note.
  ///
  /// Replies go through [`BoardService::create_reply`] only, so that the
  /// parent's `repliesCount` stays in step.
  pub async fn create_note(
    &self,
    board_id: &str,
    mut input: NewNote,
    image: Option<Upload>,
  ) -> Result<Note> {
    if let Some(parent) = &input.in_reply_to {
      return Err(Error::validation(format!(
        "note replies to {parent}; post it as a reply instead"
      )));
    }
    let records = self.records();
    let board: Board = records.require(board_id).await?;

    let now = Utc::now();
    if let Some(value) = &input.vote_value {
      let agenda = board.agenda.as_ref().ok_or_else(|| {
        Error::validation(format!("board {board_id} does not take votes"))
      })?;
      agenda.accepts(value, now)?;
    }

    if input.attributed_to.is_none() {
      input.attributed_to = Some(board_id.to_owned());
    }
    let mut note = input.build(now)?;

    if let Some(file) = image {
      let url = self
        .uploader
        .upload_image(file, StorageCategory::Object, None)
        .await?;
      note.image = Some(url);
    }

    records.insert(&note).await?;
    info!(id = %note.id, board = board_id, actor = %note.actor, "note created");
    Ok(note)
  }

  /// Reply to a note: the reply is written and the parent's `repliesCount`
  /// bumped concurrently. The two writes are not atomic.
  pub async fn create_reply(&self, parent_id: &str, mut input: NewNote) -> Result<Note> {
    let records = self.records();
    let parent: Note = records.require(parent_id).await?;

    match input.in_reply_to.as_deref() {
      None => input.in_reply_to = Some(parent_id.to_owned()),
      Some(other) if other != parent_id => {
        return Err(Error::validation(format!(
          "reply addressed to {other} but posted under {parent_id}"
        )));
      }
      Some(_) => {}
    }
    let reply = input.build(Utc::now())?;

    let patch = to_document(&json!({ "repliesCount": parent.replies_count + 1 }))?;
    let (created, bumped) = tokio::join!(
      records.insert(&reply),
      records.patch::<Note>(parent_id, patch),
    );
    match (created, bumped) {
      (Ok(()), Ok(())) => {}
      (Err(e), Ok(())) => {
        warn!(parent = parent_id, "reply not stored but repliesCount was bumped");
        return Err(e);
      }
      (Ok(()), Err(e)) => {
        warn!(reply = %reply.id, parent = parent_id, "reply stored but repliesCount not bumped");
        return Err(e);
      }
      (Err(e), Err(_)) => return Err(e),
    }

    info!(id = %reply.id, parent = parent_id, actor = %reply.actor, "reply created");
    Ok(reply)
  }

  pub async fn get_note(&self, id: &str) -> Result<Note> {
    self.records().require(id).await
  }

  /// Soft-delete a note; it disappears from every default listing.
  pub async fn delete_note(&self, id: &str) -> Result<()> {
    self.records().soft_delete::<Note>(id).await?;
    info!(id, "note deleted");
    Ok(())
  }
}
