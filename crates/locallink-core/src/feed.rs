//! The feed composer: paginated note listings with author and like joins.
//!
//! Every page is enriched the same way. The authors of all notes on a page
//! are resolved with a single batched profile query, and when a requester is
//! given, a single batched activity query marks the notes they liked. Both
//! joins are best-effort: a failed join is logged and the page is returned
//! without that data.

use std::{collections::BTreeSet, sync::Arc};

use serde_json::Value;
use tracing::warn;

use crate::{
  Error, Result,
  activity::{Activity, ActivityType},
  object::{Note, ObjectType},
  profile::Profile,
  records::Records,
  store::{DocQuery, DocumentStore},
  view::NoteView,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Reject page sizes outside `1..=MAX_PAGE_SIZE`. Every paged listing goes
/// through this.
pub fn check_page_size(page_size: usize) -> Result<()> {
  if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
    return Err(Error::validation(format!(
      "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
    )));
  }
  Ok(())
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Which notes a feed lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
  /// Top-level notes attributed to a board.
  Board(String),
  /// Every note written by an actor.
  Actor(String),
  /// Replies to a note.
  Replies(String),
}

impl FeedScope {
  fn query(&self) -> DocQuery {
    let notes = DocQuery::new().eq("type", ObjectType::Note.as_str());
    match self {
      Self::Board(id) => notes
        .eq("attributedTo", id.as_str())
        .eq("inReplyTo", Value::Null),
      Self::Actor(id) => notes.eq("actor", id.as_str()),
      Self::Replies(id) => notes.eq("inReplyTo", id.as_str()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
  /// Id of the last note of the previous page.
  pub cursor:      Option<String>,
  pub page_size:   usize,
  /// When set, each note's `isLiked` reflects whether this actor liked it.
  pub liked_actor: Option<String>,
}

impl Default for FeedOptions {
  fn default() -> Self {
    Self { cursor: None, page_size: DEFAULT_PAGE_SIZE, liked_actor: None }
  }
}

impl FeedOptions {
  pub fn page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size;
    self
  }

  pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
    self.cursor = Some(cursor.into());
    self
  }

  pub fn liked_by(mut self, actor: impl Into<String>) -> Self {
    self.liked_actor = Some(actor.into());
    self
  }
}

// ─── Composer ────────────────────────────────────────────────────────────────

pub struct FeedComposer<S> {
  store: Arc<S>,
}

impl<S: DocumentStore> FeedComposer<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// One page of live notes, newest first.
  pub async fn list_notes(
    &self,
    scope: &FeedScope,
    options: &FeedOptions,
  ) -> Result<Vec<NoteView>> {
    check_page_size(options.page_size)?;

    let records = Records::new(self.store.as_ref());
    let start_after = records.cursor::<Note>(options.cursor.as_deref()).await?;

    let query = scope
      .query()
      .start_after(start_after)
      .limit(options.page_size);
    let notes: Vec<Note> = records.query(&query).await?;
    let mut page: Vec<NoteView> = notes.into_iter().map(NoteView::from).collect();
    if page.is_empty() {
      return Ok(page);
    }

    if let Err(e) = join_profiles(self.store.as_ref(), &mut page).await {
      warn!(error = %e, "profile join failed; returning page without profiles");
    }
    if let Some(actor) = &options.liked_actor
      && let Err(e) = join_likes(self.store.as_ref(), &mut page, actor).await
    {
      warn!(error = %e, %actor, "like join failed; returning page without like state");
    }

    Ok(page)
  }

  /// One page of replies to `note_id`.
  pub async fn list_replies(
    &self,
    note_id: &str,
    options: &FeedOptions,
  ) -> Result<Vec<NoteView>> {
    self
      .list_notes(&FeedScope::Replies(note_id.to_owned()), options)
      .await
  }

  /// Walk a feed page by page, starting from `options.cursor`.
  pub fn pages(&self, scope: FeedScope, options: FeedOptions) -> FeedPager<'_, S> {
    FeedPager { composer: self, scope, options, done: false }
  }
}

/// A finite, restartable walk over a feed. The current cursor can be read at
/// any point to resume later with a fresh pager.
pub struct FeedPager<'a, S> {
  composer: &'a FeedComposer<S>,
  scope:    FeedScope,
  options:  FeedOptions,
  done:     bool,
}

impl<S: DocumentStore> FeedPager<'_, S> {
  pub async fn next_page(&mut self) -> Result<Option<Vec<NoteView>>> {
    if self.done {
      return Ok(None);
    }
    let page = self.composer.list_notes(&self.scope, &self.options).await?;
    if page.len() < self.options.page_size {
      self.done = true;
    }
    let Some(last) = page.last() else {
      return Ok(None);
    };
    self.options.cursor = Some(last.note.id.clone());
    Ok(Some(page))
  }

  pub fn cursor(&self) -> Option<&str> { self.options.cursor.as_deref() }
}

// ─── Joins ───────────────────────────────────────────────────────────────────

/// Attach each note's author profile using one batched lookup for all
/// distinct authors.
pub(crate) async fn join_profiles<S: DocumentStore>(
  store: &S,
  notes: &mut [NoteView],
) -> Result<()> {
  let actors: BTreeSet<&str> = notes
    .iter()
    .map(|n| n.note.actor.as_str())
    .filter(|a| !a.is_empty())
    .collect();
  if actors.is_empty() {
    return Ok(());
  }

  let query = DocQuery::new().is_in("id", actors);
  let profiles: Vec<Profile> = Records::new(store).query(&query).await?;
  for view in notes.iter_mut() {
    view.profile = profiles.iter().find(|p| p.id == view.note.actor).cloned();
  }
  Ok(())
}

/// Set `isLiked` on every note according to `actor`'s like activities, using
/// one batched lookup.
pub(crate) async fn join_likes<S: DocumentStore>(
  store: &S,
  notes: &mut [NoteView],
  actor: &str,
) -> Result<()> {
  let query = DocQuery::new()
    .eq("type", ActivityType::Like.to_string())
    .eq("actor", actor)
    .is_in("object", notes.iter().map(|n| n.note.id.as_str()));
  let likes: Vec<Activity> = Records::new(store).query(&query).await?;

  let liked: BTreeSet<&str> =
    likes.iter().filter_map(|a| a.object.as_deref()).collect();
  for view in notes.iter_mut() {
    view.is_liked = Some(liked.contains(view.note.id.as_str()));
  }
  Ok(())
}
