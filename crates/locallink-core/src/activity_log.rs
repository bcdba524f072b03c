//! Read access to the activity ledger.

use std::sync::Arc;

use crate::{
  Error, Result,
  activity::{Activity, ActivityType},
  feed::{check_page_size, join_profiles},
  object::Note,
  records::Records,
  store::{DocQuery, DocumentStore},
  view::{ActivityView, NoteView},
};

#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
  pub actor: Option<String>,
  pub kind:  Option<ActivityType>,
}

pub struct ActivityLog<S> {
  store: Arc<S>,
}

impl<S: DocumentStore> ActivityLog<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Activities matching `filter`, newest first. At least one filter field
  /// must be set.
  pub async fn list(
    &self,
    filter: &ActivityFilter,
    cursor: Option<&str>,
    limit: usize,
  ) -> Result<Vec<Activity>> {
    check_page_size(limit)?;
    let mut query = DocQuery::new();
    if let Some(actor) = &filter.actor {
      query = query.eq("actor", actor.as_str());
    }
    if let Some(kind) = filter.kind {
      query = query.eq("type", kind.to_string());
    }
    if query.conditions.is_empty() {
      return Err(Error::validation("filter by actor or type"));
    }

    let records = Records::new(self.store.as_ref());
    let query = query
      .start_after(records.cursor::<Activity>(cursor).await?)
      .limit(limit);
    records.query(&query).await
  }

  /// Like [`ActivityLog::list`], with each activity's object (and that
  /// object's author) attached. Objects are fetched in one batch, deleted
  /// ones included.
  pub async fn list_with_detail(
    &self,
    filter: &ActivityFilter,
    cursor: Option<&str>,
    limit: usize,
  ) -> Result<Vec<ActivityView>> {
    let activities = self.list(filter, cursor, limit).await?;
    let object_ids: Vec<&str> =
      activities.iter().filter_map(|a| a.object.as_deref()).collect();
    if object_ids.is_empty() {
      return Ok(activities.into_iter().map(ActivityView::from).collect());
    }

    let query = DocQuery::new().is_in("id", object_ids).include_deleted();
    let notes: Vec<Note> = Records::new(self.store.as_ref()).query(&query).await?;
    let mut details: Vec<NoteView> = notes.into_iter().map(NoteView::from).collect();
    join_profiles(self.store.as_ref(), &mut details).await?;

    Ok(
      activities
        .into_iter()
        .map(|activity| {
          let object_detail = activity
            .object
            .as_deref()
            .and_then(|id| details.iter().find(|d| d.note.id == id))
            .cloned();
          ActivityView { activity, profile: None, object_detail }
        })
        .collect(),
    )
  }
}
