//! Handler for `GET /actors/:id/activities`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use locallink_core::{
  activity::ActivityType,
  activity_log::ActivityFilter,
  store::DocumentStore,
  upload::ObjectStorage,
  view::ActivityView,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to one activity type, e.g. `Like`.
  #[serde(rename = "type")]
  pub kind:      Option<ActivityType>,
  /// If `true`, attach each activity's object and its author.
  #[serde(default)]
  pub detail:    bool,
  pub cursor:    Option<String>,
  pub page_size: Option<usize>,
}

/// `GET /actors/:id/activities[?type=<type>][&detail=true][&cursor=<id>][&page_size=<n>]`
pub async fn list<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Path(id): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ActivityView>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let filter = ActivityFilter { actor: Some(id), kind: params.kind };
  let limit = params.page_size.unwrap_or(state.default_page_size);
  let cursor = params.cursor.as_deref();

  let views = if params.detail {
    state.activities.list_with_detail(&filter, cursor, limit).await?
  } else {
    state
      .activities
      .list(&filter, cursor, limit)
      .await?
      .into_iter()
      .map(ActivityView::from)
      .collect()
  };
  Ok(Json(views))
}
