//! Handlers for notes: board and actor feeds, publishing, replies, likes.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/boards/:id/notes` | Feed; `?cursor`, `?page_size` |
//! | `POST`   | `/boards/:id/notes` | Body: `NewNote`; returns 201 + [`Published`] |
//! | `GET`    | `/notes/:id` | |
//! | `DELETE` | `/notes/:id` | Author only; soft delete |
//! | `GET`    | `/notes/:id/replies` | Feed of replies |
//! | `POST`   | `/notes/:id/replies` | Body: `NewNote`; returns 201 + [`Published`] |
//! | `POST`   | `/notes/:id/like` | Returns the [`Execution`] |
//! | `GET`    | `/actors/:id/notes` | Feed of one actor's notes |
//!
//! Feeds mark `isLiked` for the requesting actor when one is given.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use locallink_core::{
  executor::Execution,
  feed::FeedScope,
  object::{NewNote, Note},
  publish::Published,
  store::DocumentStore,
  upload::ObjectStorage,
  view::NoteView,
};
use tracing::info;

use crate::{
  ApiState, PageParams,
  actor::{Actor, MaybeActor},
  error::ApiError,
};

// ─── Feeds ───────────────────────────────────────────────────────────────────

/// `GET /boards/:id/notes[?cursor=<id>][&page_size=<n>]`
pub async fn board_feed<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  MaybeActor(requester): MaybeActor,
  Path(id): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<NoteView>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  state.boards.get_board(&id).await?;
  let options = params.feed_options(state.default_page_size, requester);
  Ok(Json(state.feed.list_notes(&FeedScope::Board(id), &options).await?))
}

/// `GET /actors/:id/notes[?cursor=<id>][&page_size=<n>]`
pub async fn actor_feed<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  MaybeActor(requester): MaybeActor,
  Path(id): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<NoteView>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let options = params.feed_options(state.default_page_size, requester);
  Ok(Json(state.feed.list_notes(&FeedScope::Actor(id), &options).await?))
}

/// `GET /notes/:id/replies[?cursor=<id>][&page_size=<n>]`
pub async fn replies<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  MaybeActor(requester): MaybeActor,
  Path(id): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<NoteView>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  state.boards.get_note(&id).await?;
  let options = params.feed_options(state.default_page_size, requester);
  Ok(Json(state.feed.list_replies(&id, &options).await?))
}

// ─── Single notes ────────────────────────────────────────────────────────────

/// `GET /notes/:id`
pub async fn get_one<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Path(id): Path<String>,
) -> Result<Json<Note>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  Ok(Json(state.boards.get_note(&id).await?))
}

/// `DELETE /notes/:id` — 204 on success.
pub async fn delete_one<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let note = state.boards.get_note(&id).await?;
  if note.actor != actor {
    return Err(ApiError::Forbidden(format!("{actor} did not write note {id}")));
  }
  state.boards.delete_note(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /boards/:id/notes` — the note is written as the requesting actor.
pub async fn publish<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
  Json(mut body): Json<NewNote>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  body.actor = actor;
  let published: Published = state.publisher.publish_note(&id, body, None).await?;
  Ok((StatusCode::CREATED, Json(published)))
}

/// `POST /notes/:id/replies`
pub async fn reply<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
  Json(mut body): Json<NewNote>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  body.actor = actor;
  let published = state.publisher.publish_reply(&id, body).await?;
  Ok((StatusCode::CREATED, Json(published)))
}

/// `POST /notes/:id/like`
pub async fn like<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
) -> Result<Json<Execution>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let execution = state.publisher.like_note(&actor, &id).await?;
  info!(%actor, note = %id, applied = execution.is_applied(), "note liked");
  Ok(Json(execution))
}
