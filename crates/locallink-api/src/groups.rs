//! Handlers for `/groups` and `/boards/:id` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/groups` | `?cursor`, `?page_size` |
//! | `POST`  | `/groups` | Body: `NewGroup` |
//! | `GET`   | `/groups/:id` | |
//! | `PATCH` | `/groups/:id` | Body: `GroupPatch` |
//! | `GET`   | `/groups/:id/boards` | Boards and agenda boards of the group |
//! | `POST`  | `/groups/:id/boards` | Body: `NewBoard` |
//! | `POST`  | `/groups/:id/agenda-boards` | Body: `NewAgendaBoard` |
//! | `GET`   | `/boards/:id` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use locallink_core::{
  object::{Board, Group, GroupPatch, NewAgendaBoard, NewBoard, NewGroup},
  store::DocumentStore,
  upload::ObjectStorage,
};

use crate::{ApiState, PageParams, actor::Actor, error::ApiError};

// ─── Groups ──────────────────────────────────────────────────────────────────

/// `GET /groups[?cursor=<id>][&page_size=<n>]`
pub async fn list<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Vec<Group>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let limit = params.page_size.unwrap_or(state.default_page_size);
  let groups = state
    .boards
    .list_groups(params.cursor.as_deref(), limit)
    .await?;
  Ok(Json(groups))
}

/// `POST /groups` — returns 201 + the stored group.
pub async fn create<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(_actor): Actor,
  Json(body): Json<NewGroup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let group = state.boards.create_group(body).await?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/:id`
pub async fn get_one<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Path(id): Path<String>,
) -> Result<Json<Group>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  Ok(Json(state.boards.get_group(&id).await?))
}

/// `PATCH /groups/:id`
pub async fn update<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(_actor): Actor,
  Path(id): Path<String>,
  Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  Ok(Json(state.boards.update_group(&id, patch).await?))
}

// ─── Boards ──────────────────────────────────────────────────────────────────

/// `GET /groups/:id/boards`
pub async fn list_boards<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Board>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  state.boards.get_group(&id).await?;
  Ok(Json(state.boards.list_boards(&id).await?))
}

/// `POST /groups/:id/boards` — the board is attributed to the group in the
/// path and created by the requesting actor unless the body names one.
pub async fn create_board<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
  Json(mut body): Json<NewBoard>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  body.attributed_to = id;
  body.actor.get_or_insert(actor);
  let board = state.boards.create_board(body).await?;
  Ok((StatusCode::CREATED, Json(board)))
}

/// `POST /groups/:id/agenda-boards`
pub async fn create_agenda_board<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
  Json(mut body): Json<NewAgendaBoard>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  body.board.attributed_to = id;
  body.board.actor.get_or_insert(actor);
  let board = state.boards.create_agenda_board(body).await?;
  Ok((StatusCode::CREATED, Json(board)))
}

/// `GET /boards/:id`
pub async fn get_board<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Path(id): Path<String>,
) -> Result<Json<Board>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  Ok(Json(state.boards.get_board(&id).await?))
}
