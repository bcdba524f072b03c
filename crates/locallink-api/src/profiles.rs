//! Handlers for `/profiles` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/profiles` | Body: [`CreateBody`]; id is the requesting actor |
//! | `GET`   | `/profiles` | `?name=` exact match |
//! | `GET`   | `/profiles/:id` | 404 if missing or deleted |
//! | `PATCH` | `/profiles/:id` | Own profile only; body: `ProfilePatch` |
//! | `PUT`   | `/profiles/:id/image` | Own profile only; raw image body |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use locallink_core::{
  profile::{NewProfile, Profile, ProfilePatch},
  store::DocumentStore,
  upload::ObjectStorage,
};
use serde::Deserialize;

use crate::{ApiState, actor::Actor, error::ApiError, uploads::upload_from};

fn own_profile(actor: &str, id: &str) -> Result<(), ApiError> {
  if actor != id {
    return Err(ApiError::Forbidden(format!("{actor} cannot edit profile {id}")));
  }
  Ok(())
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /profiles`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:    String,
  pub email:   String,
  pub summary: Option<String>,
  pub image:   Option<String>,
}

/// `POST /profiles` — returns 201 + the stored profile.
pub async fn create<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  let input = NewProfile {
    id:      actor,
    name:    body.name,
    email:   body.email,
    summary: body.summary,
    image:   body.image,
  };
  let profile = state.accounts.create_profile(input, None).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Read ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FindParams {
  pub name: String,
}

/// `GET /profiles?name=<name>`
pub async fn find<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Query(params): Query<FindParams>,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  Ok(Json(state.accounts.find_by_name(&params.name).await?))
}

/// `GET /profiles/:id`
pub async fn get_one<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  Ok(Json(state.accounts.get_profile(&id).await?))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /profiles/:id`
pub async fn update<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
  Json(patch): Json<ProfilePatch>,
) -> Result<Json<Profile>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  own_profile(&actor, &id)?;
  Ok(Json(state.accounts.update_profile(&id, patch).await?))
}

/// `PUT /profiles/:id/image` — body is the image itself, typed by
/// `Content-Type`.
pub async fn put_image<S, F>(
  State(state): State<Arc<ApiState<S, F>>>,
  Actor(actor): Actor,
  Path(id): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Profile>, ApiError>
where
  S: DocumentStore,
  F: ObjectStorage,
{
  own_profile(&actor, &id)?;
  let upload = upload_from(&headers, None, body);
  Ok(Json(state.accounts.update_profile_image(&id, upload).await?))
}
