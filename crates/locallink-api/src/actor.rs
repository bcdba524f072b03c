//! Extractors for the requesting actor.
//!
//! Identity is established upstream; this layer only reads the profile id
//! the identity layer forwards in [`ACTOR_HEADER`].

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

fn requester(parts: &Parts) -> Option<String> {
  parts
    .headers
    .get(ACTOR_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .map(str::to_owned)
}

/// The authenticated actor. Rejects with 401 when the header is absent.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    requester(parts).map(Actor).ok_or(ApiError::Unauthorized)
  }
}

/// The actor, if any. Read endpoints use it to personalise results.
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeActor {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    Ok(MaybeActor(requester(parts)))
  }
}
