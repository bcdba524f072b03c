//! JSON REST API for locallink.
//!
//! Exposes an axum [`Router`] backed by any
//! [`DocumentStore`](locallink_core::store::DocumentStore) and
//! [`ObjectStorage`](locallink_core::upload::ObjectStorage). TLS, sign-in,
//! and serving uploaded files are the caller's responsibility; the requesting
//! actor is whatever id the upstream identity layer puts in the
//! [`ACTOR_HEADER`](actor::ACTOR_HEADER) header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", locallink_api::api_router(ApiState::new(store, storage)))
//! ```

pub mod activities;
pub mod actor;
pub mod error;
pub mod groups;
pub mod notes;
pub mod profiles;
pub mod uploads;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use locallink_core::{
  account::AccountService,
  activity_log::ActivityLog,
  board::BoardService,
  feed::{DEFAULT_PAGE_SIZE, FeedComposer, FeedOptions},
  publish::Publisher,
  store::DocumentStore,
  upload::{ImageUploader, ObjectStorage},
};
use serde::Deserialize;

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// The services every handler works through, built once per router.
pub struct ApiState<S, F> {
  pub accounts:          AccountService<S, F>,
  pub boards:            BoardService<S, F>,
  pub publisher:         Publisher<S, F>,
  pub feed:              FeedComposer<S>,
  pub activities:        ActivityLog<S>,
  pub uploader:          ImageUploader<F>,
  pub default_page_size: usize,
}

impl<S: DocumentStore, F: ObjectStorage> ApiState<S, F> {
  pub fn new(store: Arc<S>, storage: Arc<F>) -> Self {
    Self {
      accounts:          AccountService::new(store.clone(), storage.clone()),
      boards:            BoardService::new(store.clone(), storage.clone()),
      publisher:         Publisher::new(store.clone(), storage.clone()),
      feed:              FeedComposer::new(store.clone()),
      activities:        ActivityLog::new(store),
      uploader:          ImageUploader::new(storage),
      default_page_size: DEFAULT_PAGE_SIZE,
    }
  }

  /// Avatar URL for profiles created without an image.
  pub fn with_default_image(mut self, url: Option<String>) -> Self {
    self.accounts = self.accounts.with_default_image(url);
    self
  }

  /// Page size used when a listing request does not name one.
  pub fn with_default_page_size(mut self, page_size: usize) -> Self {
    self.default_page_size = page_size;
    self
  }
}

/// Paging parameters shared by every listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  /// Id of the last item of the previous page.
  pub cursor:    Option<String>,
  pub page_size: Option<usize>,
}

impl PageParams {
  fn feed_options(self, default_page_size: usize, liked_by: Option<String>) -> FeedOptions {
    FeedOptions {
      cursor:      self.cursor,
      page_size:   self.page_size.unwrap_or(default_page_size),
      liked_actor: liked_by,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, F>(state: ApiState<S, F>) -> Router<()>
where
  S: DocumentStore + 'static,
  F: ObjectStorage + 'static,
{
  Router::new()
    // Profiles
    .route("/profiles", get(profiles::find::<S, F>).post(profiles::create::<S, F>))
    .route(
      "/profiles/{id}",
      get(profiles::get_one::<S, F>).patch(profiles::update::<S, F>),
    )
    .route("/profiles/{id}/image", put(profiles::put_image::<S, F>))
    // Groups and boards
    .route("/groups", get(groups::list::<S, F>).post(groups::create::<S, F>))
    .route(
      "/groups/{id}",
      get(groups::get_one::<S, F>).patch(groups::update::<S, F>),
    )
    .route(
      "/groups/{id}/boards",
      get(groups::list_boards::<S, F>).post(groups::create_board::<S, F>),
    )
    .route("/groups/{id}/agenda-boards", post(groups::create_agenda_board::<S, F>))
    .route("/boards/{id}", get(groups::get_board::<S, F>))
    // Notes
    .route(
      "/boards/{id}/notes",
      get(notes::board_feed::<S, F>).post(notes::publish::<S, F>),
    )
    .route(
      "/notes/{id}",
      get(notes::get_one::<S, F>).delete(notes::delete_one::<S, F>),
    )
    .route(
      "/notes/{id}/replies",
      get(notes::replies::<S, F>).post(notes::reply::<S, F>),
    )
    .route("/notes/{id}/like", post(notes::like::<S, F>))
    // Actors
    .route("/actors/{id}/notes", get(notes::actor_feed::<S, F>))
    .route("/actors/{id}/activities", get(activities::list::<S, F>))
    // Uploads
    .route("/uploads/{category}", post(uploads::create::<S, F>))
    .with_state(Arc::new(state))
}
