//! The `DocumentStore` trait and supporting query types.
//!
//! The trait models the managed document database the services talk to: named
//! collections of JSON documents keyed by their `id` field. Backends (e.g.
//! `locallink-store-sqlite`, or [`crate::memory::MemoryStore`] in tests)
//! implement it; the services in this crate only ever see the trait.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::Result;

/// A stored document: a JSON object whose `id` field is its primary key.
pub type Document = serde_json::Map<String, Value>;

// ─── Collections ─────────────────────────────────────────────────────────────

/// The named collections documents live in. The lowercase name is the wire
/// and storage name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
  Profile,
  Object,
  Activity,
  Board,
  Group,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// A single filter over a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  /// `field == value`. Comparing against `null` also matches absent fields.
  Eq(String, Value),
  /// `field` equals one of `values`. An empty list matches nothing.
  In(String, Vec<Value>),
}

/// The position of a document in the default `createdAt DESC, id DESC`
/// ordering. Used to resume a query strictly after a known document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
  pub created_at: DateTime<Utc>,
  pub id:         String,
}

impl SortKey {
  /// Read the sort key out of a stored document. Returns `None` when the
  /// document lacks a parseable `createdAt` or an `id`.
  pub fn of(doc: &Document) -> Option<Self> {
    let id = doc.get("id")?.as_str()?.to_owned();
    let created_at = doc
      .get("createdAt")?
      .as_str()
      .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
      .with_timezone(&Utc);
    Some(Self { created_at, id })
  }
}

/// Parameters for [`DocumentStore::query`].
///
/// All conditions must hold. Results are always ordered by `createdAt`
/// descending, ties broken by `id` descending.
#[derive(Debug, Clone, Default)]
pub struct DocQuery {
  pub conditions:      Vec<Condition>,
  /// If `false` (the default), documents with a non-null `deletedAt` are
  /// excluded.
  pub include_deleted: bool,
  /// Resume strictly after this position.
  pub start_after:     Option<SortKey>,
  pub limit:           Option<usize>,
}

impl DocQuery {
  pub fn new() -> Self { Self::default() }

  pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
    self.conditions.push(Condition::Eq(field.to_owned(), value.into()));
    self
  }

  pub fn is_in<V: Into<Value>>(
    mut self,
    field: &str,
    values: impl IntoIterator<Item = V>,
  ) -> Self {
    self.conditions.push(Condition::In(
      field.to_owned(),
      values.into_iter().map(Into::into).collect(),
    ));
    self
  }

  pub fn start_after(mut self, key: Option<SortKey>) -> Self {
    self.start_after = key;
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn include_deleted(mut self) -> Self {
    self.include_deleted = true;
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document database backend.
///
/// There are no cross-document transactions: each method is one independent
/// call, and concurrent read-modify-write sequences from callers race with
/// last-write-wins semantics.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new document. The document must carry a string `id`; a missing
  /// `createdAt` is filled with the current time.
  ///
  /// Returns `false` (and writes nothing) if the id is already taken.
  fn insert(
    &self,
    collection: Collection,
    doc: Document,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fetch a document by id, whether or not it is soft-deleted.
  fn get<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Run a filtered, ordered, paginated query.
  fn query<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Shallow-merge `patch` into the stored document and refresh `updatedAt`.
  /// Returns `false` if the document does not exist.
  fn update<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    patch: Document,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Mark a document deleted by setting `deletedAt`. The row is kept.
  /// Returns `false` if the document does not exist.
  fn soft_delete<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Typed records ───────────────────────────────────────────────────────────

/// An entity persisted as a document in a fixed collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
  const COLLECTION: Collection;

  fn id(&self) -> &str;
}

/// Serialise a record into a document, dropping `null` fields so that absent
/// and null stay indistinguishable in the store.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
  match serde_json::to_value(value)? {
    Value::Object(mut map) => {
      map.retain(|_, v| !v.is_null());
      Ok(map)
    }
    other => Err(crate::Error::validation(format!(
      "expected a JSON object, got {other}"
    ))),
  }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
  Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Render a timestamp the way every document stores it.
pub fn encode_timestamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
