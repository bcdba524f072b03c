//! An in-memory [`DocumentStore`], used as the substitute backend in tests.
//!
//! Semantics mirror the SQLite backend: soft-deleted documents are hidden from
//! default queries, ordering is `createdAt DESC, id DESC`, and inserts never
//! overwrite.

use std::{
  collections::{BTreeMap, HashMap},
  convert::Infallible,
  sync::{PoisonError, RwLock},
};

use chrono::Utc;
use serde_json::Value;

use crate::store::{
  Collection, Condition, DocQuery, Document, DocumentStore, SortKey,
  encode_timestamp,
};

#[derive(Default)]
pub struct MemoryStore {
  collections: RwLock<HashMap<Collection, BTreeMap<String, Document>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Number of documents in `collection`, deleted or not.
  pub fn len(&self, collection: Collection) -> usize {
    self
      .collections
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(&collection)
      .map_or(0, BTreeMap::len)
  }

  pub fn is_empty(&self, collection: Collection) -> bool {
    self.len(collection) == 0
  }
}

fn is_deleted(doc: &Document) -> bool {
  doc.get("deletedAt").is_some_and(|v| !v.is_null())
}

fn matches(doc: &Document, cond: &Condition) -> bool {
  match cond {
    Condition::Eq(field, Value::Null) => {
      doc.get(field).is_none_or(Value::is_null)
    }
    Condition::Eq(field, value) => doc.get(field) == Some(value),
    Condition::In(field, values) => {
      doc.get(field).is_some_and(|v| values.contains(v))
    }
  }
}

impl DocumentStore for MemoryStore {
  type Error = Infallible;

  async fn insert(
    &self,
    collection: Collection,
    mut doc: Document,
  ) -> Result<bool, Infallible> {
    let Some(id) = doc.get("id").and_then(Value::as_str).map(str::to_owned)
    else {
      return Ok(false);
    };
    doc
      .entry("createdAt")
      .or_insert_with(|| Value::String(encode_timestamp(Utc::now())));

    let mut guard = self
      .collections
      .write()
      .unwrap_or_else(PoisonError::into_inner);
    let docs = guard.entry(collection).or_default();
    if docs.contains_key(&id) {
      return Ok(false);
    }
    docs.insert(id, doc);
    Ok(true)
  }

  async fn get(
    &self,
    collection: Collection,
    id: &str,
  ) -> Result<Option<Document>, Infallible> {
    let guard = self
      .collections
      .read()
      .unwrap_or_else(PoisonError::into_inner);
    Ok(guard.get(&collection).and_then(|docs| docs.get(id)).cloned())
  }

  async fn query(
    &self,
    collection: Collection,
    query: &DocQuery,
  ) -> Result<Vec<Document>, Infallible> {
    let guard = self
      .collections
      .read()
      .unwrap_or_else(PoisonError::into_inner);
    let Some(docs) = guard.get(&collection) else {
      return Ok(Vec::new());
    };

    let mut hits: Vec<(Option<SortKey>, &Document)> = docs
      .values()
      .filter(|d| query.include_deleted || !is_deleted(d))
      .filter(|d| query.conditions.iter().all(|c| matches(d, c)))
      .map(|d| (SortKey::of(d), d))
      .collect();

    // Newest first; documents without a sort key go last.
    hits.sort_by(|(a, _), (b, _)| b.cmp(a));

    if let Some(after) = &query.start_after {
      hits.retain(|(key, _)| key.as_ref().is_none_or(|k| k < after));
    }

    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(hits.into_iter().take(limit).map(|(_, d)| d.clone()).collect())
  }

  async fn update(
    &self,
    collection: Collection,
    id: &str,
    patch: Document,
  ) -> Result<bool, Infallible> {
    let mut guard = self
      .collections
      .write()
      .unwrap_or_else(PoisonError::into_inner);
    let Some(doc) = guard.get_mut(&collection).and_then(|d| d.get_mut(id))
    else {
      return Ok(false);
    };
    for (k, v) in patch {
      if k != "id" {
        doc.insert(k, v);
      }
    }
    doc.insert(
      "updatedAt".into(),
      Value::String(encode_timestamp(Utc::now())),
    );
    Ok(true)
  }

  async fn soft_delete(
    &self,
    collection: Collection,
    id: &str,
  ) -> Result<bool, Infallible> {
    let mut guard = self
      .collections
      .write()
      .unwrap_or_else(PoisonError::into_inner);
    let Some(doc) = guard.get_mut(&collection).and_then(|d| d.get_mut(id))
    else {
      return Ok(false);
    };
    let now = Value::String(encode_timestamp(Utc::now()));
    doc.insert("deletedAt".into(), now.clone());
    doc.insert("updatedAt".into(), now);
    Ok(true)
  }
}
