//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use serde_json::Value;
use tracing::debug;

use locallink_core::store::{
  Collection, Condition, DocQuery, Document, DocumentStore, encode_timestamp,
};

use crate::{
  Error, Result,
  encode::{
    decode_document, document_id, encode_document, json_path, sql_value,
    timestamp_column,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A locallink document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Wrap a non-SQLite failure raised inside a connection closure.
fn other(e: impl std::error::Error + Send + Sync + 'static) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Build the `SELECT` for a [`DocQuery`]. Returns `None` when the query can
/// match nothing (an empty `In` list).
fn select_sql(collection: Collection, query: &DocQuery) -> Option<(String, Vec<SqlValue>)> {
  let mut conds: Vec<String> = vec!["collection = ?".into()];
  let mut params: Vec<SqlValue> = vec![SqlValue::Text(collection.to_string())];

  if !query.include_deleted {
    conds.push("deleted_at IS NULL".into());
  }

  for cond in &query.conditions {
    match cond {
      Condition::Eq(field, Value::Null) => {
        conds.push("json_extract(body_json, ?) IS NULL".into());
        params.push(SqlValue::Text(json_path(field)));
      }
      Condition::Eq(field, value) => {
        conds.push("json_extract(body_json, ?) = ?".into());
        params.push(SqlValue::Text(json_path(field)));
        params.push(sql_value(value));
      }
      Condition::In(_, values) if values.is_empty() => return None,
      Condition::In(field, values) => {
        let marks = vec!["?"; values.len()].join(", ");
        conds.push(format!("json_extract(body_json, ?) IN ({marks})"));
        params.push(SqlValue::Text(json_path(field)));
        params.extend(values.iter().map(sql_value));
      }
    }
  }

  if let Some(after) = &query.start_after {
    let created_at = encode_timestamp(after.created_at);
    conds.push("(created_at < ? OR (created_at = ? AND id < ?))".into());
    params.push(SqlValue::Text(created_at.clone()));
    params.push(SqlValue::Text(created_at));
    params.push(SqlValue::Text(after.id.clone()));
  }

  let mut sql = format!(
    "SELECT body_json FROM documents
     WHERE {}
     ORDER BY created_at DESC, id DESC",
    conds.join(" AND ")
  );
  if let Some(limit) = query.limit {
    sql.push_str(" LIMIT ?");
    params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
  }

  Some((sql, params))
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, collection: Collection, mut doc: Document) -> Result<bool> {
    let id = document_id(&doc)?;
    let created_at = match timestamp_column(&doc, "createdAt")? {
      Some(ts) => ts,
      None => {
        let now = encode_timestamp(Utc::now());
        doc.insert("createdAt".into(), Value::String(now.clone()));
        now
      }
    };
    let deleted_at = timestamp_column(&doc, "deletedAt")?;
    let body = encode_document(&doc)?;
    let collection = collection.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO documents (collection, id, created_at, deleted_at, body_json)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![collection, id, created_at, deleted_at, body],
        )?;
        Ok(n)
      })
      .await?;

    Ok(changed == 1)
  }

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
    let collection = collection.to_string();
    let id = id.to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        let body: Option<String> = conn
          .query_row(
            "SELECT body_json FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection, id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(body)
      })
      .await?;

    body.as_deref().map(decode_document).transpose()
  }

  async fn query(&self, collection: Collection, query: &DocQuery) -> Result<Vec<Document>> {
    let Some((sql, params)) = select_sql(collection, query) else {
      return Ok(Vec::new());
    };
    debug!(%collection, %sql, "query");

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    bodies.iter().map(|b| decode_document(b)).collect()
  }

  async fn update(&self, collection: Collection, id: &str, patch: Document) -> Result<bool> {
    let collection = collection.to_string();
    let id = id.to_owned();
    let now = encode_timestamp(Utc::now());

    // Read, merge and write back inside one transaction so a concurrent
    // update of the same row cannot interleave.
    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let body: Option<String> = tx
          .query_row(
            "SELECT body_json FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![collection, id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(body) = body else {
          return Ok(false);
        };

        let mut doc = decode_document(&body).map_err(other)?;
        for (k, v) in patch {
          if k != "id" {
            doc.insert(k, v);
          }
        }
        doc.insert("updatedAt".into(), Value::String(now));

        let deleted_at = timestamp_column(&doc, "deletedAt").map_err(other)?;
        let body = encode_document(&doc).map_err(other)?;
        tx.execute(
          "UPDATE documents SET body_json = ?3, deleted_at = ?4
           WHERE collection = ?1 AND id = ?2",
          rusqlite::params![collection, id, body, deleted_at],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(found)
  }

  async fn soft_delete(&self, collection: Collection, id: &str) -> Result<bool> {
    let now = encode_timestamp(Utc::now());
    let mut patch = Document::new();
    patch.insert("deletedAt".into(), Value::String(now));
    self.update(collection, id, patch).await
  }
}
