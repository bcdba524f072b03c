//! Typed access to a [`DocumentStore`].
//!
//! Every service goes through [`Records`], which converts between entities and
//! documents and maps backend failures onto the crate error taxonomy: backend
//! errors become [`Error::StoreUnavailable`], missing ids [`Error::NotFound`]
//! and id collisions [`Error::Conflict`].

use tracing::debug;

use crate::{
  Error, Result,
  store::{
    DocQuery, Document, DocumentStore, Record, SortKey, from_document,
    to_document,
  },
};

pub struct Records<'a, S> {
  store: &'a S,
}

impl<'a, S: DocumentStore> Records<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
    let doc = self
      .store
      .get(T::COLLECTION, id)
      .await
      .map_err(Error::store)?;
    doc.map(from_document).transpose()
  }

  /// Like [`Records::get`], but a missing or soft-deleted record is an error.
  pub async fn require<T: Record>(&self, id: &str) -> Result<T> {
    let doc = self
      .store
      .get(T::COLLECTION, id)
      .await
      .map_err(Error::store)?
      .filter(|d| d.get("deletedAt").is_none_or(|v| v.is_null()))
      .ok_or_else(|| Error::not_found(T::COLLECTION, id))?;
    from_document(doc)
  }

  pub async fn insert<T: Record>(&self, record: &T) -> Result<()> {
    let doc = to_document(record)?;
    debug!(collection = %T::COLLECTION, id = record.id(), "insert");
    let inserted = self
      .store
      .insert(T::COLLECTION, doc)
      .await
      .map_err(Error::store)?;
    if !inserted {
      return Err(Error::Conflict {
        collection: T::COLLECTION,
        id:         record.id().to_owned(),
      });
    }
    Ok(())
  }

  pub async fn patch<T: Record>(&self, id: &str, patch: Document) -> Result<()> {
    debug!(collection = %T::COLLECTION, id, fields = patch.len(), "update");
    let found = self
      .store
      .update(T::COLLECTION, id, patch)
      .await
      .map_err(Error::store)?;
    if !found {
      return Err(Error::not_found(T::COLLECTION, id));
    }
    Ok(())
  }

  /// Write back every field of `record`.
  pub async fn replace<T: Record>(&self, record: &T) -> Result<()> {
    let doc = to_document(record)?;
    self.patch::<T>(record.id(), doc).await
  }

  pub async fn query<T: Record>(&self, query: &DocQuery) -> Result<Vec<T>> {
    debug!(collection = %T::COLLECTION, ?query, "query");
    self
      .store
      .query(T::COLLECTION, query)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(from_document)
      .collect()
  }

  pub async fn soft_delete<T: Record>(&self, id: &str) -> Result<()> {
    let found = self
      .store
      .soft_delete(T::COLLECTION, id)
      .await
      .map_err(Error::store)?;
    if !found {
      return Err(Error::not_found(T::COLLECTION, id));
    }
    Ok(())
  }

  /// Resolve a pagination cursor (the id of the last item of the previous
  /// page) to its sort key. The cursor may name a soft-deleted record.
  pub async fn cursor<T: Record>(&self, cursor: Option<&str>) -> Result<Option<SortKey>> {
    let Some(id) = cursor else {
      return Ok(None);
    };
    let doc = self
      .store
      .get(T::COLLECTION, id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found(T::COLLECTION, id))?;
    SortKey::of(&doc)
      .map(Some)
      .ok_or_else(|| Error::validation(format!("cursor {id} has no sort key")))
  }
}
