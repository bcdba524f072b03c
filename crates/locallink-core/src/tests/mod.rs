//! Service tests against the in-memory store.
//!
//! [`TestStore`] wraps [`MemoryStore`] to record every query and to inject
//! backend failures per collection.

mod board;

use std::{
  collections::HashSet,
  convert::Infallible,
  sync::{Arc, Mutex},
};

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};

use crate::{
  memory::MemoryStore,
  object::{NewBoard, NewGroup, NewNote, Note},
  profile::{NewProfile, Profile},
  records::Records,
  store::{Collection, DocQuery, Document, DocumentStore},
  upload::{ObjectStorage, Upload},
};

#[derive(Debug, thiserror::Error)]
#[error("injected backend failure")]
pub struct Injected;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  Insert,
  Query,
  Update,
}

#[derive(Default)]
pub struct TestStore {
  pub inner: MemoryStore,
  queries:   Mutex<Vec<(Collection, DocQuery)>>,
  failing:   Mutex<HashSet<(Op, Collection)>>,
}

impl TestStore {
  pub fn fail(&self, op: Op, collection: Collection) {
    self.failing.lock().unwrap().insert((op, collection));
  }

  pub fn queries_on(&self, collection: Collection) -> usize {
    self
      .queries
      .lock()
      .unwrap()
      .iter()
      .filter(|(c, _)| *c == collection)
      .count()
  }

  pub fn reset_queries(&self) { self.queries.lock().unwrap().clear(); }

  fn check(&self, op: Op, collection: Collection) -> Result<(), Injected> {
    if self.failing.lock().unwrap().contains(&(op, collection)) {
      return Err(Injected);
    }
    Ok(())
  }
}

impl DocumentStore for TestStore {
  type Error = Injected;

  async fn insert(&self, collection: Collection, doc: Document) -> Result<bool, Injected> {
    self.check(Op::Insert, collection)?;
    Ok(self.inner.insert(collection, doc).await.unwrap_or_else(|e| match e {}))
  }

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, Injected> {
    Ok(self.inner.get(collection, id).await.unwrap_or_else(|e| match e {}))
  }

  async fn query(
    &self,
    collection: Collection,
    query: &DocQuery,
  ) -> Result<Vec<Document>, Injected> {
    self.queries.lock().unwrap().push((collection, query.clone()));
    self.check(Op::Query, collection)?;
    Ok(self.inner.query(collection, query).await.unwrap_or_else(|e| match e {}))
  }

  async fn update(
    &self,
    collection: Collection,
    id: &str,
    patch: Document,
  ) -> Result<bool, Injected> {
    self.check(Op::Update, collection)?;
    Ok(self.inner.update(collection, id, patch).await.unwrap_or_else(|e| match e {}))
  }

  async fn soft_delete(&self, collection: Collection, id: &str) -> Result<bool, Injected> {
    Ok(self.inner.soft_delete(collection, id).await.unwrap_or_else(|e| match e {}))
  }
}

/// Object storage that records every call instead of uploading.
#[derive(Default)]
pub struct FakeStorage {
  pub puts: Mutex<Vec<(String, String)>>,
}

impl FakeStorage {
  pub fn calls(&self) -> usize { self.puts.lock().unwrap().len() }
}

impl ObjectStorage for FakeStorage {
  type Error = Infallible;

  async fn put(
    &self,
    key: String,
    content_type: String,
    _data: Bytes,
  ) -> Result<String, Infallible> {
    let url = format!("https://files.test/{key}");
    self.puts.lock().unwrap().push((key, content_type));
    Ok(url)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn stores() -> (Arc<TestStore>, Arc<FakeStorage>) {
  (Arc::new(TestStore::default()), Arc::new(FakeStorage::default()))
}

pub fn minutes_ago(n: i64) -> DateTime<Utc> { Utc::now() - Duration::minutes(n) }

pub fn png(name: &str) -> Upload {
  Upload {
    file_name:    name.to_owned(),
    content_type: "image/png".to_owned(),
    data:         Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
  }
}

pub async fn seed_profile(store: &TestStore, id: &str, points: u64) -> Profile {
  let mut profile = NewProfile {
    id:    id.to_owned(),
    name:  format!("user {id}"),
    email: format!("{id}@example.com"),
    ..NewProfile::default()
  }
  .build(Utc::now())
  .unwrap();
  profile.activity_point = points;
  Records::new(store).insert(&profile).await.unwrap();
  profile
}

/// A group with one board; returns the board id.
pub async fn seed_board(store: &TestStore, board_id: &str) -> String {
  let records = Records::new(store);
  let group = NewGroup {
    name: "neighbourhood".into(),
    ..NewGroup::default()
  }
  .build(Utc::now())
  .unwrap();
  records.insert(&group).await.unwrap();

  let board = NewBoard {
    id: Some(board_id.to_owned()),
    name: "free talk".into(),
    attributed_to: group.id,
    ..NewBoard::default()
  }
  .build(Utc::now())
  .unwrap();
  records.insert(&board).await.unwrap();
  board_id.to_owned()
}

/// Store a note written `age` minutes ago directly, bypassing the services.
pub async fn seed_note(store: &TestStore, id: &str, board: &str, actor: &str, age: i64) -> Note {
  let mut input = NewNote::new(actor, format!("note {id}"));
  input.id = Some(id.to_owned());
  input.attributed_to = Some(board.to_owned());
  let note = input.build(minutes_ago(age)).unwrap();
  Records::new(store).insert(&note).await.unwrap();
  note
}

pub async fn load_note(store: &TestStore, id: &str) -> Note {
  Records::new(store).get(id).await.unwrap().unwrap()
}

pub async fn load_profile(store: &TestStore, id: &str) -> Profile {
  Records::new(store).get(id).await.unwrap().unwrap()
}
