use chrono::{Duration, Utc};

use super::*;
use crate::{
  Error,
  board::BoardService,
  executor::Execution,
  feed::{FeedComposer, FeedOptions, MAX_PAGE_SIZE},
  object::{GroupPatch, NewAgendaBoard, ObjectType, SUMMARY_LEN},
  publish::Publisher,
};

fn agenda(group: &str, options: &[&str], opens: i64, closes: i64) -> NewAgendaBoard {
  NewAgendaBoard {
    board:        NewBoard {
      id: Some("agenda".into()),
      name: "next cleanup day".into(),
      attributed_to: group.to_owned(),
      ..NewBoard::default()
    },
    start_time:   Utc::now() + Duration::hours(opens),
    end_time:     Utc::now() + Duration::hours(closes),
    vote_options: options.iter().map(|o| o.to_string()).collect(),
  }
}

async fn group(boards: &BoardService<TestStore, FakeStorage>) -> String {
  boards
    .create_group(NewGroup { name: "riverside".into(), ..NewGroup::default() })
    .await
    .unwrap()
    .id
}

// ─── Builders ────────────────────────────────────────────────────────────────

#[test]
fn note_summary_defaults_to_leading_content() {
  let long = "가".repeat(SUMMARY_LEN + 20);
  let note = NewNote::new("alice", long.clone()).build(Utc::now()).unwrap();
  assert_eq!(note.summary.unwrap().chars().count(), SUMMARY_LEN);
  assert_eq!(note.kind, ObjectType::Note);
  assert_eq!((note.like_count, note.replies_count), (0, 0));

  let mut input = NewNote::new("alice", long);
  input.summary = Some("custom".into());
  assert_eq!(input.build(Utc::now()).unwrap().summary.as_deref(), Some("custom"));
}

#[test]
fn note_requires_actor_and_content() {
  for input in [NewNote::new("", "hi"), NewNote::new("alice", "  ")] {
    assert!(matches!(input.build(Utc::now()), Err(Error::Validation(_))));
  }
}

#[test]
fn agenda_board_rejects_bad_windows_and_options() {
  let cases = [
    agenda("g", &["yes", "no"], 2, 1),
    agenda("g", &["yes"], 0, 1),
    agenda("g", &["yes", "yes"], 0, 1),
    agenda("g", &["yes", " "], 0, 1),
  ];
  for input in cases {
    assert!(matches!(input.build(Utc::now()), Err(Error::Validation(_))));
  }

  let board = agenda("g", &["yes", "no"], -1, 1).build(Utc::now()).unwrap();
  assert_eq!(board.kind, ObjectType::AgendaBoard);
  assert_eq!(board.agenda.unwrap().vote_options, ["yes", "no"]);
}

// ─── Groups and boards ───────────────────────────────────────────────────────

#[tokio::test]
async fn boards_need_an_existing_group() {
  let (store, files) = stores();
  let boards = BoardService::new(store.clone(), files);

  let err = boards
    .create_board(NewBoard {
      name: "orphan".into(),
      attributed_to: "missing".into(),
      ..NewBoard::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { collection: Collection::Group, .. }));

  let group_id = group(&boards).await;
  boards
    .create_board(NewBoard {
      name: "free talk".into(),
      attributed_to: group_id.clone(),
      ..NewBoard::default()
    })
    .await
    .unwrap();
  boards
    .create_agenda_board(agenda(&group_id, &["yes", "no"], -1, 1))
    .await
    .unwrap();

  let listed = boards.list_boards(&group_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert!(listed.iter().any(|b| b.agenda.is_some()));
}

#[tokio::test]
async fn group_patch_keeps_untouched_fields() {
  let (store, files) = stores();
  let boards = BoardService::new(store.clone(), files);
  let id = boards
    .create_group(NewGroup {
      name: "riverside".into(),
      summary: Some("by the water".into()),
      ..NewGroup::default()
    })
    .await
    .unwrap()
    .id;

  let updated = boards
    .update_group(&id, GroupPatch {
      name: Some("riverbank".into()),
      ..GroupPatch::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.name, "riverbank");
  assert_eq!(updated.summary.as_deref(), Some("by the water"));
  assert!(updated.updated_at.is_some());

  let blank = GroupPatch { name: Some(" ".into()), ..GroupPatch::default() };
  assert!(matches!(
    boards.update_group(&id, blank).await,
    Err(Error::Validation(_))
  ));
}

#[tokio::test]
async fn duplicate_group_id_conflicts() {
  let (store, files) = stores();
  let boards = BoardService::new(store.clone(), files);
  let input = NewGroup {
    id: Some("g1".into()),
    name: "riverside".into(),
    ..NewGroup::default()
  };
  boards.create_group(input.clone()).await.unwrap();
  let err = boards.create_group(input).await.unwrap_err();
  assert!(matches!(err, Error::Conflict { .. }));
}

#[tokio::test]
async fn group_listing_bounds_the_page_size() {
  let (store, files) = stores();
  let boards = BoardService::new(store.clone(), files);
  group(&boards).await;

  for size in [0, MAX_PAGE_SIZE + 1, 1_000_000] {
    let err = boards.list_groups(None, size).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "page size {size}");
  }
  assert_eq!(store.queries_on(Collection::Group), 0);

  assert_eq!(boards.list_groups(None, MAX_PAGE_SIZE).await.unwrap().len(), 1);
}

// ─── Notes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn note_is_attributed_to_its_board() {
  let (store, files) = stores();
  seed_board(&store, "b1").await;
  let boards = BoardService::new(store.clone(), files);

  let note = boards
    .create_note("b1", NewNote::new("alice", "hello"), None)
    .await
    .unwrap();
  assert_eq!(note.attributed_to.as_deref(), Some("b1"));
  assert_eq!(load_note(&store, &note.id).await, note);
}

#[tokio::test]
async fn note_on_missing_board_is_not_found() {
  let (store, files) = stores();
  let err = BoardService::new(store.clone(), files)
    .create_note("nope", NewNote::new("alice", "hello"), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { collection: Collection::Board, .. }));
  assert!(store.inner.is_empty(Collection::Object));
}

#[tokio::test]
async fn note_image_is_uploaded_under_object() {
  let (store, files) = stores();
  seed_board(&store, "b1").await;

  let note = BoardService::new(store.clone(), files.clone())
    .create_note("b1", NewNote::new("alice", "look"), Some(png("river.png")))
    .await
    .unwrap();

  assert_eq!(note.image.as_deref(), Some("https://files.test/object/river.png"));
  let puts = files.puts.lock().unwrap();
  assert_eq!(*puts, [("object/river.png".to_owned(), "image/png".to_owned())]);
}

#[tokio::test]
async fn votes_are_checked_against_the_agenda() {
  let (store, files) = stores();
  seed_board(&store, "plain").await;
  let boards = BoardService::new(store.clone(), files);
  let group_id = group(&boards).await;
  boards
    .create_agenda_board(agenda(&group_id, &["yes", "no"], -1, 1))
    .await
    .unwrap();

  let vote = |value: &str| {
    let mut input = NewNote::new("alice", "my vote");
    input.vote_value = Some(value.to_owned());
    input
  };

  let cast = boards.create_note("agenda", vote("yes"), None).await.unwrap();
  assert_eq!(cast.vote_value.as_deref(), Some("yes"));

  for (board, value) in [("agenda", "maybe"), ("plain", "yes")] {
    let err = boards.create_note(board, vote(value), None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{board}/{value}");
  }
}

#[tokio::test]
async fn votes_outside_the_window_are_rejected() {
  let (store, files) = stores();
  let boards = BoardService::new(store.clone(), files);
  let group_id = group(&boards).await;
  boards
    .create_agenda_board(agenda(&group_id, &["yes", "no"], 1, 2))
    .await
    .unwrap();

  let mut input = NewNote::new("alice", "too early");
  input.vote_value = Some("yes".into());
  let err = boards.create_note("agenda", input, None).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn reply_bumps_parent_count_once() {
  let (store, files) = stores();
  seed_note(&store, "n1", "b1", "alice", 5).await;
  let boards = BoardService::new(store.clone(), files);

  let reply = boards
    .create_reply("n1", NewNote::new("bob", "agreed"))
    .await
    .unwrap();

  assert_eq!(reply.in_reply_to.as_deref(), Some("n1"));
  assert_eq!(reply.attributed_to, None);
  assert_eq!(load_note(&store, "n1").await.replies_count, 1);
}

#[tokio::test]
async fn board_notes_cannot_pose_as_replies() {
  let (store, files) = stores();
  seed_board(&store, "b1").await;
  seed_note(&store, "n1", "b1", "alice", 5).await;
  let boards = BoardService::new(store.clone(), files);

  let mut input = NewNote::new("bob", "sneaky reply");
  input.in_reply_to = Some("n1".into());
  let err = boards.create_note("b1", input, None).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let replies = FeedComposer::new(store.clone())
    .list_replies("n1", &FeedOptions::default())
    .await
    .unwrap();
  assert!(replies.is_empty());
  assert_eq!(load_note(&store, "n1").await.replies_count, 0);
  assert_eq!(store.inner.len(Collection::Object), 1);
}

#[tokio::test]
async fn reply_to_missing_parent_writes_nothing() {
  let (store, files) = stores();
  let err = BoardService::new(store.clone(), files)
    .create_reply("ghost", NewNote::new("bob", "hello?"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
  assert!(store.inner.is_empty(Collection::Object));
}

#[tokio::test]
async fn reply_must_target_the_parent_it_is_posted_under() {
  let (store, files) = stores();
  seed_note(&store, "n1", "b1", "alice", 5).await;
  let mut input = NewNote::new("bob", "wrong thread");
  input.in_reply_to = Some("n2".into());

  let err = BoardService::new(store.clone(), files)
    .create_reply("n1", input)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert_eq!(load_note(&store, "n1").await.replies_count, 0);
}

#[tokio::test]
async fn deleted_note_is_gone_but_kept() {
  let (store, files) = stores();
  seed_note(&store, "n1", "b1", "alice", 5).await;
  let boards = BoardService::new(store.clone(), files);

  boards.delete_note("n1").await.unwrap();

  assert!(matches!(boards.get_note("n1").await, Err(Error::NotFound { .. })));
  assert!(load_note(&store, "n1").await.deleted_at.is_some());
  assert!(matches!(boards.delete_note("n9").await, Err(Error::NotFound { .. })));
}

// ─── Publishing ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn publishing_credits_the_author() {
  let (store, files) = stores();
  seed_profile(&store, "alice", 0).await;
  seed_board(&store, "b1").await;
  let publisher = Publisher::new(store.clone(), files);

  let published = publisher
    .publish_note("b1", NewNote::new("alice", "hello"), None)
    .await
    .unwrap();

  assert!(published.activity.is_applied());
  let activity = &published.activity.activity().activity;
  assert_eq!(activity.object.as_deref(), Some(published.note.id.as_str()));
  assert_eq!(activity.target.as_deref(), Some("b1"));
  assert_eq!(load_profile(&store, "alice").await.activity_point, 30);

  let reply = publisher
    .publish_reply(&published.note.id, NewNote::new("alice", "self reply"))
    .await
    .unwrap();
  assert_eq!(reply.activity.activity().activity.summary, "Wrote a reply.");
  assert_eq!(load_profile(&store, "alice").await.activity_point, 60);
}

#[tokio::test]
async fn publishing_a_vote_is_worth_less() {
  let (store, files) = stores();
  seed_profile(&store, "alice", 0).await;
  let boards = BoardService::new(store.clone(), files.clone());
  let group_id = group(&boards).await;
  boards
    .create_agenda_board(agenda(&group_id, &["yes", "no"], -1, 1))
    .await
    .unwrap();

  let mut input = NewNote::new("alice", "yes please");
  input.vote_value = Some("yes".into());
  let published = Publisher::new(store.clone(), files)
    .publish_note("agenda", input, None)
    .await
    .unwrap();

  assert_eq!(published.activity.activity().activity.activity_point, 20);
  assert_eq!(load_profile(&store, "alice").await.activity_point, 20);
}

#[tokio::test]
async fn publishing_without_a_profile_is_partial() {
  let (store, files) = stores();
  seed_board(&store, "b1").await;

  let published = Publisher::new(store.clone(), files)
    .publish_note("b1", NewNote::new("ghost", "boo"), None)
    .await
    .unwrap();

  assert!(matches!(published.activity, Execution::Partial { .. }));
  assert_eq!(load_note(&store, &published.note.id).await.actor, "ghost");
}

#[tokio::test]
async fn liking_a_missing_note_records_nothing() {
  let (store, files) = stores();
  seed_profile(&store, "alice", 0).await;

  let err = Publisher::new(store.clone(), files)
    .like_note("alice", "nope")
    .await
    .unwrap_err();

  assert!(matches!(err, Error::NotFound { .. }));
  assert!(store.inner.is_empty(Collection::Activity));
  assert_eq!(load_profile(&store, "alice").await.activity_point, 0);
}
