//! The activity executor.
//!
//! Running an activity is a three-part workflow with no enclosing
//! transaction:
//!
//! 1. the activity record is appended to the ledger (if this fails nothing
//!    else is attempted);
//! 2. the actor's profile is credited with the activity's points, and
//! 3. for a like, the target note's `likeCount` is bumped.
//!
//! Steps 2 and 3 run concurrently once step 1 has succeeded. A failure in one
//! of them does not undo the others; the outcome is reported as
//! [`Execution::Partial`] so callers can see exactly what was applied.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{
  Error, Result,
  activity::{Activity, ActivityKind, ActivityParams},
  ledger::ProfileLedger,
  object::Note,
  records::Records,
  store::{DocumentStore, to_document},
  view::{ActivityView, NoteView},
};

/// A dependent step that runs after the activity record is written.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Step {
  CreditPoints,
  BumpLikeCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
  pub step:    Step,
  pub message: String,
}

/// The outcome of running an activity whose record was persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Execution {
  /// Every step succeeded.
  Applied { activity: ActivityView },
  /// The activity is recorded but some dependent steps failed.
  Partial {
    activity: ActivityView,
    failures: Vec<StepFailure>,
  },
}

impl Execution {
  pub fn activity(&self) -> &ActivityView {
    match self {
      Self::Applied { activity } | Self::Partial { activity, .. } => activity,
    }
  }

  pub fn is_applied(&self) -> bool { matches!(self, Self::Applied { .. }) }

  /// Treat a partial outcome as an error.
  pub fn into_result(self) -> Result<ActivityView> {
    match self {
      Self::Applied { activity } => Ok(activity),
      Self::Partial { activity, failures } => Err(Error::PartialCompletion {
        activity_id:  activity.activity.id,
        failed_steps: failures.iter().map(|f| f.step.to_string()).collect(),
      }),
    }
  }
}

pub struct ActivityExecutor<S> {
  store:  Arc<S>,
  ledger: ProfileLedger<S>,
}

impl<S: DocumentStore> ActivityExecutor<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { ledger: ProfileLedger::new(store.clone()), store }
  }

  /// Record and apply an activity of `kind`.
  ///
  /// Returns an error only when nothing was applied (invalid parameters, or
  /// the ledger append failed).
  pub async fn execute(
    &self,
    kind: ActivityKind,
    params: ActivityParams,
  ) -> Result<Execution> {
    let activity = Activity::from_kind(kind, params, Utc::now())?;
    Records::new(self.store.as_ref()).insert(&activity).await?;
    info!(
      id = %activity.id,
      kind = ?kind,
      actor = %activity.actor,
      object = ?activity.object,
      "activity recorded"
    );

    let credit = self.ledger.add_points(&activity.actor, activity.activity_point);
    let bump = async {
      match (kind, activity.object.as_deref()) {
        (ActivityKind::Like, Some(object)) => {
          self.bump_like_count(object).await.map(Some)
        }
        _ => Ok(None),
      }
    };
    let (credited, bumped) = tokio::join!(credit, bump);

    let mut failures = Vec::new();
    let mut view = ActivityView::from(activity);
    match credited {
      Ok(profile) => view.profile = Some(profile),
      Err(e) => failures.push(StepFailure {
        step:    Step::CreditPoints,
        message: e.to_string(),
      }),
    }
    match bumped {
      Ok(note) => view.object_detail = note.map(NoteView::from),
      Err(e) => failures.push(StepFailure {
        step:    Step::BumpLikeCount,
        message: e.to_string(),
      }),
    }

    if failures.is_empty() {
      return Ok(Execution::Applied { activity: view });
    }
    warn!(id = %view.activity.id, ?failures, "activity partially applied");
    Ok(Execution::Partial { activity: view, failures })
  }

  async fn bump_like_count(&self, object_id: &str) -> Result<Note> {
    let records = Records::new(self.store.as_ref());
    let mut note: Note = records.require(object_id).await?;
    note.like_count += 1;

    let patch = to_document(&json!({ "likeCount": note.like_count }))?;
    records.patch::<Note>(object_id, patch).await?;
    Ok(note)
  }
}
