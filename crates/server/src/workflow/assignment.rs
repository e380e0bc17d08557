use chrono::{DateTime, Utc};
use shared_types::{AppError, Case, CaseUpdate, Stage, User, UserUpdate};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::Store;
use crate::repo;

/// One async lock per stage. Picks for the same stage run one at a time, so
/// each pick sees the queue lengths written by the previous one.
#[derive(Clone, Default)]
pub struct AssignmentLocks {
    stages: Arc<[Mutex<()>; 4]>,
}

impl AssignmentLocks {
    fn for_stage(&self, stage: Stage) -> &Mutex<()> {
        let idx = match stage {
            Stage::Registrar => 0,
            Stage::StampReporter => 1,
            Stage::BenchClerk => 2,
            Stage::Judge => 3,
        };
        &self.stages[idx]
    }
}

/// Min-heap of reviewers keyed by `(queue length, signup time, id)`.
#[derive(Debug, Default)]
pub struct ReviewerPool {
    heap: BinaryHeap<Reverse<(usize, DateTime<Utc>, Uuid)>>,
}

impl ReviewerPool {
    pub fn from_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Self {
        let heap = users
            .into_iter()
            .map(|u| Reverse((u.queue_len(), u.created_at, u.id)))
            .collect();
        Self { heap }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Least-loaded reviewer; ties go to the earliest signup, then the
    /// lowest id.
    pub fn pick(&mut self) -> Option<Uuid> {
        self.heap.pop().map(|Reverse((_, _, id))| id)
    }
}

/// Result of a stage assignment: the case after the pointer is set and the
/// assignee after the queue insert.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub case: Case,
    pub reviewer: User,
    /// `false` when the stage already had an assignee and the pick was skipped.
    pub newly_assigned: bool,
}

/// Assign `case_id` to the least-loaded reviewer serving `stage`.
///
/// A stage that already has an assignee is not re-picked; that reviewer's
/// queue entry is re-asserted instead, so retries converge on one assignee.
#[tracing::instrument(skip(store, locks))]
pub async fn assign(
    store: &Store,
    locks: &AssignmentLocks,
    stage: Stage,
    case_id: Uuid,
) -> Result<Assignment, AppError> {
    let _guard = locks.for_stage(stage).lock().await;

    let case = repo::case::find_by_id(store, case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    let (case, newly_assigned) = match case.assignee(stage) {
        Some(_) => (case, false),
        None => {
            let pool = repo::user::list_by_role(store, stage.role()).await?;
            let picked = ReviewerPool::from_users(&pool)
                .pick()
                .ok_or_else(|| AppError::not_found(format!("No {stage}s found")))?;
            let case = repo::case::update(store, case_id, &CaseUpdate::Assign(stage, picked))
                .await?
                .ok_or_else(|| AppError::not_found("Case not found"))?;
            (case, true)
        }
    };

    // Set-once pointer: whoever the case names now is the assignee.
    let reviewer_id = case
        .assignee(stage)
        .ok_or_else(|| AppError::internal(format!("{} was not recorded", stage.field())))?;

    let reviewer = repo::user::update(store, reviewer_id, &UserUpdate::Enqueue(case_id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Assigned {stage} not found")))?;

    tracing::info!(
        %case_id,
        %stage,
        reviewer = %reviewer.id,
        queue_len = reviewer.queue_len(),
        newly_assigned,
        "Case assigned"
    );

    Ok(Assignment {
        case,
        reviewer,
        newly_assigned,
    })
}
