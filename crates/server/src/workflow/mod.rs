//! Case routing through the review chain:
//! registrar, stamp reporter, bench clerk, judge.
//!
//! Every step is safe to retry. List inserts have set semantics, stage
//! pointers are set once, and notification ids are derived from their
//! content.

pub mod assignment;
pub mod decision;
pub mod intake;
pub mod query;

use shared_types::{AppError, Stage, UserUpdate};
use uuid::Uuid;

use crate::db::Store;
use crate::repo;

use assignment::{Assignment, AssignmentLocks};

/// Move a case to `stage` by assigning the least-loaded reviewer.
///
/// Forwarding to a registrar also books the case as verified on the
/// submitting lawyer's ledger.
#[tracing::instrument(skip(store, locks))]
pub async fn send_to_stage(
    store: &Store,
    locks: &AssignmentLocks,
    stage: Stage,
    case_id: Uuid,
) -> Result<Assignment, AppError> {
    let assigned = assignment::assign(store, locks, stage, case_id).await?;

    if stage == Stage::Registrar {
        let lawyer_id = assigned.case.lawyer_id;
        if repo::user::update(store, lawyer_id, &UserUpdate::RecordVerified(case_id))
            .await?
            .is_none()
        {
            tracing::warn!(%case_id, %lawyer_id, "Submitting lawyer not found");
        }
    }

    Ok(assigned)
}
