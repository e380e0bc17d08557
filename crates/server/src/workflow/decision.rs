use chrono::Utc;
use shared_types::{
    AppError, AppErrorKind, Case, CaseUpdate, Notification, NotificationDelivery, Role, Stage,
    UserUpdate,
};
use uuid::Uuid;

use crate::db::Store;
use crate::repo;

use super::assignment::{self, AssignmentLocks};

async fn load_case(store: &Store, case_id: Uuid) -> Result<Case, AppError> {
    repo::case::find_by_id(store, case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))
}

/// Reject a case at whatever stage it is in.
///
/// The rejection is booked against the stamp reporter when one is assigned,
/// otherwise the registrar, and against the submitting lawyer. The lawyer
/// gets exactly one notification carrying the reason.
#[tracing::instrument(skip(store))]
pub async fn reject(store: &Store, case_id: Uuid, reason: &str) -> Result<Case, AppError> {
    let case = repo::case::update(store, case_id, &CaseUpdate::Reject(reason.to_string()))
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    let responsible = case
        .assignee(Stage::StampReporter)
        .or(case.assignee(Stage::Registrar));
    if let Some(reviewer_id) = responsible {
        if repo::user::update(store, reviewer_id, &UserUpdate::RecordRejected(case_id))
            .await?
            .is_none()
        {
            tracing::warn!(%case_id, %reviewer_id, "Responsible reviewer not found");
        }
    }
    repo::user::update(store, case.lawyer_id, &UserUpdate::RecordRejected(case_id)).await?;

    let notice = Notification::new(
        case_id,
        case.lawyer_id,
        case.lawyer_id,
        format!("Case rejected: {reason}"),
        Utc::now(),
    );
    repo::notification::insert_for_lawyer(store, &notice).await?;

    tracing::info!(%case_id, "Case rejected");
    Ok(case)
}

#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    pub case: Case,
    pub bench_clerk: Option<Uuid>,
}

/// Stamp-reporter acceptance.
///
/// The presented credential must match the assigned stamp reporter's
/// `digital_sign`; on mismatch nothing is written. On success the case is
/// verified and handed to the least-loaded bench clerk.
#[tracing::instrument(skip(store, locks, presented))]
pub async fn accept(
    store: &Store,
    locks: &AssignmentLocks,
    case_id: Uuid,
    presented: &str,
) -> Result<AcceptOutcome, AppError> {
    let case = load_case(store, case_id).await?;

    let reporter_id = case
        .assignee(Stage::StampReporter)
        .ok_or_else(|| AppError::not_found("Stamp reporter not found"))?;
    let reporter = repo::user::find_by_id(store, reporter_id)
        .await?
        .ok_or_else(|| AppError::not_found("Stamp reporter not found"))?;

    let credential_ok = reporter
        .digital_sign()
        .map(|cred| cred.matches(presented))
        .unwrap_or(false);
    if !credential_ok {
        tracing::warn!(%case_id, %reporter_id, "Digital signature mismatch");
        return Err(AppError::unauthorized("Invalid digital signature"));
    }

    let mut case = repo::case::update(store, case_id, &CaseUpdate::Verify)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;
    repo::user::update(store, reporter_id, &UserUpdate::RecordVerified(case_id)).await?;

    let bench_clerk = match assignment::assign(store, locks, Stage::BenchClerk, case_id).await {
        Ok(a) => {
            case = a.case;
            Some(a.reviewer.id)
        }
        Err(e) if e.kind == AppErrorKind::NotFound => {
            tracing::warn!(%case_id, error = %e, "No bench clerk available");
            None
        }
        Err(e) => return Err(e),
    };

    let message = format!(
        "Case '{}' (ID: {}) has been verified by the stamp reporter.",
        case.case_subject, case_id
    );
    let now = Utc::now();
    let notice = Notification::new(case_id, case.lawyer_id, case.lawyer_id, message.clone(), now);
    repo::notification::insert_for_lawyer(store, &notice).await?;

    if let Some(clerk_id) = bench_clerk {
        let notice = Notification::new(case_id, case.lawyer_id, clerk_id, message, now);
        repo::user::update(store, clerk_id, &UserUpdate::Notify(notice)).await?;
    }

    tracing::info!(%case_id, ?bench_clerk, "Case verified");
    Ok(AcceptOutcome { case, bench_clerk })
}

#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub case: Case,
    pub deliveries: Vec<NotificationDelivery>,
}

/// Record the judge's decision and fan the notice out to everyone who
/// handled the case.
///
/// Each notification is an independent best-effort write; failures are
/// reported per recipient rather than failing the request.
#[tracing::instrument(skip(store))]
pub async fn decide(
    store: &Store,
    case_id: Uuid,
    decision: &str,
    reason: &str,
) -> Result<DecisionOutcome, AppError> {
    let case = repo::case::update(
        store,
        case_id,
        &CaseUpdate::Decide {
            decision: decision.to_string(),
            reason: reason.to_string(),
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Case not found"))?;

    let message = format!(
        "Case '{}' (ID: {}) has been {}. Reason: {}",
        case.case_subject, case_id, decision, reason
    );
    let now = Utc::now();
    let mut deliveries = Vec::with_capacity(5);

    let lawyer_notice = Notification::new(case_id, case.lawyer_id, case.lawyer_id, message.clone(), now);
    let delivered = match repo::notification::insert_for_lawyer(store, &lawyer_notice).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(%case_id, error = %e, "Failed to notify lawyer of decision");
            false
        }
    };
    deliveries.push(NotificationDelivery {
        recipient_role: Role::Lawyer,
        recipient_id: case.lawyer_id.to_string(),
        delivered,
    });

    let bench_clerk = match case.assignee(Stage::BenchClerk) {
        Some(id) => Some(id),
        None => clerk_holding(store, case_id).await,
    };
    let reviewers = [
        (Role::Registrar, case.assignee(Stage::Registrar)),
        (Role::StampReporter, case.assignee(Stage::StampReporter)),
        (Role::BenchClerk, bench_clerk),
        (Role::Judge, case.assignee(Stage::Judge)),
    ];

    for (role, recipient) in reviewers {
        let Some(recipient) = recipient else { continue };
        let notice = Notification::new(case_id, case.lawyer_id, recipient, message.clone(), now);
        let delivered = match repo::user::update(store, recipient, &UserUpdate::Notify(notice)).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::warn!(%case_id, %role, %recipient, "Decision recipient not found");
                false
            }
            Err(e) => {
                tracing::error!(%case_id, %role, %recipient, error = %e, "Failed to notify reviewer of decision");
                false
            }
        };
        deliveries.push(NotificationDelivery {
            recipient_role: role,
            recipient_id: recipient.to_string(),
            delivered,
        });
    }

    tracing::info!(
        %case_id,
        delivered = deliveries.iter().filter(|d| d.delivered).count(),
        attempted = deliveries.len(),
        "Decision recorded"
    );
    Ok(DecisionOutcome { case, deliveries })
}

/// Bench clerk whose queue holds the case, for cases verified before the
/// clerk pointer was recorded.
async fn clerk_holding(store: &Store, case_id: Uuid) -> Option<Uuid> {
    match repo::user::list_by_role(store, Role::BenchClerk).await {
        Ok(clerks) => clerks
            .into_iter()
            .find(|c| c.queue().contains(&case_id))
            .map(|c| c.id),
        Err(e) => {
            tracing::error!(%case_id, error = %e, "Failed to look up bench clerks");
            None
        }
    }
}
