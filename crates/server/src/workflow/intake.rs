use shared_types::{
    parse_filed_date, AppError, Case, CaseIntake, CaseUpdate, Role, User, UserUpdate,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::archive::ArchivalClient;
use crate::db::Store;
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::staging::StagingArea;

/// One uploaded file from the intake form.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub case: Case,
    pub lawyer: User,
}

/// File a new case for a lawyer.
///
/// The case and the lawyer's pending entry are written first. Attachments
/// are then staged and archived; any attachment that is empty or fails to
/// stage or archive is logged and left out of `file_cids`.
#[tracing::instrument(skip(store, archive, staging, intake, attachments), fields(user_id = %intake.user_id, files = attachments.len()))]
pub async fn submit_case(
    store: &Store,
    archive: Arc<ArchivalClient>,
    staging: &StagingArea,
    intake: CaseIntake,
    attachments: Vec<Attachment>,
) -> Result<IntakeOutcome, AppError> {
    intake.validate_request()?;
    let filed_date = parse_filed_date(&intake.filed_date)
        .map_err(|e| AppError::invalid_field("filed_date", e))?;
    let case = Case::from_intake(Uuid::new_v4(), &intake, filed_date)
        .map_err(|e| AppError::invalid_field("user_id", e))?;

    match repo::user::find_by_id(store, case.lawyer_id).await? {
        Some(u) if u.role() == Role::Lawyer => {}
        _ => return Err(AppError::not_found("Lawyer not found")),
    }

    repo::case::create(store, &case).await?;
    let lawyer = repo::user::update(store, case.lawyer_id, &UserUpdate::RecordPending(case.id))
        .await?
        .ok_or_else(|| AppError::not_found("Lawyer not found"))?;

    let cids = archive_attachments(archive, staging, case.lawyer_id, case.id, attachments).await;

    let case = if cids.is_empty() {
        case
    } else {
        repo::case::update(store, case.id, &CaseUpdate::AttachFiles(cids))
            .await?
            .ok_or_else(|| AppError::not_found("Case not found"))?
    };

    tracing::info!(case_id = %case.id, stored_files = case.file_cids.len(), "Case submitted");
    Ok(IntakeOutcome { case, lawyer })
}

/// Stage every non-empty attachment, then pin them concurrently. Returned
/// identifiers keep upload order.
async fn archive_attachments(
    archive: Arc<ArchivalClient>,
    staging: &StagingArea,
    user_id: Uuid,
    case_id: Uuid,
    attachments: Vec<Attachment>,
) -> Vec<String> {
    let mut tasks = JoinSet::new();
    let total = attachments.len();

    for (idx, attachment) in attachments.into_iter().enumerate() {
        if attachment.bytes.is_empty() {
            tracing::warn!(%case_id, filename = %attachment.filename, "Skipping empty attachment");
            continue;
        }
        if let Err(e) = staging
            .stage(user_id, case_id, &attachment.filename, &attachment.bytes)
            .await
        {
            tracing::error!(%case_id, filename = %attachment.filename, error = %e, "Failed to stage attachment");
            continue;
        }
        let archive = Arc::clone(&archive);
        tasks.spawn(async move {
            let result = archive.pin(&attachment.filename, attachment.bytes).await;
            (idx, attachment.filename, result)
        });
    }

    let mut slots: Vec<Option<String>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, _, Ok(cid))) => slots[idx] = Some(cid),
            Ok((_, filename, Err(e))) => {
                tracing::error!(%case_id, %filename, error = %e, "Failed to archive attachment");
            }
            Err(e) => {
                tracing::error!(%case_id, error = %e, "Archive task did not complete");
            }
        }
    }

    slots.into_iter().flatten().collect()
}
