use shared_types::{AppError, Case, Notification, RegistrarDashboard, Role, User};
use uuid::Uuid;

use crate::db::Store;
use crate::repo;

async fn load_user(store: &Store, user_id: Uuid) -> Result<User, AppError> {
    repo::user::find_by_id(store, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Resolve case ids one at a time, skipping ids that no longer resolve.
async fn resolve_cases(store: &Store, ids: &[Uuid]) -> Result<Vec<Case>, AppError> {
    let mut cases = Vec::with_capacity(ids.len());
    for id in ids {
        match repo::case::find_by_id(store, *id).await? {
            Some(case) => cases.push(case),
            None => tracing::warn!(case_id = %id, "Queued case id does not resolve"),
        }
    }
    Ok(cases)
}

/// Lawyers see what they submitted; reviewers see their queue.
pub async fn cases_for_user(store: &Store, user_id: Uuid) -> Result<Vec<Case>, AppError> {
    let user = load_user(store, user_id).await?;
    if user.role().is_reviewer() {
        resolve_cases(store, user.queue()).await
    } else {
        repo::case::list_by_lawyer(store, user_id).await
    }
}

pub async fn case_history(store: &Store, lawyer_id: Uuid) -> Result<Vec<Case>, AppError> {
    repo::case::list_by_lawyer(store, lawyer_id).await
}

pub async fn get_case(store: &Store, case_id: Uuid) -> Result<Case, AppError> {
    repo::case::find_by_id(store, case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))
}

/// Every case the user has verified or rejected.
pub async fn closed_cases(store: &Store, user_id: Uuid) -> Result<Vec<Case>, AppError> {
    let user = load_user(store, user_id).await?;
    let mut ids: Vec<Uuid> = user.verified_cases().to_vec();
    for id in user.rejected_cases() {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    resolve_cases(store, &ids).await
}

/// A case, provided it sits in `user_id`'s queue.
pub async fn queued_case(store: &Store, case_id: Uuid, user_id: Uuid) -> Result<Case, AppError> {
    let user = load_user(store, user_id).await?;
    if !user.queue().contains(&case_id) {
        return Err(AppError::not_found("Case not found in user's cases"));
    }
    get_case(store, case_id).await
}

pub async fn registrar_dashboard(store: &Store, user_id: Uuid) -> Result<RegistrarDashboard, AppError> {
    let registrar = repo::user::find_by_id(store, user_id)
        .await?
        .filter(|u| u.role() == Role::Registrar)
        .ok_or_else(|| AppError::not_found("Registrar not found"))?;
    Ok(RegistrarDashboard {
        name: registrar.username.clone(),
        total_cases: registrar.queue_len(),
        notifications: registrar.notifications().len(),
    })
}

/// Lawyer-store notifications addressed to `lawyer_id`.
pub async fn lawyer_notifications(store: &Store, lawyer_id: Uuid) -> Result<Vec<Notification>, AppError> {
    repo::notification::list_for_lawyer(store, lawyer_id).await
}

/// Notifications embedded in a reviewer's record.
pub async fn reviewer_notifications(store: &Store, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
    let user = load_user(store, user_id).await?;
    Ok(user.notifications().to_vec())
}
