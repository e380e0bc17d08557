use axum::{
    extract::{Path, State},
    Json,
};

use shared_types::{
    AppError, Notification, NotificationListResponse, NotificationResponse, RegistrarDashboard,
};

use crate::db::Store;
use crate::workflow::query;

use super::parse_id;

fn listing(notifications: Vec<Notification>) -> Json<NotificationListResponse> {
    Json(NotificationListResponse {
        notifications: notifications.iter().map(NotificationResponse::from).collect(),
    })
}

/// GET /registrar/{user_id}
#[utoipa::path(
    get,
    path = "/registrar/{user_id}",
    params(("user_id" = String, Path, description = "Registrar UUID")),
    responses(
        (status = 200, description = "Registrar dashboard", body = RegistrarDashboard),
        (status = 404, description = "Registrar not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn registrar_dashboard(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> Result<Json<RegistrarDashboard>, AppError> {
    let user_id = parse_id(&user_id)?;
    query::registrar_dashboard(&store, user_id).await.map(Json)
}

/// GET /lawyer/notifs/{id}
#[utoipa::path(
    get,
    path = "/lawyer/notifs/{id}",
    params(("id" = String, Path, description = "Lawyer UUID")),
    responses(
        (status = 200, description = "Notifications for the lawyer", body = NotificationListResponse),
        (status = 400, description = "Invalid UUID", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn lawyer_notifications(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let lawyer_id = parse_id(&id)?;
    query::lawyer_notifications(&store, lawyer_id).await.map(listing)
}

/// GET /benchclerk/notifs/{id}
///
/// Notifications embedded in a reviewer's record.
#[utoipa::path(
    get,
    path = "/benchclerk/notifs/{id}",
    params(("id" = String, Path, description = "Reviewer UUID")),
    responses(
        (status = 200, description = "Notifications for the reviewer", body = NotificationListResponse),
        (status = 404, description = "User not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn reviewer_notifications(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let user_id = parse_id(&id)?;
    query::reviewer_notifications(&store, user_id).await.map(listing)
}
