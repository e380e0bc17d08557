pub mod account;
pub mod case;
pub mod notification;
pub mod stage;

use axum::{routing::{get, post}, Router};
use shared_types::AppError;
use uuid::Uuid;

use crate::db::AppState;

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request("Invalid UUID format"))
}

/// Build the eVault REST router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/signup", post(account::signup))
        .route("/", post(account::login))
        .route("/login", post(account::login))
        .route("/me", get(account::me))
        // Intake and reads
        .route("/submit-case", post(case::submit_case))
        .route("/get-cases/{user_id}", get(case::get_cases))
        .route("/case-history/{user_id}", get(case::case_history))
        .route("/case/{case_id}", get(case::get_case))
        .route("/all-cases/{user_id}", get(case::all_cases))
        .route("/registrar/case-verification/{case_id}", get(case::registrar_case_verification))
        .route("/case-stamp-verif/{case_id}", post(case::stamp_queue_lookup))
        // Stage transitions
        .route("/case/{case_id}/send-to-registrar", post(stage::send_to_registrar))
        .route("/registrar/case-assignment/{case_id}", post(stage::assign_stamp_reporter))
        .route("/case/{case_id}/send-to-judge", post(stage::send_to_judge))
        .route("/case/{case_id}/reject", post(stage::reject_case))
        .route("/case/{case_id}/accept", post(stage::accept_case))
        .route("/case/{case_id}/decision", post(stage::decide_case))
        // Dashboards and notifications
        .route("/registrar/{user_id}", get(notification::registrar_dashboard))
        .route("/lawyer/notifs/{id}", get(notification::lawyer_notifications))
        .route("/benchclerk/notifs/{id}", get(notification::reviewer_notifications))
}
