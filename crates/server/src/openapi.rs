use axum::{middleware, Router};
use shared_types::{
    AcceptCaseRequest, AcceptCaseResponse, AppError, AppErrorKind, AssignmentResponse,
    CaseEnvelope, CaseIntake, CaseListResponse, CaseResponse, DecisionRequest, DecisionResponse,
    LoginRequest, LoginResponse, MessageResponse, NotificationDelivery, NotificationListResponse,
    NotificationResponse, RegistrarDashboard, RejectCaseRequest, Rejection, Role, SignupRequest,
    SignupResponse, Stage, StampQueueLookupRequest, SubmitCaseResponse, SubmitterSummary,
    UserProfile,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::middleware::auth_middleware;
use crate::db::AppState;
use crate::health;
use crate::rest;
use crate::telemetry::OtelTraceLayer;

/// OpenAPI documentation for the API.
#[derive(OpenApi)]
#[openapi(
    paths(
        // Accounts
        rest::account::signup,
        rest::account::login,
        rest::account::me,
        // Cases
        rest::case::submit_case,
        rest::case::get_cases,
        rest::case::case_history,
        rest::case::get_case,
        rest::case::registrar_case_verification,
        rest::case::all_cases,
        rest::case::stamp_queue_lookup,
        // Workflow
        rest::stage::send_to_registrar,
        rest::stage::assign_stamp_reporter,
        rest::stage::send_to_judge,
        rest::stage::reject_case,
        rest::stage::accept_case,
        rest::stage::decide_case,
        // Notifications
        rest::notification::registrar_dashboard,
        rest::notification::lawyer_notifications,
        rest::notification::reviewer_notifications,
        // Health
        health::health_check,
    ),
    components(schemas(
        AppError, AppErrorKind,
        Role, SignupRequest, SignupResponse, LoginRequest, LoginResponse, UserProfile,
        Stage, Rejection, CaseIntake, CaseResponse, CaseListResponse, CaseEnvelope,
        SubmitterSummary, SubmitCaseResponse, StampQueueLookupRequest,
        AssignmentResponse, RejectCaseRequest, AcceptCaseRequest, AcceptCaseResponse,
        DecisionRequest, DecisionResponse, NotificationDelivery, MessageResponse,
        NotificationResponse, NotificationListResponse, RegistrarDashboard,
        health::HealthResponse,
    )),
    tags(
        (name = "account", description = "Signup, login and profile"),
        (name = "cases", description = "Case intake and case reads"),
        (name = "workflow", description = "Stage assignment, rejection, verification and decisions"),
        (name = "notifications", description = "Dashboards and notification listings"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "eVault API",
        description = "Case routing and review workflow for electronically filed cases",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build the application router: REST routes, health, bearer-token
/// middleware and the Scalar docs UI at `/docs`.
///
/// The OTLP span layer sits inside the auth middleware so spans see the
/// caller's claims.
pub fn api_router(state: AppState) -> Router {
    let flags = crate::config::feature_flags();

    let mut router = Router::new()
        .merge(rest::api_router())
        .route("/health", axum::routing::get(health::health_check));

    if flags.telemetry {
        router = router.layer(OtelTraceLayer);
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}
