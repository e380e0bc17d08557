use axum::{
    extract::{Path, State},
    Json,
};

use shared_types::{
    AcceptCaseRequest, AcceptCaseResponse, AppError, AssignmentResponse, DecisionRequest,
    DecisionResponse, MessageResponse, RejectCaseRequest, Stage,
};

use crate::auth::extractors::MaybeAuth;
use crate::db::Store;
use crate::error_convert::ValidateRequest;
use crate::workflow::{self, assignment::AssignmentLocks, decision};

use super::parse_id;

async fn forward(
    store: &Store,
    locks: &AssignmentLocks,
    stage: Stage,
    case_id: &str,
) -> Result<Json<AssignmentResponse>, AppError> {
    let case_id = parse_id(case_id)?;
    let assigned = workflow::send_to_stage(store, locks, stage, case_id).await?;

    Ok(Json(AssignmentResponse {
        message: format!("Case assigned to {stage}"),
        case_id: case_id.to_string(),
        stage,
        assigned_reviewer: assigned.reviewer.id.to_string(),
        reviewer_cases: assigned.reviewer.queue().iter().map(|id| id.to_string()).collect(),
    }))
}

/// POST /case/{case_id}/send-to-registrar
#[utoipa::path(
    post,
    path = "/case/{case_id}/send-to-registrar",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Registrar assigned", body = AssignmentResponse),
        (status = 400, description = "Invalid UUID", body = AppError),
        (status = 404, description = "Case or registrar not found", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(store, locks, auth), fields(actor = %auth.actor()))]
pub async fn send_to_registrar(
    State(store): State<Store>,
    State(locks): State<AssignmentLocks>,
    auth: MaybeAuth,
    Path(case_id): Path<String>,
) -> Result<Json<AssignmentResponse>, AppError> {
    forward(&store, &locks, Stage::Registrar, &case_id).await
}

/// POST /registrar/case-assignment/{case_id}
#[utoipa::path(
    post,
    path = "/registrar/case-assignment/{case_id}",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Stamp reporter assigned", body = AssignmentResponse),
        (status = 404, description = "Case or stamp reporter not found", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(store, locks, auth), fields(actor = %auth.actor()))]
pub async fn assign_stamp_reporter(
    State(store): State<Store>,
    State(locks): State<AssignmentLocks>,
    auth: MaybeAuth,
    Path(case_id): Path<String>,
) -> Result<Json<AssignmentResponse>, AppError> {
    forward(&store, &locks, Stage::StampReporter, &case_id).await
}

/// POST /case/{case_id}/send-to-judge
#[utoipa::path(
    post,
    path = "/case/{case_id}/send-to-judge",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Judge assigned", body = AssignmentResponse),
        (status = 404, description = "Case or judge not found", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(store, locks, auth), fields(actor = %auth.actor()))]
pub async fn send_to_judge(
    State(store): State<Store>,
    State(locks): State<AssignmentLocks>,
    auth: MaybeAuth,
    Path(case_id): Path<String>,
) -> Result<Json<AssignmentResponse>, AppError> {
    forward(&store, &locks, Stage::Judge, &case_id).await
}

/// POST /case/{case_id}/reject
#[utoipa::path(
    post,
    path = "/case/{case_id}/reject",
    request_body = RejectCaseRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case rejected", body = MessageResponse),
        (status = 404, description = "Case not found", body = AppError),
        (status = 422, description = "Reason missing", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(store, auth, body), fields(actor = %auth.actor()))]
pub async fn reject_case(
    State(store): State<Store>,
    auth: MaybeAuth,
    Path(case_id): Path<String>,
    Json(body): Json<RejectCaseRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let case_id = parse_id(&case_id)?;
    body.validate_request()?;

    decision::reject(&store, case_id, &body.reason).await?;
    Ok(Json(MessageResponse {
        message: "Case rejected successfully".to_string(),
        case_id: case_id.to_string(),
    }))
}

/// POST /case/{case_id}/accept
///
/// Stamp-reporter verification; the body carries the reporter's digital
/// signature.
#[utoipa::path(
    post,
    path = "/case/{case_id}/accept",
    request_body = AcceptCaseRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case verified", body = AcceptCaseResponse),
        (status = 401, description = "Invalid digital signature", body = AppError),
        (status = 404, description = "Case or stamp reporter not found", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(store, locks, auth, body), fields(actor = %auth.actor()))]
pub async fn accept_case(
    State(store): State<Store>,
    State(locks): State<AssignmentLocks>,
    auth: MaybeAuth,
    Path(case_id): Path<String>,
    Json(body): Json<AcceptCaseRequest>,
) -> Result<Json<AcceptCaseResponse>, AppError> {
    let case_id = parse_id(&case_id)?;
    body.validate_request()?;

    let outcome = decision::accept(&store, &locks, case_id, &body.digital_signature).await?;
    Ok(Json(AcceptCaseResponse {
        message: "Case accepted and verified successfully".to_string(),
        case_id: case_id.to_string(),
        assigned_bench_clerk: outcome.bench_clerk.map(|id| id.to_string()),
    }))
}

/// POST /case/{case_id}/decision
///
/// Record the judge's decision and notify everyone who handled the case.
#[utoipa::path(
    post,
    path = "/case/{case_id}/decision",
    request_body = DecisionRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Decision recorded", body = DecisionResponse),
        (status = 404, description = "Case not found", body = AppError),
        (status = 422, description = "Decision or reason missing", body = AppError)
    ),
    tag = "workflow"
)]
#[tracing::instrument(skip(store, auth, body), fields(actor = %auth.actor()))]
pub async fn decide_case(
    State(store): State<Store>,
    auth: MaybeAuth,
    Path(case_id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, AppError> {
    let case_id = parse_id(&case_id)?;
    body.validate_request()?;

    let outcome = decision::decide(&store, case_id, &body.decision, &body.reason).await?;
    Ok(Json(DecisionResponse {
        message: "Decision recorded and notifications sent".to_string(),
        case_id: case_id.to_string(),
        deliveries: outcome.deliveries,
    }))
}
