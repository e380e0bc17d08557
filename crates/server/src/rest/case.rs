use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use shared_types::{
    AppError, CaseEnvelope, CaseIntake, CaseListResponse, CaseResponse, StampQueueLookupRequest,
    SubmitCaseResponse, SubmitterSummary,
};

use crate::archive::ArchivalClient;
use crate::db::Store;
use crate::staging::StagingArea;
use crate::workflow::{intake, query};

use super::parse_id;

fn case_list(cases: Vec<shared_types::Case>) -> Json<CaseListResponse> {
    Json(CaseListResponse {
        cases: cases.into_iter().map(CaseResponse::from).collect(),
    })
}

/// POST /submit-case
///
/// Multipart intake. Text parts fill the case metadata; every part named
/// `files`, or carrying a file name, is taken as an attachment.
#[utoipa::path(
    post,
    path = "/submit-case",
    request_body(content = CaseIntake, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Case submitted", body = SubmitCaseResponse),
        (status = 404, description = "Lawyer not found", body = AppError),
        (status = 422, description = "Missing or malformed fields", body = AppError)
    ),
    tag = "cases"
)]
#[tracing::instrument(skip(store, archive, staging, multipart))]
pub async fn submit_case(
    State(store): State<Store>,
    State(archive): State<Arc<ArchivalClient>>,
    State(staging): State<StagingArea>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitCaseResponse>), AppError> {
    let mut form = CaseIntake::default();
    let mut attachments = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.to_string(), Default::default()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);

        if name == "files" || filename.is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.to_string(), Default::default()))?;
            attachments.push(intake::Attachment {
                filename: filename.unwrap_or_else(|| "upload".to_string()),
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::validation(e.to_string(), Default::default()))?;
            form.set_field(&name, value);
        }
    }

    let outcome = intake::submit_case(&store, archive, &staging, form, attachments).await?;

    let response = SubmitCaseResponse {
        message: "Case submitted successfully".to_string(),
        case_id: outcome.case.id.to_string(),
        user: SubmitterSummary {
            user_id: outcome.lawyer.id.to_string(),
            pending_cases: outcome.lawyer.pending_cases().len(),
        },
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /get-cases/{user_id}
///
/// Lawyers get the cases they filed; reviewers get their queue.
#[utoipa::path(
    get,
    path = "/get-cases/{user_id}",
    params(("user_id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "Cases visible to the user", body = CaseListResponse),
        (status = 400, description = "Invalid UUID", body = AppError),
        (status = 404, description = "User not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn get_cases(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> Result<Json<CaseListResponse>, AppError> {
    let user_id = parse_id(&user_id)?;
    query::cases_for_user(&store, user_id).await.map(case_list)
}

/// GET /case-history/{user_id}
#[utoipa::path(
    get,
    path = "/case-history/{user_id}",
    params(("user_id" = String, Path, description = "Lawyer UUID")),
    responses(
        (status = 200, description = "Cases filed by the lawyer", body = CaseListResponse),
        (status = 400, description = "Invalid UUID", body = AppError)
    ),
    tag = "cases"
)]
pub async fn case_history(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> Result<Json<CaseListResponse>, AppError> {
    let lawyer_id = parse_id(&user_id)?;
    query::case_history(&store, lawyer_id).await.map(case_list)
}

/// GET /case/{case_id}
#[utoipa::path(
    get,
    path = "/case/{case_id}",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case found", body = CaseEnvelope),
        (status = 400, description = "Invalid UUID", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn get_case(
    State(store): State<Store>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseEnvelope>, AppError> {
    let case = query::get_case(&store, parse_id(&case_id)?).await?;
    Ok(Json(CaseEnvelope {
        message: None,
        case: CaseResponse::from(case),
    }))
}

/// GET /registrar/case-verification/{case_id}
#[utoipa::path(
    get,
    path = "/registrar/case-verification/{case_id}",
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case to verify", body = CaseEnvelope),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn registrar_case_verification(
    State(store): State<Store>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseEnvelope>, AppError> {
    let case = query::get_case(&store, parse_id(&case_id)?).await?;
    Ok(Json(CaseEnvelope {
        message: Some("Case retrieved for verification".to_string()),
        case: CaseResponse::from(case),
    }))
}

/// GET /all-cases/{user_id}
///
/// Every case the user has verified or rejected.
#[utoipa::path(
    get,
    path = "/all-cases/{user_id}",
    params(("user_id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "Closed cases", body = CaseListResponse),
        (status = 404, description = "User not found", body = AppError)
    ),
    tag = "cases"
)]
pub async fn all_cases(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> Result<Json<CaseListResponse>, AppError> {
    let user_id = parse_id(&user_id)?;
    query::closed_cases(&store, user_id).await.map(case_list)
}

/// POST /case-stamp-verif/{case_id}
///
/// The case, provided it is queued for the given stamp reporter.
#[utoipa::path(
    post,
    path = "/case-stamp-verif/{case_id}",
    request_body = StampQueueLookupRequest,
    params(("case_id" = String, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case is in the user's queue", body = CaseEnvelope),
        (status = 404, description = "Case not found in user's cases", body = AppError)
    ),
    tag = "cases"
)]
pub async fn stamp_queue_lookup(
    State(store): State<Store>,
    Path(case_id): Path<String>,
    Json(body): Json<StampQueueLookupRequest>,
) -> Result<Json<CaseEnvelope>, AppError> {
    let case_id = parse_id(&case_id)?;
    let user_id = parse_id(&body.user_id)?;
    let case = query::queued_case(&store, case_id, user_id).await?;
    Ok(Json(CaseEnvelope {
        message: Some("Case found".to_string()),
        case: CaseResponse::from(case),
    }))
}
