use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use shared_types::{AppError, LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserProfile};

use crate::auth::{self, extractors::AuthRequired};
use crate::config::Settings;
use crate::db::Store;
use crate::repo;

/// POST /signup
///
/// Create an account. Stamp reporters get their digital signature back.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = SignupResponse),
        (status = 409, description = "Username or email already taken", body = AppError),
        (status = 422, description = "Validation error", body = AppError)
    ),
    tag = "account"
)]
#[tracing::instrument(skip(store, body))]
pub async fn signup(
    State(store): State<Store>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let user = auth::register(&store, body).await?;

    let response = SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id.to_string(),
        digital_sign: user.digital_sign().map(|c| c.expose().to_string()),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /login (also served at POST /)
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = AppError)
    ),
    tag = "account"
)]
#[tracing::instrument(skip(store, settings, body))]
pub async fn login(
    State(store): State<Store>,
    State(settings): State<Arc<Settings>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    auth::login(&store, &settings, body).await.map(Json)
}

/// GET /me
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Authenticated user's profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = AppError),
        (status = 404, description = "User no longer exists", body = AppError)
    ),
    tag = "account"
)]
pub async fn me(
    State(store): State<Store>,
    AuthRequired(claims): AuthRequired,
) -> Result<Json<UserProfile>, AppError> {
    let user = repo::user::find_by_id(&store, claims.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserProfile::from(&user)))
}
