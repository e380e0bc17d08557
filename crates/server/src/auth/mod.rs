pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod password;

use chrono::Utc;
use shared_types::{
    AppError, LoginRequest, LoginResponse, RoleState, SignupRequest, User, UserProfile,
};
use uuid::Uuid;

use crate::config::Settings;
use crate::db::Store;
use crate::error_convert::ValidateRequest;
use crate::repo;

/// Create an account. Stamp reporters are issued their shared-secret
/// credential here.
#[tracing::instrument(skip(store, req), fields(username = %req.username, role = %req.user_type))]
pub async fn register(store: &Store, req: SignupRequest) -> Result<User, AppError> {
    req.validate_request()?;

    let user = User {
        id: Uuid::new_v4(),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        phone_number: req.phone_number,
        password_hash: password::hash_password(&req.password)?,
        created_at: Utc::now(),
        state: RoleState::for_role(req.user_type),
    };
    repo::user::create(store, &user).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Check credentials and mint an access token whose subject is the email.
#[tracing::instrument(skip(store, settings, req), fields(email = %req.email))]
pub async fn login(store: &Store, settings: &Settings, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let invalid = || AppError::unauthorized("Invalid credentials");

    let user = repo::user::find_by_email(store, req.email.trim())
        .await?
        .ok_or_else(invalid)?;
    if !password::verify_password(&req.password, &user.password_hash) {
        tracing::info!(user_id = %user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let access_token = jwt::create_access_token(&user, &settings.jwt_secret, settings.access_token_minutes)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_data: UserProfile::from(&user),
    })
}
