use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use super::jwt::validate_access_token;
use crate::db::AppState;

/// Pull a Bearer token out of the Authorization header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Permissive auth middleware.
///
/// Validates a Bearer token when one is present and inserts its `Claims`
/// into request extensions. Does NOT reject unauthenticated requests;
/// downstream extractors decide.
pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = extract_bearer(req.headers()) {
        match validate_access_token(token, &state.settings.jwt_secret) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token");
            }
        }
    }
    next.run(req).await
}
