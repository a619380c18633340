//! Session-token authentication module.
//!
//! Tokens are opaque session ids issued at login; this is the product's demo
//! auth flow, not a credential system. The middleware resolves the bearer
//! token to its user and stores it in request extensions, so handlers only
//! ever see an already-authenticated acting user. Swapping in a real identity
//! provider means replacing this module alone.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::db::Repository;
use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Session authentication layer. Resolves `Authorization: Bearer <token>` to
/// the acting user and injects it into request extensions.
pub async fn session_auth_layer(repo: Arc<Repository>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let Some(token) = token else {
        return unauthorized_response("Missing session token");
    };

    match repo.find_user_by_token(&token).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => unauthorized_response("Invalid or expired session token"),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            unauthorized_response("Session lookup failed")
        }
    }
}

/// Perform constant-time string comparison.
///
/// Used for the admin credential check; the demo partner flow accepts any
/// password, but the admin password should not leak through timing.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
