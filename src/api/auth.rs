//! Auth API endpoints.
//!
//! The demo login flow from the product: any email/password pair yields a
//! partner account, created on first sight; only the configured admin email
//! is actually credential-checked. Tokens are opaque session ids.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};

use super::{error, success, ApiResult};
use crate::auth::constant_time_compare;
use crate::errors::AppError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
use crate::AppState;

/// POST /api/auth/register - Create an account and open a session.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return error(
            AppError::Validation("A valid email is required".to_string()),
            revision_id,
        );
    }
    if request.password.is_empty() {
        return error(
            AppError::Validation("Password is required".to_string()),
            revision_id,
        );
    }

    let role = match admin_role_for(&state, &request.email, &request.password) {
        Ok(role) => role,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.find_user_by_email(&request.email).await {
        Ok(Some(_)) => error(
            AppError::Validation("Email is already registered".to_string()),
            revision_id,
        ),
        Ok(None) => match state
            .repo
            .create_user(request.name.trim(), &request.email, role)
            .await
        {
            Ok(user) => open_session(&state, user, revision_id).await,
            Err(e) => error(e, revision_id),
        },
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/auth/login - Open a session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.email.trim().is_empty() || request.password.is_empty() {
        return error(
            AppError::Validation("Email and password are required".to_string()),
            revision_id,
        );
    }

    let role = match admin_role_for(&state, &request.email, &request.password) {
        Ok(role) => role,
        Err(e) => return error(e, revision_id),
    };

    // Demo flow: unknown emails get a partner account on the spot, with the
    // local part of the address as a display name.
    let user = match state.repo.find_user_by_email(&request.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            let name = match role {
                Role::Admin => "Administrateur".to_string(),
                Role::Partner => request
                    .email
                    .split('@')
                    .next()
                    .unwrap_or("Parrain")
                    .to_string(),
            };
            match state.repo.create_user(&name, &request.email, role).await {
                Ok(user) => user,
                Err(e) => return error(e, revision_id),
            }
        }
        Err(e) => return error(e, revision_id),
    };

    open_session(&state, user, revision_id).await
}

/// POST /api/auth/logout - Close the current session. Idempotent.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    match token {
        Some(token) => match state.repo.delete_session(token).await {
            Ok(()) => success((), revision_id),
            Err(e) => error(e, revision_id),
        },
        None => error(
            AppError::Unauthorized("Missing session token".to_string()),
            revision_id,
        ),
    }
}

/// GET /api/auth/me - The acting user.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<User> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(user, revision_id)
}

/// Resolve the role for a login/register attempt. The admin email must carry
/// the admin password; everything else is a partner.
fn admin_role_for(state: &AppState, email: &str, password: &str) -> Result<Role, AppError> {
    if email == state.config.admin_email {
        if constant_time_compare(password, &state.config.admin_password) {
            Ok(Role::Admin)
        } else {
            Err(AppError::Unauthorized(
                "Invalid admin credentials".to_string(),
            ))
        }
    } else {
        Ok(Role::Partner)
    }
}

async fn open_session(
    state: &AppState,
    user: User,
    revision_id: i64,
) -> ApiResult<AuthResponse> {
    match state.repo.create_session(&user.id).await {
        Ok(token) => success(AuthResponse { user, token }, revision_id),
        Err(e) => error(e, revision_id),
    }
}
