use super::parse_json_body;
use crate::error::{AppError, FieldErrors, Result, REQUIRED_FIELD};
use crate::models::{LoginPayload, RefreshPayload, SignupPayload, UserProfile};
use crate::policy::Actor;
use crate::services::{CreateUserRequest, LoginRequest, TokenKind, TokenPair};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserProfile,
    pub tokens: TokenPair,
}

fn require(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.insert(field.to_string(), vec![REQUIRED_FIELD.to_string()]);
            String::new()
        }
    }
}

/// POST /api/auth/signup - Create an account and return a token pair
///
/// ## Request Body (JSON)
/// ```json
/// { "email": "user@example.com", "username": "johndoe",
///   "password": "securepassword123", "password2": "securepassword123" }
/// ```
///
/// New accounts are never admins, whatever the body contains.
pub async fn signup(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let payload: SignupPayload = parse_json_body(&body)?;

    let mut errors = FieldErrors::new();
    let email = require(&mut errors, "email", payload.email);
    let username = require(&mut errors, "username", payload.username);
    let password = require(&mut errors, "password", payload.password);
    let password2 = require(&mut errors, "password2", payload.password2);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = state
        .user_service
        .create_user(CreateUserRequest {
            email,
            username,
            password,
            password_confirm: Some(password2),
            is_admin: false,
        })
        .await?;

    let tokens = state.token_service.issue_pair(&user)?;

    tracing::info!(user_id = user.id, "User signed up");

    let response = AuthResponse {
        message: "User created successfully",
        user: UserProfile::from(&user),
        tokens,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// POST /api/auth/login - Exchange email and password for a token pair
///
/// ## Errors
/// - 400 Bad Request: missing fields
/// - 401 Unauthorized: `Invalid credentials` for an unknown email or a wrong
///   password alike; `User account is disabled` for inactive accounts
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<AuthResponse>> {
    let payload: LoginPayload = parse_json_body(&body)?;

    let mut errors = FieldErrors::new();
    let email = require(&mut errors, "email", payload.email);
    let password = require(&mut errors, "password", payload.password);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = state
        .auth_service
        .authenticate(LoginRequest { email, password })
        .await
        .map_err(|e| {
            tracing::warn!("Login failed: {}", e);
            AppError::from(e)
        })?;

    let tokens = state.token_service.issue_pair(&user)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        user: UserProfile::from(&user),
        tokens,
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless, so there is nothing to revoke; clients discard
/// their tokens.
pub async fn logout(actor: Actor) -> Json<serde_json::Value> {
    if let Some(user_id) = actor.user_id() {
        tracing::debug!(user_id, "User logged out");
    }
    Json(json!({ "message": "Logout successful" }))
}

/// POST /api/auth/token/refresh - Trade a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let payload: RefreshPayload = parse_json_body(&body)?;

    let mut errors = FieldErrors::new();
    let refresh = require(&mut errors, "refresh", payload.refresh);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let claims = state.token_service.validate(&refresh, TokenKind::Refresh)?;
    let user = state.auth_service.get_active_user(claims.user_id()?).await?;
    let access = state.token_service.issue_access(user.id)?;

    Ok(Json(json!({ "access": access })))
}
