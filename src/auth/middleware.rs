use crate::{error::AppError, policy::Actor, services::TokenKind, AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

/// Extract Bearer token from Authorization header.
///
/// A missing header is `Ok(None)`; a header that is present but not a
/// bearer credential is an error.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AppError::InvalidToken)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(AppError::InvalidToken),
    }
}

/// Resolves the request's [`Actor`] and stores it in the request extensions.
///
/// No `Authorization` header means an anonymous actor. A token that fails
/// validation, or that names a deleted or disabled user, rejects the request
/// with 401 even on routes where authentication is optional.
pub async fn resolve_actor(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?.map(str::to_owned);

    let actor = match token {
        None => Actor::Anonymous,
        Some(token) => {
            let claims = state
                .token_service
                .validate(&token, TokenKind::Access)
                .map_err(|e| {
                    tracing::warn!("Rejected bearer token: {}", e);
                    AppError::from(e)
                })?;
            let user_id = claims.user_id()?;
            let user = state.auth_service.get_active_user(user_id).await?;
            Actor::from(&user)
        }
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Rejects anonymous actors. Must run after [`resolve_actor`].
pub async fn require_auth(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<Actor>() {
        Some(actor) if actor.is_authenticated() => Ok(next.run(request).await),
        _ => Err(AppError::AuthenticationFailed),
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Actor>().copied().unwrap_or_default())
    }
}
