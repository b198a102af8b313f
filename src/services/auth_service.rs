use crate::error::AppError;
use crate::models::user::User;
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::user_service::verify_password;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User account is disabled")]
    AccountDisabled,
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::InvalidCredentials => AppError::InvalidCredentials,
            AuthServiceError::AccountDisabled => AppError::AccountDisabled,
            AuthServiceError::UserNotFound => AppError::InvalidToken,
            AuthServiceError::RepositoryError(e) => e.into(),
        }
    }
}

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Unknown email and wrong password fail identically so callers cannot
    /// probe for accounts. The active check runs only after the password matched.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, AuthServiceError> {
        let email = request.email.trim().to_lowercase();

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthServiceError::AccountDisabled);
        }

        Ok(user)
    }

    /// Loads the user a token was issued to, rejecting deleted or disabled accounts.
    pub async fn get_active_user(&self, user_id: i64) -> Result<User, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthServiceError::AccountDisabled);
        }

        Ok(user)
    }
}
