use crate::error::{field_error, AppError, FieldErrors};
use crate::models::user::User;
use crate::repositories::{NewUser, RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use std::sync::Arc;

pub const USERNAME_MAX_CHARS: usize = 150;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Password too weak: {0}")]
    WeakPassword(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        let errors: FieldErrors = match err {
            UserServiceError::InvalidEmail => field_error("email", "Enter a valid email address."),
            UserServiceError::InvalidUsername => field_error(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ),
            UserServiceError::WeakPassword(msg) => field_error("password", msg),
            UserServiceError::PasswordMismatch => {
                field_error("password", "Password fields didn't match.")
            }
            UserServiceError::EmailTaken => {
                field_error("email", "user with this email already exists.")
            }
            UserServiceError::UsernameTaken => {
                field_error("username", "A user with that username already exists.")
            }
            UserServiceError::UserNotFound => {
                return AppError::NotFound("User not found".to_string())
            }
            UserServiceError::HashingError(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                return AppError::InternalError;
            }
            UserServiceError::RepositoryError(e) => return e.into(),
        };
        AppError::Validation(errors)
    }
}

pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: Option<String>,
    pub is_admin: bool,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();

        self.validate_email(&email)?;
        self.validate_username(&username)?;

        // Validate password confirmation if provided
        if let Some(ref confirm) = request.password_confirm {
            if request.password != *confirm {
                return Err(UserServiceError::PasswordMismatch);
            }
        }

        self.validate_password(&request.password)?;

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(UserServiceError::EmailTaken);
        }
        if self.repository.find_by_username(&username).await?.is_some() {
            return Err(UserServiceError::UsernameTaken);
        }

        let password_hash = self.hash_password(&request.password)?;

        // The UNIQUE constraints still decide races between the checks above and the insert.
        match self
            .repository
            .create_user(NewUser {
                email,
                username: username.clone(),
                password_hash,
                is_admin: request.is_admin,
            })
            .await
        {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => {
                // Either UNIQUE column may have lost the race.
                if self.repository.find_by_username(&username).await?.is_some() {
                    Err(UserServiceError::UsernameTaken)
                } else {
                    Err(UserServiceError::EmailTaken)
                }
            }
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .repository
            .find_by_email(&email.trim().to_lowercase())
            .await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn set_admin(&self, id: i64, is_admin: bool) -> Result<(), UserServiceError> {
        match self.repository.set_admin(id, is_admin).await {
            Ok(()) => {
                tracing::info!(user_id = id, is_admin, "Updated admin flag");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<(), UserServiceError> {
        match self.repository.set_active(id, is_active).await {
            Ok(()) => {
                tracing::info!(user_id = id, is_active, "Updated active flag");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    fn validate_email(&self, email: &str) -> Result<(), UserServiceError> {
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid || email.len() > 254 || email.chars().any(char::is_whitespace) {
            return Err(UserServiceError::InvalidEmail);
        }
        Ok(())
    }

    fn validate_username(&self, username: &str) -> Result<(), UserServiceError> {
        let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
        if username.is_empty()
            || username.chars().count() > USERNAME_MAX_CHARS
            || !username.chars().all(allowed)
        {
            return Err(UserServiceError::InvalidUsername);
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), UserServiceError> {
        if password.chars().count() < 8 {
            return Err(UserServiceError::WeakPassword(
                "This password is too short. It must contain at least 8 characters.".to_string(),
            ));
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserServiceError::WeakPassword(
                "This password is entirely numeric.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        verify_password(password, password_hash)
    }
}

/// Checks a plaintext password against a PHC-encoded argon2 hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    } else {
        false
    }
}
