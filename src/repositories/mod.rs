pub mod event_repository;
pub mod saved_event_repository;
pub mod user_repository;

pub use event_repository::{EventRepository, SqliteEventRepository};
pub use saved_event_repository::{SavedEventRepository, SqliteSavedEventRepository};
pub use user_repository::{NewUser, SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Maps a failed insert/update onto `AlreadyExists` when a UNIQUE
/// constraint rejected it.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());

    if is_unique {
        RepositoryError::AlreadyExists
    } else {
        RepositoryError::Database(err)
    }
}

impl From<RepositoryError> for crate::error::AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => crate::error::AppError::Database(e),
            RepositoryError::NotFound => crate::error::AppError::NotFound("Not found".to_string()),
            RepositoryError::AlreadyExists => crate::error::AppError::BadRequest(
                "Record already exists".to_string(),
            ),
        }
    }
}
