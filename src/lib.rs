pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use repositories::{SqliteEventRepository, SqliteSavedEventRepository, SqliteUserRepository};
use services::{AuthService, EventService, TokenService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
    pub event_service: Arc<EventService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wires the SQLite repositories into the services.
    pub fn new(pool: sqlx::SqlitePool, token_service: TokenService) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let event_repository = Arc::new(SqliteEventRepository::new(pool.clone()));
        let saved_event_repository = Arc::new(SqliteSavedEventRepository::new(pool.clone()));

        AppState {
            user_service: Arc::new(UserService::new(user_repository.clone())),
            auth_service: Arc::new(AuthService::new(user_repository)),
            token_service: Arc::new(token_service),
            event_service: Arc::new(EventService::new(event_repository, saved_event_repository)),
            pool,
        }
    }
}
