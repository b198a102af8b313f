pub mod test_helpers {
    use crate::{
        routes::{build_router, normalize_paths},
        services::TokenService,
        AppState,
    };
    use axum::Router;
    use chrono::{DateTime, Duration, Utc};
    use sqlx::{
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
        SqlitePool,
    };
    use std::str::FromStr;
    use tempfile::NamedTempFile;
    use tower_http::normalize_path::NormalizePath;

    pub const TEST_JWT_SECRET: &[u8] = b"eventboard-test-secret-eventboard-test-secret";

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when several connections must see the same data
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = crate::db::create_pool(&database_url).await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, is_admin, is_active, created_at) \
             VALUES (?, ?, ?, ?, TRUE, ?)",
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(is_admin)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Create a test event dated a week from now
    pub async fn create_test_event(
        pool: &SqlitePool,
        creator_id: i64,
        title: &str,
        approved: bool,
    ) -> Result<i64, sqlx::Error> {
        create_test_event_on(pool, creator_id, title, approved, Utc::now() + Duration::days(7))
            .await
    }

    pub async fn create_test_event_on(
        pool: &SqlitePool,
        creator_id: i64,
        title: &str,
        approved: bool,
        date: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO events
                (title, description, date, location, creator_id, is_approved, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind("Test event description")
        .bind(date)
        .bind("Community Hall")
        .bind(creator_id)
        .bind(approved)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub fn test_token_service() -> TokenService {
        TokenService::new(TEST_JWT_SECRET, Duration::minutes(5), Duration::days(1))
    }

    pub fn test_state(pool: SqlitePool) -> AppState {
        AppState::new(pool, test_token_service())
    }

    /// The router as served, trailing-slash normalization included
    pub fn test_app(state: AppState) -> NormalizePath<Router> {
        normalize_paths(build_router(state))
    }

    /// Bearer header value for a fresh access token
    pub fn bearer_for(state: &AppState, user_id: i64) -> String {
        match state.token_service.issue_access(user_id) {
            Ok(token) => format!("Bearer {}", token),
            Err(e) => panic!("Failed to issue test token: {}", e),
        }
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}

#[cfg(test)]
pub async fn create_test_user(pool: &sqlx::SqlitePool, email: &str, username: &str) -> i64 {
    match test_helpers::insert_test_user(pool, email, username, "password123", false).await {
        Ok(id) => id,
        Err(e) => panic!("Failed to create test user: {}", e),
    }
}

#[cfg(test)]
pub use test_helpers::create_test_event;
