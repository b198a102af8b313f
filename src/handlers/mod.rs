pub mod auth_handlers;
pub mod event_handlers;
pub mod health;
pub mod saved_event_handlers;

pub use auth_handlers::{login, logout, refresh_token, signup};
pub use event_handlers::{approve_event, create_event, delete_event, get_event, list_events};
pub use health::health;
pub use saved_event_handlers::{list_saved_events, toggle_saved_event};

use crate::error::AppError;

pub use crate::models::parse_json_object as parse_json_body;

/// Non-numeric ids cannot name an event, so they get the ordinary 404.
pub fn parse_event_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| AppError::event_not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoginPayload;

    #[test]
    fn test_parse_json_body_empty_is_default() {
        let payload: LoginPayload = parse_json_body(b"  ").unwrap();
        assert!(payload.email.is_none());
        assert!(payload.password.is_none());
    }

    #[test]
    fn test_parse_json_body_rejects_garbage() {
        let result: Result<LoginPayload, _> = parse_json_body(b"email=a@b.c");
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result: Result<LoginPayload, _> = parse_json_body(br#"["a@b.c", "password123"]"#);
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result: Result<LoginPayload, _> = parse_json_body(b"null");
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_parse_event_id() {
        assert_eq!(parse_event_id("12").unwrap(), 12);
        assert!(matches!(parse_event_id("abc"), Err(AppError::NotFound(_))));
    }
}
