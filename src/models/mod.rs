pub mod event;
pub mod saved_event;
pub mod user;

pub use event::{
    CreateEventPayload, Event, EventListResponse, EventView, EventWithCreator, ListEventsQuery,
    NewEvent,
};
pub use saved_event::{SavedEventListResponse, SavedEventRecord, SavedEventView, ToggleOutcome};
pub use user::{LoginPayload, RefreshPayload, SignupPayload, User, UserProfile};

use crate::error::AppError;
use serde::de::DeserializeOwned;

/// Parses a JSON request body that must be an object. An empty body is read
/// as `{}` so that missing fields are reported per field rather than as a
/// parse failure. Arrays are refused even though serde would map them onto
/// struct fields by position.
pub fn parse_json_object<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    if !value.is_object() {
        return Err(AppError::BadRequest(
            "Invalid JSON body: expected an object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}
