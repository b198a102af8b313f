use crate::error::{field_error, AppError, FieldErrors, REQUIRED_FIELD};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TITLE_MAX_CHARS: usize = 200;
pub const LOCATION_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub creator_id: i64,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row joined with the creator's public fields.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EventWithCreator {
    #[sqlx(flatten)]
    pub event: Event,
    pub creator_name: String,
    pub creator_email: String,
}

/// A validated event ready to be persisted. Carries no creator and no
/// approval flag: both are decided server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
}

/// Body of `POST /events/create`. Unknown fields such as `creator` or
/// `is_approved` are accepted and dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateEventPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
}

impl CreateEventPayload {
    pub fn validate(self) -> Result<NewEvent, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required_text(&mut errors, "title", self.title);
        let description = required_text(&mut errors, "description", self.description);
        let location = required_text(&mut errors, "location", self.location);
        let raw_date = required_text(&mut errors, "date", self.date);

        if let Some(title) = &title {
            if title.chars().count() > TITLE_MAX_CHARS {
                push_error(
                    &mut errors,
                    "title",
                    format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."),
                );
            }
        }

        if let Some(location) = &location {
            if location.chars().count() > LOCATION_MAX_CHARS {
                push_error(
                    &mut errors,
                    "location",
                    format!("Ensure this field has no more than {LOCATION_MAX_CHARS} characters."),
                );
            }
        }

        let date = raw_date.and_then(|raw| {
            let parsed = parse_event_date(&raw);
            if parsed.is_none() {
                push_error(
                    &mut errors,
                    "date",
                    "Datetime has wrong format. Use ISO 8601.".to_string(),
                );
            }
            parsed
        });

        match (title, description, date, location) {
            (Some(title), Some(description), Some(date), Some(location)) if errors.is_empty() => {
                Ok(NewEvent {
                    title,
                    description,
                    date,
                    location,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        None => {
            push_error(errors, field, REQUIRED_FIELD.to_string());
            None
        }
        Some(v) if v.is_empty() => {
            push_error(errors, field, "This field may not be blank.".to_string());
            None
        }
        Some(v) => Some(v),
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

/// Accepts RFC 3339, or a naive date-time which is taken as UTC.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApprovalPayload {
    is_approved: Option<serde_json::Value>,
}

/// Extracts the requested approval state from a `PATCH .../approve` body.
///
/// Only a JSON boolean is accepted; an empty body counts as a missing field.
pub fn parse_approval_body(body: &[u8]) -> Result<bool, AppError> {
    let payload: ApprovalPayload = super::parse_json_object(body)?;

    match payload.is_approved {
        Some(serde_json::Value::Bool(approved)) => Ok(approved),
        None | Some(serde_json::Value::Null) => Err(AppError::Validation(field_error(
            "is_approved",
            REQUIRED_FIELD,
        ))),
        Some(_) => Err(AppError::Validation(field_error(
            "is_approved",
            "Must be a valid boolean.",
        ))),
    }
}

/// Outward representation of an event for a particular actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub creator: i64,
    pub creator_name: String,
    pub creator_email: String,
    pub is_approved: bool,
    pub is_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventView {
    pub fn new(record: EventWithCreator, is_saved: bool) -> Self {
        let EventWithCreator {
            event,
            creator_name,
            creator_email,
        } = record;

        EventView {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            location: event.location,
            creator: event.creator_id,
            creator_name,
            creator_email,
            is_approved: event.is_approved,
            is_saved,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventView>,
    pub count: usize,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListEventsQuery {
    pub show_all: Option<String>,
}

impl ListEventsQuery {
    pub fn include_all(&self) -> bool {
        matches!(self.show_all.as_deref(), Some("true") | Some("True") | Some("1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(title: &str, description: &str, date: &str, location: &str) -> CreateEventPayload {
        CreateEventPayload {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            date: Some(date.to_string()),
            location: Some(location.to_string()),
        }
    }

    #[test]
    fn test_validate_trims_and_parses_rfc3339() {
        let new_event = payload("  Meetup ", "Talks", "2025-06-01T18:30:00+02:00", "Hall A")
            .validate()
            .expect("payload should be valid");

        assert_eq!(new_event.title, "Meetup");
        assert_eq!(
            new_event.date,
            Utc.with_ymd_and_hms(2025, 6, 1, 16, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_accepts_naive_dates_as_utc() {
        let new_event = payload("Meetup", "Talks", "2025-06-01T18:30", "Hall A")
            .validate()
            .expect("payload should be valid");
        assert_eq!(
            new_event.date,
            Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let errors = CreateEventPayload::default().validate().unwrap_err();
        for field in ["title", "description", "date", "location"] {
            assert_eq!(errors[field], vec![REQUIRED_FIELD.to_string()]);
        }
    }

    #[test]
    fn test_validate_rejects_blank_long_and_bad_date() {
        let long_title = "x".repeat(TITLE_MAX_CHARS + 1);
        let errors = payload(&long_title, "   ", "next tuesday", "Hall A")
            .validate()
            .unwrap_err();

        assert!(errors["title"][0].contains("no more than 200"));
        assert_eq!(errors["description"][0], "This field may not be blank.");
        assert!(errors["date"][0].contains("ISO 8601"));
        assert!(!errors.contains_key("location"));
    }

    #[test]
    fn test_client_supplied_creator_and_approval_are_dropped() {
        let body = r#"{"title":"T","description":"D","date":"2025-01-01T00:00:00Z",
                       "location":"L","creator":999,"is_approved":true}"#;
        let parsed: CreateEventPayload = serde_json::from_str(body).unwrap();
        let new_event = parsed.validate().unwrap();
        assert_eq!(new_event.title, "T");
    }

    #[test]
    fn test_parse_approval_body() {
        assert!(parse_approval_body(br#"{"is_approved": true}"#).unwrap());
        assert!(!parse_approval_body(br#"{"is_approved": false}"#).unwrap());

        assert!(matches!(
            parse_approval_body(b""),
            Err(AppError::Validation(errors)) if errors["is_approved"][0] == REQUIRED_FIELD
        ));
        assert!(matches!(
            parse_approval_body(br#"{"is_approved": "yes"}"#),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_approval_body(b"{not json"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_approval_body(b"[true]"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_approval_body(b"true"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_show_all_flag() {
        let query = |v: Option<&str>| ListEventsQuery {
            show_all: v.map(str::to_string),
        };
        assert!(query(Some("true")).include_all());
        assert!(!query(Some("false")).include_all());
        assert!(!query(Some("banana")).include_all());
        assert!(!query(None).include_all());
    }
}
