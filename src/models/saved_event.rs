use super::event::{EventView, EventWithCreator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SavedEventRecord {
    pub saved_id: i64,
    pub saved_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub event: EventWithCreator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEventView {
    pub id: i64,
    pub event: EventView,
    pub saved_at: DateTime<Utc>,
}

impl From<SavedEventRecord> for SavedEventView {
    fn from(record: SavedEventRecord) -> Self {
        SavedEventView {
            id: record.saved_id,
            // Every row in the listing belongs to the requesting user.
            event: EventView::new(record.event, true),
            saved_at: record.saved_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedEventListResponse {
    pub saved_events: Vec<SavedEventView>,
    pub count: usize,
}

/// Result of flipping a save: `saved` is the state after the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub saved: bool,
}
