use super::parse_event_id;
use crate::error::Result;
use crate::models::SavedEventListResponse;
use crate::policy::Actor;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// GET /api/saved-events
pub async fn list_saved_events(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<SavedEventListResponse>> {
    let saved_events = state.event_service.list_saved(&actor).await?;

    Ok(Json(SavedEventListResponse {
        count: saved_events.len(),
        saved_events,
    }))
}

/// POST /api/saved-events/{id}/toggle
///
/// 201 when the event was saved, 200 when it was removed.
pub async fn toggle_saved_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_event_id(&id)?;
    let outcome = state.event_service.toggle_save(&actor, id).await?;

    let response = if outcome.saved {
        (
            StatusCode::CREATED,
            Json(json!({ "message": "Event saved", "is_saved": true })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({ "message": "Event removed from saved", "is_saved": false })),
        )
    };

    Ok(response.into_response())
}
