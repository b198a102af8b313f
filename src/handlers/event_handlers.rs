use super::{parse_event_id, parse_json_body};
use crate::error::Result;
use crate::models::{CreateEventPayload, EventListResponse, EventView, ListEventsQuery};
use crate::policy::Actor;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// GET /api/events?show_all=true
///
/// `show_all` only widens the listing for admins; for anyone else it is
/// ignored and approved events are returned.
pub async fn list_events(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<EventListResponse>> {
    let events = state
        .event_service
        .list_events(&actor, query.include_all())
        .await?;

    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}

/// POST /api/events/create
pub async fn create_event(
    State(state): State<AppState>,
    actor: Actor,
    body: Bytes,
) -> Result<Response> {
    let payload: CreateEventPayload = parse_json_body(&body)?;
    let event = state.event_service.create_event(&actor, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event created successfully. Waiting for admin approval.",
            "event": event,
        })),
    )
        .into_response())
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<EventView>> {
    let id = parse_event_id(&id)?;
    let event = state.event_service.get_event(&actor, id).await?;
    Ok(Json(event))
}

/// DELETE /api/events/{id}/delete
pub async fn delete_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_event_id(&id)?;
    state.event_service.delete_event(&actor, id).await?;
    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

/// PATCH /api/events/{id}/approve
///
/// The body is taken raw so that a non-admin gets 403 before any attempt
/// to parse it.
pub async fn approve_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let id = parse_event_id(&id)?;
    let event = state.event_service.set_approval(&actor, id, &body).await?;

    let message = if event.is_approved {
        "Event approved successfully"
    } else {
        "Event approval revoked"
    };

    Ok(Json(json!({ "message": message, "event": event })))
}
