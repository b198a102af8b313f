use crate::error::{AppError, Result};
use crate::models::event::parse_approval_body;
use crate::models::{CreateEventPayload, EventView, SavedEventView, ToggleOutcome};
use crate::policy::{self, Actor, ApprovalState};
use crate::repositories::{EventRepository, RepositoryError, SavedEventRepository};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies the visibility and approval rules in [`crate::policy`] to
/// stored events. Every method takes the requesting [`Actor`] explicitly.
pub struct EventService {
    events: Arc<dyn EventRepository>,
    saved_events: Arc<dyn SavedEventRepository>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        saved_events: Arc<dyn SavedEventRepository>,
    ) -> Self {
        Self {
            events,
            saved_events,
        }
    }

    /// Lists events newest first. `include_all` is only honoured for admins;
    /// everyone else gets the approved events without an error.
    pub async fn list_events(&self, actor: &Actor, include_all: bool) -> Result<Vec<EventView>> {
        let scope = policy::list_scope(actor, include_all);
        let records = self.events.list(scope).await?;
        let saved = self.saved_event_ids(actor).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let is_saved = saved.contains(&record.event.id);
                EventView::new(record, is_saved)
            })
            .collect())
    }

    /// Creates a pending event owned by the actor. Whatever the payload
    /// says about creator or approval is ignored.
    pub async fn create_event(
        &self,
        actor: &Actor,
        payload: CreateEventPayload,
    ) -> Result<EventView> {
        let creator_id = match actor.user_id() {
            Some(id) if policy::can_create(actor) => id,
            _ => return Err(AppError::AuthenticationFailed),
        };

        let new_event = payload.validate().map_err(AppError::Validation)?;
        let event = self.events.create(creator_id, new_event).await?;

        info!(
            event_id = event.id,
            creator_id,
            state = ApprovalState::INITIAL.as_str(),
            "Event created"
        );

        self.get_event(actor, event.id).await
    }

    /// Missing events and events the actor may not see produce the same error.
    pub async fn get_event(&self, actor: &Actor, id: i64) -> Result<EventView> {
        let record = self
            .events
            .find_with_creator(id)
            .await?
            .filter(|record| policy::can_view(actor, &record.event))
            .ok_or_else(AppError::event_not_found)?;

        let is_saved = match actor.user_id() {
            Some(user_id) => self.saved_events.exists(user_id, id).await?,
            None => false,
        };

        Ok(EventView::new(record, is_saved))
    }

    pub async fn delete_event(&self, actor: &Actor, id: i64) -> Result<()> {
        if !actor.is_authenticated() {
            return Err(AppError::AuthenticationFailed);
        }

        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::event_not_found)?;

        if !policy::can_delete(actor, &event) {
            warn!(event_id = id, actor_id = ?actor.user_id(), "Rejected event deletion");
            return Err(AppError::Forbidden(
                "You do not have permission to delete this event".to_string(),
            ));
        }

        match self.events.delete(id).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(AppError::event_not_found()),
            Err(e) => return Err(e.into()),
        }

        info!(
            event_id = id,
            actor_id = ?actor.user_id(),
            state = ApprovalState::of(&event).as_str(),
            "Event deleted"
        );
        Ok(())
    }

    /// Sets the approval flag to the requested value. Admin rights are
    /// checked before the body is even parsed.
    pub async fn set_approval(&self, actor: &Actor, id: i64, body: &[u8]) -> Result<EventView> {
        if !actor.is_authenticated() {
            return Err(AppError::AuthenticationFailed);
        }

        if !policy::can_approve(actor) {
            warn!(event_id = id, actor_id = ?actor.user_id(), "Rejected approval change");
            return Err(AppError::Forbidden(
                "Only admins can approve events".to_string(),
            ));
        }

        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::event_not_found)?;

        let target = ApprovalState::from_flag(parse_approval_body(body)?);
        let current = ApprovalState::of(&event);

        match self.events.set_approved(id, target.is_approved()).await {
            Ok(_) => {}
            Err(RepositoryError::NotFound) => return Err(AppError::event_not_found()),
            Err(e) => return Err(e.into()),
        }

        info!(
            event_id = id,
            admin_id = ?actor.user_id(),
            from = current.as_str(),
            to = target.as_str(),
            "Event approval updated"
        );

        self.get_event(actor, id).await
    }

    /// Saves the event if the actor has not saved it yet, unsaves it otherwise.
    pub async fn toggle_save(&self, actor: &Actor, id: i64) -> Result<ToggleOutcome> {
        let user_id = actor.user_id().ok_or(AppError::AuthenticationFailed)?;

        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::event_not_found)?;

        if !policy::can_save(actor, &event) {
            return Err(AppError::BadRequest(
                "Cannot save unapproved events".to_string(),
            ));
        }

        if self.saved_events.exists(user_id, id).await? {
            // A concurrent unsave may already have removed the row.
            let removed = self.saved_events.remove(user_id, id).await?;
            debug!(event_id = id, user_id, removed, "Event unsaved");
            return Ok(ToggleOutcome { saved: false });
        }

        match self.saved_events.insert(user_id, id).await {
            Ok(()) => {
                debug!(event_id = id, user_id, "Event saved");
                Ok(ToggleOutcome { saved: true })
            }
            // The unique (user, event) pair was inserted by a concurrent toggle.
            Err(RepositoryError::AlreadyExists) => {
                debug!(event_id = id, user_id, "Event already saved");
                Ok(ToggleOutcome { saved: true })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The actor's saved events, newest save first. Saves whose event is no
    /// longer visible to the actor are left out.
    pub async fn list_saved(&self, actor: &Actor) -> Result<Vec<SavedEventView>> {
        let user_id = actor.user_id().ok_or(AppError::AuthenticationFailed)?;

        let records = self.saved_events.list_for_user(user_id).await?;

        Ok(records
            .into_iter()
            .filter(|record| policy::can_view(actor, &record.event.event))
            .map(SavedEventView::from)
            .collect())
    }

    async fn saved_event_ids(&self, actor: &Actor) -> Result<HashSet<i64>> {
        match actor.user_id() {
            Some(user_id) => Ok(self.saved_events.saved_event_ids(user_id).await?),
            None => Ok(HashSet::new()),
        }
    }
}
