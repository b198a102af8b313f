//! Visibility and approval rules for events.
//!
//! Every function here is a pure decision over an [`Actor`] and, where
//! relevant, an [`Event`]. Storage and HTTP concerns live in
//! `services::event_service`, which consults these rules before touching
//! the repositories.

use crate::models::{Event, User};

/// An authenticated requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub is_admin: bool,
}

/// The requester of an operation, resolved once per request by the
/// actor middleware and passed explicitly into every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Actor {
    pub fn user(user_id: i64, is_admin: bool) -> Self {
        Actor::Authenticated(Principal { user_id, is_admin })
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated(principal) => Some(principal),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.principal().map(|p| p.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(|p| p.is_admin)
    }

    pub fn is_creator_of(&self, event: &Event) -> bool {
        self.user_id() == Some(event.creator_id)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor::user(user.id, user.is_admin)
    }
}

/// Moderation state of an event. `is_approved` is the stored form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    Approved,
}

impl ApprovalState {
    /// Every event starts pending, whatever the client asked for.
    pub const INITIAL: ApprovalState = ApprovalState::Pending;

    pub fn from_flag(is_approved: bool) -> Self {
        if is_approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Pending
        }
    }

    pub fn of(event: &Event) -> Self {
        Self::from_flag(event.is_approved)
    }

    pub fn is_approved(self) -> bool {
        self == ApprovalState::Approved
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
        }
    }
}

/// Which events a listing may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    ApprovedOnly,
}

impl ListScope {
    pub fn admits(self, event: &Event) -> bool {
        match self {
            ListScope::All => true,
            ListScope::ApprovedOnly => event.is_approved,
        }
    }
}

/// Approved events are public; pending ones are visible to their creator
/// and to admins only.
pub fn can_view(actor: &Actor, event: &Event) -> bool {
    event.is_approved || actor.is_creator_of(event) || actor.is_admin()
}

/// A request for every event is honoured for admins and quietly narrowed
/// to approved events for everyone else.
pub fn list_scope(actor: &Actor, include_all: bool) -> ListScope {
    if include_all && actor.is_admin() {
        ListScope::All
    } else {
        ListScope::ApprovedOnly
    }
}

pub fn can_create(actor: &Actor) -> bool {
    actor.is_authenticated()
}

pub fn can_delete(actor: &Actor, event: &Event) -> bool {
    actor.is_creator_of(event) || actor.is_admin()
}

pub fn can_approve(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Approval gates saving for everyone, creators and admins included.
pub fn can_save(actor: &Actor, event: &Event) -> bool {
    actor.is_authenticated() && event.is_approved
}
