//! Route guard for protected pages.

use crate::store::{KeyValueStore, SessionStore};

/// Navigation target handed back to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub route: String,
}

impl Redirect {
    pub fn to(route: impl Into<String>) -> Self {
        Self { route: route.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Redirect),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Decide whether a protected route may load.
///
/// Requires the login flag and a user record that still decodes; a missing,
/// expired or tampered session sends the user to the login route instead of
/// surfacing an error.
pub fn auth_guard<S: KeyValueStore>(store: &SessionStore<S>) -> GuardDecision {
    if !store.is_logged_in() {
        tracing::debug!("no login flag; redirecting");
        return GuardDecision::Redirect(Redirect::to(store.config().login_route.clone()));
    }
    if store.get_user().is_none() {
        tracing::debug!("login flag without a readable user; redirecting");
        return GuardDecision::Redirect(Redirect::to(store.config().login_route.clone()));
    }
    GuardDecision::Allow
}
