use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::routes::{Access, RouteMatch};
use crate::session::AuthStore;

/// Where unauthenticated visitors are sent.
pub const LOGIN_REDIRECT: &str = "/login";
/// Where authenticated users are sent away from guest-only pages.
pub const HOME_REDIRECT: &str = "/";

/// Anything that can tell whether there is a valid session right now.
#[async_trait]
pub trait SessionCheck: Send + Sync {
    /// Must not fail: any error counts as "not authenticated".
    async fn check_auth(&self) -> bool;
}

#[async_trait]
impl SessionCheck for AuthStore {
    async fn check_auth(&self) -> bool {
        AuthStore::check_auth(self).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Abort the navigation and go here instead.
    Redirect(&'static str),
}

/// The access policy, given a route's requirement and the session status.
pub fn decide(access: Access, authenticated: bool) -> GuardDecision {
    match (access, authenticated) {
        (Access::RequiresAuth, false) => GuardDecision::Redirect(LOGIN_REDIRECT),
        (Access::RequiresGuest, true) => GuardDecision::Redirect(HOME_REDIRECT),
        _ => GuardDecision::Proceed,
    }
}

/// Runs before every navigation.
pub struct NavigationGuard {
    session: Arc<dyn SessionCheck>,
}

impl NavigationGuard {
    pub fn new(session: Arc<dyn SessionCheck>) -> Self {
        NavigationGuard { session }
    }

    /// Checks the session (possibly over the network) and applies the policy to `target`.
    pub async fn before_each(&self, target: &RouteMatch) -> GuardDecision {
        let authenticated = self.session.check_auth().await;
        let decision = decide(target.route.access, authenticated);
        debug!(
            "Guard for '{}' ({:?}, authenticated={}): {:?}",
            target.path, target.route.access, authenticated, decision
        );
        decision
    }
}
