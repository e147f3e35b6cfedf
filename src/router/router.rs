use tracing::info;

use super::guard::{GuardDecision, NavigationGuard};
use super::routes::{normalize, resolve, RouteMatch};

/// Redirects followed for a single navigation before giving up.
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("too many redirects while navigating to '{0}'")]
    RedirectLoop(String),
}

/// The outcome of a completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The normalized path that was asked for.
    pub requested: String,
    /// Where the navigation ended up.
    pub location: RouteMatch,
    /// Every redirect taken on the way, in order.
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Resolves paths, runs the guard and keeps track of where we are.
///
/// `navigate` borrows the router mutably, so navigations never overlap.
pub struct Router {
    guard: NavigationGuard,
    current: Option<RouteMatch>,
    history: Vec<RouteMatch>,
}

impl Router {
    pub fn new(guard: NavigationGuard) -> Self {
        Router {
            guard,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&RouteMatch> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[RouteMatch] {
        &self.history
    }

    /// Navigates to `path`, following guard redirects. The guard runs again
    /// on every redirect target. On error the current location is unchanged.
    pub async fn navigate(&mut self, path: &str) -> Result<Navigation, NavigationError> {
        let requested = normalize(path);
        let mut target = resolve(&requested).ok_or_else(|| NavigationError::NotFound(requested.clone()))?;
        let mut redirects = Vec::new();

        while let GuardDecision::Redirect(to) = self.guard.before_each(&target).await {
            if redirects.len() >= MAX_REDIRECTS {
                return Err(NavigationError::RedirectLoop(requested));
            }
            info!("Navigation to '{}' redirected to '{}'", target.path, to);
            redirects.push(to.to_string());
            target = resolve(to).ok_or_else(|| NavigationError::NotFound(to.to_string()))?;
        }

        self.current = Some(target.clone());
        self.history.push(target.clone());
        Ok(Navigation {
            requested,
            location: target,
            redirects,
        })
    }
}
