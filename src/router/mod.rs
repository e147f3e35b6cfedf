pub mod guard;
pub mod router;
pub mod routes;

// Re-export so callers can do "use crate::router::{Router, NavigationGuard};"
pub use guard::{decide, GuardDecision, NavigationGuard, SessionCheck, HOME_REDIRECT, LOGIN_REDIRECT};
pub use router::{Navigation, NavigationError, Router, MAX_REDIRECTS};
pub use routes::{resolve, Access, RouteDef, RouteMatch, View, ROUTES};
