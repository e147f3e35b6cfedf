//! Shared application state.
//!
//! One `AppState` per running application: everything that needs the
//! session gets it from here instead of from a global.

use crate::config::ConfigV1;
use crate::router::{NavigationGuard, Router};
use crate::session::AuthStore;
use crate::storage::KeyValueStorage;
use std::sync::Arc;

/// Application state handed to whatever drives the router and the views.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The session store; the single owner of session state.
    pub store: Arc<AuthStore>,
    /// Durable storage backing the store.
    pub storage: Arc<dyn KeyValueStorage>,
}

impl AppState {
    /// A fresh router whose guard consults this state's session.
    pub fn router(&self) -> Router {
        Router::new(NavigationGuard::new(self.store.clone()))
    }
}
