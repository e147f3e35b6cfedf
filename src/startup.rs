//! Application startup.
//!
//! Wires the API client, the durable storage and the auth store together
//! from the configuration.

use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::config::ConfigV1;
use crate::session::AuthStore;
use crate::state::AppState;
use crate::storage::create_storage;

/// Builds the application state described by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build(config: Arc<ConfigV1>) -> Result<AppState, ApiError> {
    let api = Arc::new(ApiClient::new(&config.api)?);
    let storage = create_storage(&config.storage);
    info!(
        "Session API at {}, token kept in {}",
        api.base_url(),
        storage.describe()
    );

    let store = Arc::new(AuthStore::new(api, storage.clone()));
    Ok(AppState {
        config,
        store,
        storage,
    })
}
