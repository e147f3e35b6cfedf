use crate::api::ApiError;
use crate::storage::StorageError;

/// Failures surfaced by the session store's actions.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The server refused the login; `message` is what the user should see.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no session token available")]
    MissingToken,
}
