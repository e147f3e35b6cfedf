pub mod error;
pub mod state;
pub mod store;

pub use error::AuthError;
pub use state::{SessionState, Transition};
pub use store::{AuthStore, FETCH_USER_FAILED_MESSAGE, LOGIN_FAILED_MESSAGE};
