//! The auth store: session actions against the remote API.
//!
//! The store owns the session state and is the only thing that changes it.
//! Each action talks to the API through an injected `AuthApi`, persists the
//! token through an injected `KeyValueStorage`, and publishes every new state
//! on a watch channel so views can follow along.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::error::AuthError;
use super::state::{SessionState, Transition};
use crate::api::AuthApi;
use crate::models::{Credentials, LoginResponse, User};
use crate::storage::{KeyValueStorage, StorageError, TOKEN_KEY};
use crate::utils::log_throttle::should_emit;

/// Shown when the server gives no usable reason for a failed login.
pub const LOGIN_FAILED_MESSAGE: &str = "Erro ao fazer login";
/// Recorded when the user profile cannot be fetched.
pub const FETCH_USER_FAILED_MESSAGE: &str = "Erro ao buscar dados do usuário";

const VERIFY_LOG_WINDOW: Duration = Duration::from_secs(30);

pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStorage>,
    state: watch::Sender<SessionState>,
}

/// Holds the loading state for the duration of an action.
/// Dropping it settles a still-loading session, even if the action's future is cancelled.
struct LoadingScope<'a> {
    store: &'a AuthStore,
}

impl Drop for LoadingScope<'_> {
    fn drop(&mut self) {
        self.store.transition(Transition::Settle);
    }
}

impl AuthStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn KeyValueStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        AuthStore {
            api,
            storage,
            state,
        }
    }

    // -- Getters

    /// A snapshot of the current session.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receives every state the session goes through from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    // -- Actions

    /// Exchanges credentials for a session.
    ///
    /// On success the token is persisted and the user returned. On failure the
    /// session ends up `Failed` with the server's `detail` message (or a
    /// generic one) and storage is left untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let _loading = self.begin_loading();
        info!("Logging in as '{}'", credentials.username);

        match self.api.login(credentials).await {
            Ok(LoginResponse {
                access_token, user, ..
            }) => {
                if let Err(e) = self.establish(user.clone(), access_token).await {
                    self.transition(Transition::Fail(LOGIN_FAILED_MESSAGE.to_string()));
                    return Err(e.into());
                }
                info!("Logged in as '{}'", user.label());
                Ok(user)
            }
            Err(e) => {
                let message = e.detail().unwrap_or(LOGIN_FAILED_MESSAGE).to_string();
                warn!("Login for '{}' failed: {}", credentials.username, e);
                self.transition(Transition::Fail(message.clone()));
                Err(AuthError::Rejected { message, source: e })
            }
        }
    }

    /// Ends the session. The server is told when possible, but the local
    /// session and the stored token are dropped whatever it answers.
    pub async fn logout(&self) {
        let token = match self.token() {
            Some(token) => Some(token),
            None => self.stored_token().await,
        };
        let _loading = self.begin_loading();

        if let Err(e) = self.api.logout(token.as_deref()).await {
            warn!("Server-side logout failed: {}", e);
        }
        self.clear().await;
        info!("Logged out");
    }

    /// Answers "is there a valid session?", refreshing the session from the
    /// stored token when needed. Never fails: anything going wrong clears the
    /// session and yields `false`.
    ///
    /// A live session for the stored token is re-validated with
    /// `/auth/verify-token`. Otherwise (fresh start, or the stored token was
    /// replaced behind our back) the session is rebuilt from `/auth/me`.
    pub async fn check_auth(&self) -> bool {
        let Some(stored) = self.stored_token().await else {
            debug!("No stored token; session is anonymous");
            self.clear().await;
            return false;
        };

        let live = self.state.borrow().token() == Some(stored.as_str());
        if live {
            return match self.api.verify_token(&stored).await {
                Ok(()) => {
                    if let Some(suppressed_count) = should_emit("session.verify.ok", VERIFY_LOG_WINDOW) {
                        debug!(
                            event_name = "session.verify.ok",
                            suppressed_count, "stored session is still valid"
                        );
                    }
                    true
                }
                Err(e) => {
                    info!("Stored session is no longer valid: {}", e);
                    self.clear().await;
                    false
                }
            };
        }

        match self.api.me(&stored).await {
            Ok(user) => match self.establish(user, stored).await {
                Ok(()) => true,
                Err(_) => {
                    self.clear().await;
                    false
                }
            },
            Err(e) => {
                info!("Could not restore session from stored token: {}", e);
                self.clear().await;
                false
            }
        }
    }

    /// Reloads the user profile and returns it.
    ///
    /// Unlike the other actions this one hands the failure back to the caller,
    /// after recording a generic message in the session.
    pub async fn fetch_user(&self) -> Result<User, AuthError> {
        let (token, live) = match self.token() {
            Some(token) => (Some(token), true),
            None => (self.stored_token().await, false),
        };
        let Some(token) = token else {
            warn!("Cannot fetch user: no session token");
            self.transition(Transition::Fail(FETCH_USER_FAILED_MESSAGE.to_string()));
            return Err(AuthError::MissingToken);
        };

        let user = match self.api.me(&token).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Fetching the user failed: {}", e);
                self.transition(Transition::Fail(FETCH_USER_FAILED_MESSAGE.to_string()));
                return Err(e.into());
            }
        };

        if live {
            self.transition(Transition::SetUser(user.clone()));
        } else if let Err(e) = self.establish(user.clone(), token).await {
            self.transition(Transition::Fail(FETCH_USER_FAILED_MESSAGE.to_string()));
            return Err(e.into());
        }
        Ok(user)
    }

    // -- Internals

    fn transition(&self, transition: Transition) {
        self.state.send_if_modified(|state| {
            let next = state.clone().apply(transition);
            if *state == next {
                return false;
            }
            debug!("Session {} -> {}", state.name(), next.name());
            *state = next;
            true
        });
    }

    fn begin_loading(&self) -> LoadingScope<'_> {
        self.transition(Transition::Begin);
        LoadingScope { store: self }
    }

    /// Persists the token, then marks the session authenticated.
    async fn establish(&self, user: User, token: String) -> Result<(), StorageError> {
        if let Err(e) = self.storage.set(TOKEN_KEY, &token).await {
            error!("Could not persist session token: {}", e);
            return Err(e);
        }
        self.transition(Transition::SetAuth { user, token });
        Ok(())
    }

    /// Removes the stored token, then drops the session.
    async fn clear(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY).await {
            error!("Could not remove stored session token: {}", e);
        }
        self.transition(Transition::Clear);
    }

    /// A storage read failure counts as "no token".
    async fn stored_token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read stored session token: {}", e);
                None
            }
        }
    }
}
