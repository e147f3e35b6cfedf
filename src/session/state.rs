//! Session state and the single function allowed to change it.
//!
//! The session is one of four explicit variants instead of a bag of
//! independent flags, so combinations such as "loading while still
//! authenticated" cannot be represented.

use std::fmt;

use crate::models::User;

/// Where the session currently stands.
#[derive(Clone, PartialEq, Default)]
pub enum SessionState {
    /// No session.
    #[default]
    Anonymous,
    /// A login or logout round-trip is in flight.
    Authenticating,
    /// The server accepted `token` on the last verification call.
    Authenticated { user: User, token: String },
    /// The last action failed; `error` is meant for the user.
    Failed { error: String },
}

/// The state changes an action can request.
#[derive(Clone, PartialEq)]
pub enum Transition {
    /// An action started a round-trip (set-loading).
    Begin,
    /// Record a user-visible failure (set-error).
    Fail(String),
    /// Establish a session; clears any previous error.
    SetAuth { user: User, token: String },
    /// Drop the session.
    Clear,
    /// Replace the user of an established session.
    SetUser(User),
    /// A round-trip ended without reaching a result: leave the loading state.
    Settle,
}

impl SessionState {
    /// The transition function. Every state change goes through here.
    pub fn apply(self, transition: Transition) -> SessionState {
        match (self, transition) {
            (_, Transition::Begin) => SessionState::Authenticating,
            (_, Transition::Fail(error)) => SessionState::Failed { error },
            (_, Transition::SetAuth { user, token }) => SessionState::Authenticated { user, token },
            (_, Transition::Clear) => SessionState::Anonymous,
            (SessionState::Authenticated { token, .. }, Transition::SetUser(user)) => {
                SessionState::Authenticated { user, token }
            }
            (state, Transition::SetUser(_)) => state,
            (SessionState::Authenticating, Transition::Settle) => SessionState::Anonymous,
            (state, Transition::Settle) => state,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn loading(&self) -> bool {
        matches!(self, SessionState::Authenticating)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// False when there is no user.
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    /// Variant name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::Failed { .. } => "failed",
        }
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Anonymous => f.write_str("Anonymous"),
            SessionState::Authenticating => f.write_str("Authenticating"),
            SessionState::Authenticated { user, .. } => f
                .debug_struct("Authenticated")
                .field("user", user)
                .field("token", &"<redacted>")
                .finish(),
            SessionState::Failed { error } => {
                f.debug_struct("Failed").field("error", error).finish()
            }
        }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Begin => f.write_str("Begin"),
            Transition::Fail(error) => f.debug_tuple("Fail").field(error).finish(),
            Transition::SetAuth { user, .. } => f
                .debug_struct("SetAuth")
                .field("user", user)
                .field("token", &"<redacted>")
                .finish(),
            Transition::Clear => f.write_str("Clear"),
            Transition::SetUser(user) => f.debug_tuple("SetUser").field(user).finish(),
            Transition::Settle => f.write_str("Settle"),
        }
    }
}
