use reqwest::StatusCode;

/// Everything that can go wrong talking to the authentication API.
/// A non-2xx answer and a transport failure are the two failure modes that matter.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: StatusCode,
        /// The `detail` message of a FastAPI-style error body, if any.
        detail: Option<String>,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Server-provided, human-readable explanation of the failure.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_exposes_detail() {
        let err = ApiError::Status {
            url: "http://localhost:8000/auth/login".to_string(),
            status: StatusCode::UNAUTHORIZED,
            detail: Some("Credenciais inválidas".to_string()),
        };
        assert_eq!(err.detail(), Some("Credenciais inválidas"));
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(
            err.to_string(),
            "http://localhost:8000/auth/login answered 401 Unauthorized"
        );
    }
}
