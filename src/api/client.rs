use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::models::{Credentials, LoginResponse, User};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const VERIFY_TOKEN_PATH: &str = "/auth/verify-token";
pub const ME_PATH: &str = "/auth/me";

/// The remote authentication API as seen by the session store.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// POST credentials, returning the issued token and the user.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    /// Revoke the token server-side. Sent without a bearer header when no token is known.
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;
    /// Succeeds iff the server still accepts the token.
    async fn verify_token(&self, token: &str) -> Result<(), ApiError>;
    /// The profile of the user owning the token.
    async fn me(&self, token: &str) -> Result<User, ApiError>;
}

/// Builds and sends requests against the configured base URL.
///
/// The bearer token is supplied per request by the caller; the underlying
/// `reqwest::Client` carries no default authorization header.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_in_ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(timeout_in_ms));
        }
        let http = builder.build().map_err(ApiError::Client)?;
        info!("Creating API client for '{}'", config.base_url);
        Ok(ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A request for `path`, carrying `Authorization: Bearer <token>` when a token is given.
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and turns any non-2xx answer into `ApiError::Status`.
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!("Sending request to {}", url);
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string));
        debug!("{} answered {} (detail: {:?})", url, status, detail);
        Err(ApiError::Status {
            url,
            status,
            detail,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, path).await?;
        response.json::<T>().await.map_err(|source| ApiError::Decode {
            url: self.url(path),
            source,
        })
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self
            .request(Method::POST, LOGIN_PATH, None)
            .json(credentials);
        self.send_json(request, LOGIN_PATH).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let request = self.request(Method::POST, LOGOUT_PATH, token);
        self.send(request, LOGOUT_PATH).await.map(|_| ())
    }

    async fn verify_token(&self, token: &str) -> Result<(), ApiError> {
        let request = self.request(Method::POST, VERIFY_TOKEN_PATH, Some(token));
        self.send(request, VERIFY_TOKEN_PATH).await.map(|_| ())
    }

    async fn me(&self, token: &str) -> Result<User, ApiError> {
        let request = self.request(Method::GET, ME_PATH, Some(token));
        self.send_json(request, ME_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: url,
            timeout_in_ms: None,
        })
        .expect("client should build")
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = client_for("http://localhost:8000/".to_string());
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(ME_PATH), "http://localhost:8000/auth/me");
    }

    /// Login posts the credentials as JSON, without any bearer header.
    #[tokio::test]
    async fn test_login_success() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", LOGIN_PATH)
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"username": "a", "password": "b"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "T1", "token_type": "bearer", "expires_in": 1800, "user": {"id": 1, "role": "administrador"}}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let response = client.login(&Credentials::new("a", "b")).await.unwrap();
        m.assert_async().await;

        assert_eq!(response.access_token, "T1");
        assert_eq!(response.expires_in, Some(1800));
        assert!(response.user.is_admin());
    }

    #[tokio::test]
    async fn test_login_failure_carries_detail() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", LOGIN_PATH)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Credenciais inválidas"}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.login(&Credentials::new("a", "wrong")).await.unwrap_err();
        m.assert_async().await;

        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
        assert_eq!(err.detail(), Some("Credenciais inválidas"));
    }

    /// Validation errors carry a list in `detail`; that is not a message we can show.
    #[tokio::test]
    async fn test_non_string_detail_is_ignored() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", LOGIN_PATH)
            .with_status(422)
            .with_body(r#"{"detail": [{"loc": ["body", "password"], "msg": "field required"}]}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.login(&Credentials::new("a", "")).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.detail(), None);
    }

    #[tokio::test]
    async fn test_login_with_malformed_body_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", LOGIN_PATH)
            .with_status(200)
            .with_body(r#"{"user": {"id": 1}}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.login(&Credentials::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_me_sends_bearer_header() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", ME_PATH)
            .match_header("authorization", "Bearer T1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 3, "username": "joao", "role": "tecnico"}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let user = client.me("T1").await.unwrap();
        m.assert_async().await;
        assert_eq!(user.username.as_deref(), Some("joao"));
    }

    #[tokio::test]
    async fn test_verify_token_rejected() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", VERIFY_TOKEN_PATH)
            .match_header("authorization", "Bearer expired")
            .with_status(401)
            .with_body(r#"{"detail": "Token inválido"}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.verify_token("expired").await.unwrap_err();
        m.assert_async().await;
        assert_eq!(err.detail(), Some("Token inválido"));
    }

    #[tokio::test]
    async fn test_logout_without_token_has_no_header() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", LOGOUT_PATH)
            .match_header("authorization", Matcher::Missing)
            .with_status(403)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert!(client.logout(None).await.is_err());
        m.assert_async().await;
    }

    /// Nothing listens on port 1, so the request never reaches a server.
    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = client_for("http://127.0.0.1:1".to_string());
        let err = client.me("T1").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.detail(), None);
    }
}
