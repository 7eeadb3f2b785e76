//! HTTP transport for the PackTrace API
//!
//! Attaches credentials, normalizes error bodies, and performs the single
//! token-refresh round-trip on 401 before replaying the original request
//! exactly once.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use shared::{AuthTokens, Session};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionManager;

/// Credentials attached to an outgoing request
enum Credentials<'a> {
    /// Bearer token when one is held, basic-auth fallback otherwise
    Bearer(Option<&'a str>),
    /// No credentials (login, token refresh)
    Public,
}

/// Authenticated HTTP client for the remote tracking API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    basic_auth: Option<(String, String)>,
    sessions: SessionManager,
    /// Serializes token refreshes so concurrent 401s trigger one round-trip
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new ApiClient
    pub fn new(config: &Config, sessions: SessionManager) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let basic_auth = match (
            &config.api.basic_auth_username,
            &config.api.basic_auth_password,
        ) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            basic_auth,
            sessions,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// GET a resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::GET, path, None, None).await
    }

    /// GET a resource with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        self.execute(Method::GET, path, None, Some(query)).await
    }

    /// POST a JSON body
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize request: {}", e)))?;
        self.execute(Method::POST, path, Some(body), None).await
    }

    /// POST with no body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::POST, path, None, None).await
    }

    /// POST with no body, discarding any response payload
    pub async fn post_no_content(&self, path: &str) -> ApiResult<()> {
        let response = self.execute_raw(Method::POST, path, &None, None).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }

    /// PATCH with no body (lifecycle transitions)
    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::PATCH, path, None, None).await
    }

    /// POST without credentials (login, refresh)
    ///
    /// A 401 here means the submitted credentials are wrong; it never
    /// touches the stored session.
    pub async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize request: {}", e)))?;
        let response = self
            .send(Method::POST, path, &Some(body), None, Credentials::Public)
            .await?;
        Self::decode(response).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        query: Option<&[(&str, String)]>,
    ) -> ApiResult<T> {
        let response = self.execute_raw(method, path, &body, query).await?;
        Self::decode(response).await
    }

    /// Send an authenticated request, refreshing and replaying once on 401
    async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        body: &Option<serde_json::Value>,
        query: Option<&[(&str, String)]>,
    ) -> ApiResult<reqwest::Response> {
        // Capture the token the request actually carries; the session may
        // be replaced by a concurrent refresh while this request is in
        // flight, and only the attached token is known to be stale on 401.
        let attached = self.sessions.current().await.map(|s| s.access_token);
        let response = self
            .send(
                method.clone(),
                path,
                body,
                query,
                Credentials::Bearer(attached.as_deref()),
            )
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // A 401 without a session means the basic-auth fallback (or the
        // anonymous request) was rejected; there is nothing to refresh.
        let Some(stale_token) = attached else {
            return Ok(response);
        };

        self.refresh_session(&stale_token).await?;
        tracing::debug!(%path, "replaying request after token refresh");
        let fresh = self.sessions.current().await.map(|s| s.access_token);
        self.send(method, path, body, query, Credentials::Bearer(fresh.as_deref()))
            .await
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Exactly one refresh per stale token: requests that queued behind a
    /// concurrent refresh observe the replaced session and return early.
    /// On refresh failure the session is cleared and the caller gets an
    /// authentication error.
    async fn refresh_session(&self, stale_token: &str) -> ApiResult<()> {
        let _guard = self.refresh_lock.lock().await;

        let Some(session) = self.sessions.current().await else {
            return Err(ApiError::Authentication(
                "Session expired and no refresh token is available".to_string(),
            ));
        };
        if session.access_token != stale_token {
            // Another request already refreshed while we waited.
            return Ok(());
        }

        let body = serde_json::json!({ "refresh_token": session.refresh_token });
        let response = self
            .send(
                Method::POST,
                "/api/auth/refresh",
                &Some(body),
                None,
                Credentials::Public,
            )
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            self.sessions.clear().await?;
            tracing::warn!(status, "token refresh rejected, session cleared");
            return Err(ApiError::Authentication(
                "Session expired and refresh was rejected".to_string(),
            ));
        }

        let tokens: AuthTokens = response
            .json()
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to parse refresh response: {}", e)))?;

        let expires_at = tokens.expires_at();
        self.sessions
            .replace(Session {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_at,
                user: session.user,
            })
            .await?;

        tracing::debug!("access token refreshed");
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: &Option<serde_json::Value>,
        query: Option<&[(&str, String)]>,
        credentials: Credentials<'_>,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        match credentials {
            Credentials::Bearer(Some(token)) => {
                request = request.bearer_auth(token);
            }
            Credentials::Bearer(None) => {
                if let Some((user, pass)) = &self.basic_auth {
                    let encoded = base64::engine::general_purpose::STANDARD
                        .encode(format!("{}:{}", user, pass));
                    request = request.header(header::AUTHORIZATION, format!("Basic {}", encoded));
                }
            }
            Credentials::Public => {}
        }

        tracing::debug!(%method, %url, "sending request");
        request.send().await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "request failed");
            ApiError::Network(e.to_string())
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to parse response: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }
}
