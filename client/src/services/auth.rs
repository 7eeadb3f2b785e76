//! Authentication service for login, logout, and session queries

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use shared::{validate_password, validate_username, Session, User};

use crate::error::{ApiError, ApiResult, FieldError};
use crate::http::ApiClient;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

/// Device metadata sent with mobile logins
#[derive(Debug, Clone, Serialize, Default)]
pub struct DeviceInfo {
    pub device_id: Option<String>,
    pub platform: Option<String>,
    pub app_version: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    device_info: &'a DeviceInfo,
}

/// Wire shape of the login response, normalized into a `Session`
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    /// Access token lifetime in seconds
    expires_in: i64,
    user: User,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for tokens and persist the session
    ///
    /// On any failure the prior session, if one exists, is left untouched.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        device_info: DeviceInfo,
    ) -> ApiResult<Session> {
        let mut errors = Vec::new();
        if let Err(message) = validate_username(username) {
            errors.push(FieldError {
                field: "username".to_string(),
                message: message.to_string(),
            });
        }
        if let Err(message) = validate_password(password) {
            errors.push(FieldError {
                field: "password".to_string(),
                message: message.to_string(),
            });
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation { errors });
        }

        let request = LoginRequest {
            username,
            password,
            device_info: &device_info,
        };
        let response: LoginResponse = self
            .api
            .post_public("/api/auth/login/mobile", &request)
            .await?;

        let session = Session {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            user: response.user,
        };
        self.api.sessions().replace(session.clone()).await?;

        tracing::info!(username = %session.user.username, "logged in");
        Ok(session)
    }

    /// Log out, clearing local credentials
    ///
    /// The server is notified best-effort; a failed notification never
    /// blocks the local logout.
    pub async fn logout(&self) -> ApiResult<()> {
        if self.api.sessions().is_authenticated().await {
            if let Err(e) = self.api.post_no_content("/api/auth/logout").await {
                tracing::warn!(error = %e, "server logout notification failed");
            }
        }
        self.api.sessions().clear().await
    }

    /// The currently authenticated user, if any
    pub async fn current_user(&self) -> Option<User> {
        self.api.sessions().user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api.sessions().is_authenticated().await
    }
}
