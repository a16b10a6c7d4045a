use async_trait::async_trait;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::models::{AdminOverview, Message, Notification, UserProfile};

/// BackendError
///
/// Failure of one call to the external REST backend. Upstream error bodies
/// are carried verbatim so the UI layer can display exactly what the backend
/// said, rather than a paraphrase produced here.
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Transport-level failure: connect, timeout, TLS, body read.
    Transport(String),
    /// The backend answered with a non-2xx status. `body` is the raw
    /// response body, unmodified.
    Upstream { status: u16, body: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(msg) => write!(f, "backend transport error: {}", msg),
            BackendError::Upstream { status, body } => {
                write!(f, "backend returned {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    /// The HTTP status this error surfaces as to the gateway's own caller.
    /// Upstream statuses pass through; transport failures map to 502.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BackendError::Transport(_) => StatusCode::BAD_GATEWAY,
            BackendError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

/// Backend Trait
///
/// The abstract contract for every call this gateway makes to the external
/// REST backend. Handlers depend on this trait, not on the HTTP client, so
/// tests swap in [`MockBackend`] without a network.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Backend>`)
/// safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches the profile of the token's owner (`GET /users/me`).
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, BackendError>;

    /// Fetches a forum thread: the top-level message with its ordered replies.
    async fn fetch_thread(&self, id: Uuid, token: &str) -> Result<Message, BackendError>;

    /// Lists the caller's notifications.
    async fn fetch_notifications(&self, token: &str) -> Result<Vec<Notification>, BackendError>;

    /// Fetches the counters for the admin overview surface.
    async fn fetch_admin_overview(&self, token: &str) -> Result<AdminOverview, BackendError>;

    /// Asks the session provider to invalidate the session behind `token`.
    /// The gateway calls this when the redirect gate detects expiry.
    async fn sign_out(&self, token: &str) -> Result<(), BackendError>;

    /// Reports a page visit. Non-critical telemetry: implementations swallow
    /// every failure, so this cannot surface an error.
    async fn track_visit(&self, path: &str, token: &str);
}

/// BackendState
///
/// The concrete type used to share backend access across the application state.
pub type BackendState = Arc<dyn Backend>;

/// RestBackend
///
/// The concrete implementation of [`Backend`], speaking JSON over HTTPS to
/// the platform's REST API. Every request attaches
/// `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
}

impl RestBackend {
    /// Constructs the client against the configured backend base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Shared GET wrapper: bearer auth, status check, typed deserialization.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, BackendError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    /// Decodes a response, preserving a non-2xx body verbatim.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, BackendError> {
        self.get_json("/users/me", token).await
    }

    async fn fetch_thread(&self, id: Uuid, token: &str) -> Result<Message, BackendError> {
        self.get_json(&format!("/forum/messages/{}", id), token).await
    }

    async fn fetch_notifications(&self, token: &str) -> Result<Vec<Notification>, BackendError> {
        self.get_json("/notifications", token).await
    }

    async fn fetch_admin_overview(&self, token: &str) -> Result<AdminOverview, BackendError> {
        self.get_json("/admin/overview", token).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(format!("{}/auth/logout", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// track_visit
    ///
    /// Fire-and-forget telemetry. Fails silently: a lost visit record must
    /// never affect the user-facing request.
    async fn track_visit(&self, path: &str, token: &str) {
        let result = self
            .http
            .post(format!("{}/visits", self.base_url))
            .bearer_auth(token)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await;

        if let Err(e) = result {
            tracing::debug!("visit tracking failed: {}", e);
        }
    }
}

/// MockBackend
///
/// Mock implementation of [`Backend`] used exclusively for tests. Pre-canned
/// outputs are set on the fields; `sign_out_calls` records the sign-out side
/// effect so tests can assert the expired-session path.
#[derive(Default)]
pub struct MockBackend {
    /// When true, every data call returns a simulated upstream failure.
    pub should_fail: bool,
    pub profile_to_return: Option<UserProfile>,
    pub thread_to_return: Option<Message>,
    pub notifications_to_return: Vec<Notification>,
    pub overview_to_return: AdminOverview,
    /// Number of times `sign_out` was invoked.
    pub sign_out_calls: AtomicUsize,
    /// Number of times `track_visit` was invoked.
    pub visit_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn failure(&self) -> BackendError {
        BackendError::Upstream {
            status: 503,
            body: "mock backend unavailable".to_string(),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_profile(&self, _token: &str) -> Result<UserProfile, BackendError> {
        if self.should_fail {
            return Err(self.failure());
        }
        self.profile_to_return.clone().ok_or(BackendError::Upstream {
            status: 404,
            body: "profile not found".to_string(),
        })
    }

    async fn fetch_thread(&self, _id: Uuid, _token: &str) -> Result<Message, BackendError> {
        if self.should_fail {
            return Err(self.failure());
        }
        self.thread_to_return.clone().ok_or(BackendError::Upstream {
            status: 404,
            body: "thread not found".to_string(),
        })
    }

    async fn fetch_notifications(&self, _token: &str) -> Result<Vec<Notification>, BackendError> {
        if self.should_fail {
            return Err(self.failure());
        }
        Ok(self.notifications_to_return.clone())
    }

    async fn fetch_admin_overview(&self, _token: &str) -> Result<AdminOverview, BackendError> {
        if self.should_fail {
            return Err(self.failure());
        }
        Ok(self.overview_to_return.clone())
    }

    async fn sign_out(&self, _token: &str) -> Result<(), BackendError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(self.failure());
        }
        Ok(())
    }

    async fn track_visit(&self, _path: &str, _token: &str) {
        self.visit_calls.fetch_add(1, Ordering::SeqCst);
    }
}
