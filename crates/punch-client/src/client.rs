//! Backend HTTP client.

use std::time::Duration;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use punch_models::{
    AccessPolicy, AttendanceRecord, Frame, Recognition, RegistrationForm, Stats, SubmissionMode,
    UserId, UserRecord,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{RecognizeResponse, Registration};

/// Client for the attendance backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    policy: AccessPolicy,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: ClientConfig, policy: AccessPolicy) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config, policy })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env(), AccessPolicy::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Submit a frame for recognition.
    ///
    /// A 2xx reply is an accepted punch; anything else comes back as
    /// [`ClientError::Rejected`] carrying the backend's `detail` message.
    pub async fn recognize(&self, mode: SubmissionMode, frame: &Frame) -> ClientResult<Recognition> {
        let url = self.config.endpoint("recognize");

        let form = Form::new()
            .text("type", mode.as_str())
            .part("file", frame_part(frame)?);

        debug!(mode = %mode, bytes = frame.len(), "Submitting frame for recognition");

        let response = self.authorize(self.http.post(&url)).multipart(form).send().await?;
        let body: RecognizeResponse = read_json(response).await?;

        Ok(Recognition {
            message: body.message,
            user: body.user,
            mode,
            server_timestamp: body.timestamp.unwrap_or_else(Utc::now),
        })
    }

    /// Enroll a new user with a reference image.
    ///
    /// The access policy decides the role that is actually sent.
    pub async fn register(&self, form: &RegistrationForm, frame: &Frame) -> ClientResult<Registration> {
        form.check()?;

        let url = self.config.endpoint("register");
        let role = self.policy.effective_role(&form.email, form.role);

        let multipart = Form::new()
            .text("name", form.name.clone())
            .text("email", form.email.clone())
            .text("password", form.password.clone())
            .text("role", role.as_str())
            .part("file", frame_part(frame)?);

        let response = self.authorize(self.http.post(&url)).multipart(multipart).send().await?;
        let body: serde_json::Value = read_json(response).await?;

        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string);
        let user = body
            .get("user")
            .cloned()
            .and_then(|u| serde_json::from_value::<UserRecord>(u).ok())
            .map(|u| self.policy.apply(u));

        Ok(Registration { role, message, user })
    }

    /// List all users.
    pub async fn list_users(&self) -> ClientResult<Vec<UserRecord>> {
        let users: Vec<UserRecord> = self.get_json("users").await?;
        Ok(users.into_iter().map(|u| self.policy.apply(u)).collect())
    }

    /// Look up a user by email; `None` when not registered.
    pub async fn login(&self, email: &str) -> ClientResult<Option<UserRecord>> {
        let email = email.trim();
        Ok(self.list_users().await?.into_iter().find(|u| u.email == email))
    }

    /// Full attendance ledger.
    pub async fn list_attendance(&self) -> ClientResult<Vec<AttendanceRecord>> {
        self.get_json("attendance").await
    }

    pub async fn stats(&self) -> ClientResult<Stats> {
        self.get_json("stats").await
    }

    /// Update a single field of a user.
    pub async fn update_user(&self, id: &UserId, field: &str, value: &str) -> ClientResult<()> {
        let url = self.config.endpoint(&format!("users/{}", id));
        let form = Form::new().text(field.to_string(), value.to_string());

        let response = self.authorize(self.http.put(&url)).multipart(form).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: &UserId) -> ClientResult<()> {
        let url = self.config.endpoint(&format!("users/{}", id));
        let response = self.authorize(self.http.delete(&url)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.config.endpoint(path);
        self.with_retry(|| async {
            let response = self.authorize(self.http.get(&url)).send().await?;
            read_json(response).await
        })
        .await
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ClientResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(250 * 2u64.pow(attempt));
                    warn!(
                        "Backend request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn frame_part(frame: &Frame) -> ClientResult<Part> {
    Part::bytes(frame.data().to_vec())
        .file_name(frame.file_name())
        .mime_str(frame.content_type())
        .map_err(ClientError::Network)
}

async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_status(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
