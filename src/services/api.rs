// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ExecutiveAI backend API client.
//!
//! Handles:
//! - Password login (`POST /auth/login`)
//! - Credential flag reads (`GET /credentials`), retried with backoff
//! - Integration configuration (`PUT /credentials/{type}`)
//! - Error message extraction from JSON error bodies

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{CredentialFlags, IntegrationCredentials, Session, Tenant, User};

/// Upper bound for a single retry delay.
const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Backend API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    max_read_retries: u32,
    retry_base_delay_ms: u64,
}

impl ApiClient {
    /// Create a client for the configured backend.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            max_read_retries: config.max_read_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in with email and password.
    ///
    /// Never retried.
    pub async fn login(
        &self,
        bearer: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AppError> {
        let body = LoginRequest { email, password };

        let response = self
            .request(reqwest::Method::POST, "/auth/login", bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        check_response_json(response).await
    }

    /// Fetch the tenant's credential flags.
    pub async fn get_credential_flags(
        &self,
        bearer: Option<&str>,
    ) -> Result<CredentialFlags, AppError> {
        self.get_json_with_retry("/credentials", bearer).await
    }

    /// Replace the configuration of one integration.
    pub async fn update_credentials(
        &self,
        bearer: Option<&str>,
        credentials: &IntegrationCredentials,
    ) -> Result<(), AppError> {
        let path = format!("/credentials/{}", credentials.integration().slug());

        let response = self
            .request(reqwest::Method::PUT, &path, bearer)
            .json(credentials)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }

    /// Build a request with the JSON content type and optional bearer token.
    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET with JSON response, retrying failures that are not auth errors.
    async fn get_json_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, AppError> {
        let mut attempt = 0;
        loop {
            match self.get_json(path, bearer).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_auth_error() || attempt >= self.max_read_retries => return Err(e),
                Err(e) => {
                    let delay = self.retry_delay(attempt);
                    tracing::warn!(
                        path,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Backend read failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, AppError> {
        let response = self
            .request(reqwest::Method::GET, path, bearer)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        check_response_json(response).await
    }

    /// Exponential backoff: base * 2^attempt, capped.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(
            self.retry_base_delay_ms
                .saturating_mul(factor)
                .min(MAX_RETRY_DELAY_MS),
        )
    }
}

/// Check response status and return an error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status.as_u16() == 401 {
        tracing::warn!("Backend rejected bearer token (401)");
    }

    Err(AppError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    check_response(response)
        .await?
        .json()
        .await
        .map_err(|e| AppError::Transport(format!("JSON parse error: {}", e)))
}

/// Best-effort message from an error body: its `error` field if present.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json
            .get("error")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(AppError::REQUEST_FAILED)
            .to_string(),
        Err(_) => AppError::UNKNOWN_ERROR.to_string(),
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub user: Option<User>,
    pub client: Option<Tenant>,
    pub credentials: Option<CredentialFlags>,
    pub error: Option<String>,
}

impl LoginResponse {
    /// The session granted by this response, if it is a complete success.
    pub fn into_session(self) -> Option<Session> {
        if !self.success {
            return None;
        }
        match (self.token, self.user, self.client) {
            (Some(token), Some(user), Some(tenant)) if !token.is_empty() => Some(Session {
                user,
                tenant,
                credentials: self.credentials.unwrap_or_default(),
                token,
            }),
            _ => None,
        }
    }
}
