// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Low-level client for the gym REST backend.
//!
//! Handles:
//! - Sending a request with an optional bearer credential
//! - Login and registration
//! - Exchanging a refresh credential for a new pair
//!
//! No retry or refresh policy lives here; see [`crate::services::ApiClient`].

use crate::error::{ApiError, Result};
use crate::models::credential::{RefreshRequest, RefreshResponse};
use crate::models::session::LoginResponse;
use crate::models::{Credential, LoginRequest, RegisterRequest};
use reqwest::{multipart, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Gym backend HTTP client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the API rooted at `base_url` (e.g. `https://host/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for an endpoint such as `Gimnacios` or `/Auth/login`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Send one request and hand back the raw response, whatever its status.
    pub async fn send<B>(
        &self,
        method: Method,
        endpoint: &str,
        bearer: Option<&str>,
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method.clone(), self.url(endpoint));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, endpoint, authenticated = bearer.is_some(), "Sending request");
        request.send().await.map_err(ApiError::transport)
    }

    /// `POST /Auth/login`.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let response = self
            .send(Method::POST, "Auth/login", None, Some(credentials))
            .await?;
        read_json(response).await
    }

    /// `POST /Auth/register` as a multipart form.
    pub async fn register(&self, form: &RegisterRequest) -> Result<()> {
        let mut multipart = multipart::Form::new();
        for (name, value) in form.text_fields() {
            multipart = multipart.text(name, value.to_string());
        }
        if let Some((file_name, bytes)) = &form.profile_image {
            multipart = multipart.part(
                "ProfileImage",
                multipart::Part::bytes(bytes.clone()).file_name(file_name.clone()),
            );
        }

        let response = self
            .http
            .post(self.url("Auth/register"))
            .multipart(multipart)
            .send()
            .await
            .map_err(ApiError::transport)?;

        read_json::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// `POST /Auth/refresh`: exchange the refresh credential for a new pair.
    ///
    /// The expiring access token is sent along as bearer; the backend uses
    /// it to identify the session being renewed.
    pub async fn refresh(&self, access_token: Option<&str>, refresh_token: &str) -> Result<Credential> {
        let response = self
            .send(
                Method::POST,
                "Auth/refresh",
                access_token,
                Some(&RefreshRequest { refresh_token }),
            )
            .await?;

        let body: RefreshResponse = read_json(response).await?;
        Ok(body.into())
    }
}

/// Check response status and parse the JSON body.
///
/// Empty success bodies (e.g. `204 No Content`) decode as JSON `null`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(ApiError::transport)?;

    if !status.is_success() {
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "Backend request failed");
        }
        return Err(ApiError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let text = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
