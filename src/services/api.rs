// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request client.
//!
//! Every data call of the console goes through [`ApiClient::request`]. A 401
//! on the first attempt means the access token expired: the client renews it
//! through the [`RefreshCoordinator`] and replays the original request once.
//! The replay's outcome is final, so a backend that keeps answering 401
//! cannot cause a refresh loop.

use crate::config::Config;
use crate::error::Result;
use crate::services::backend::read_json;
use crate::services::{BackendClient, CredentialStore, RefreshCoordinator};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Client for the gym REST backend with transparent session renewal.
#[derive(Clone)]
pub struct ApiClient {
    backend: BackendClient,
    credentials: CredentialStore,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(
        backend: BackendClient,
        credentials: CredentialStore,
        refresh: RefreshCoordinator,
    ) -> Self {
        Self {
            backend,
            credentials,
            refresh,
        }
    }

    /// Wire up backend client, coordinator and request client over a shared
    /// credential store.
    pub fn from_config(config: &Config, credentials: CredentialStore) -> Self {
        let backend = BackendClient::new(config.api_url.clone());
        let refresh = RefreshCoordinator::new(backend.clone(), credentials.clone());
        Self::new(backend, credentials, refresh)
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Issue `method endpoint` with an optional JSON body and return the
    /// decoded JSON response.
    pub async fn request<B>(&self, endpoint: &str, method: Method, body: Option<&B>) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.request_as(endpoint, method, body).await
    }

    /// Like [`request`](Self::request), decoding into `T`.
    pub async fn request_as<T, B>(&self, endpoint: &str, method: Method, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let sent_with = self.credentials.access_token();
        let response = self
            .backend
            .send(method.clone(), endpoint, sent_with.as_deref(), body)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_json(response).await;
        }

        tracing::debug!(%method, endpoint, "Got 401, renewing session");
        let renewed = self.refresh.refresh_after(sent_with.as_deref()).await?;

        let replay = self
            .backend
            .send(method.clone(), endpoint, Some(&renewed.access_token), body)
            .await?;

        if replay.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, endpoint, "Still unauthorized after refresh");
        }
        read_json(replay).await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request_as::<T, Value>(endpoint, Method::GET, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_as(endpoint, Method::POST, Some(body)).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_as(endpoint, Method::PUT, Some(body)).await
    }

    /// `DELETE endpoint`, ignoring any response body.
    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        self.request_as::<Value, Value>(endpoint, Method::DELETE, None)
            .await
            .map(|_| ())
    }
}
