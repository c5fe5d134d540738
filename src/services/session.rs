// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration and logout.

use crate::error::{ApiError, Result};
use crate::models::{Credential, LoginRequest, RegisterRequest, UserSession};
use crate::services::{BackendClient, RefreshCoordinator};
use std::sync::{Arc, PoisonError, RwLock};

/// Session lifecycle over the shared credential store.
#[derive(Clone)]
pub struct SessionService {
    backend: BackendClient,
    refresh: RefreshCoordinator,
    user: Arc<RwLock<Option<UserSession>>>,
}

impl SessionService {
    pub fn new(backend: BackendClient, refresh: RefreshCoordinator) -> Self {
        Self {
            backend,
            refresh,
            user: Arc::new(RwLock::new(None)),
        }
    }

    /// Log in and start a session.
    ///
    /// Fails with [`ApiError::Decode`] if the backend does not issue a
    /// refresh credential alongside the access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession> {
        let response = self
            .backend
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let refresh_token = response
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response missing refreshToken".to_string()))?;

        let session = UserSession::from_login(&response);
        self.refresh
            .begin_session(Credential::new(response.token, refresh_token));
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());

        tracing::info!(
            role = ?session.role,
            user_id = session.user_id.as_deref().unwrap_or("-"),
            "Logged in"
        );
        Ok(session)
    }

    /// Create a member account. Does not log in.
    pub async fn register(&self, form: &RegisterRequest) -> Result<()> {
        self.backend.register(form).await?;
        tracing::info!("Registration accepted");
        Ok(())
    }

    pub fn logout(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.refresh.end_session();
    }

    pub fn current_user(&self) -> Option<UserSession> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
