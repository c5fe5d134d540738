// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-flight session refresh.
//!
//! However many requests hit a 401 at once, only one of them (the leader)
//! calls `Auth/refresh`. Everyone else queues behind it and is completed with
//! the leader's outcome, in arrival order, once it settles.

use crate::error::{ApiError, Result};
use crate::models::Credential;
use crate::services::{BackendClient, CredentialStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Waiter = oneshot::Sender<Result<Credential>>;

/// `None` while idle; `Some(queue)` while a refresh is in flight.
type RefreshState = Option<Vec<Waiter>>;

/// Coordinates credential renewal and owns writes to the [`CredentialStore`].
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    backend: BackendClient,
    store: CredentialStore,
    state: Mutex<RefreshState>,
}

/// How a caller takes part in a refresh.
enum Entry {
    /// A refresh is already running; wait for its outcome.
    Wait(oneshot::Receiver<Result<Credential>>),
    /// We are the leader and must call the backend.
    Lead,
    /// A refresh settled after the caller's request was sent.
    Settled(Credential),
}

impl RefreshCoordinator {
    pub fn new(backend: BackendClient, store: CredentialStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                store,
                state: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.inner.store
    }

    /// Check whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock_state().is_some()
    }

    /// Install the credential obtained at login.
    pub fn begin_session(&self, credential: Credential) {
        self.inner.store.set(credential);
        tracing::info!("Session started");
    }

    /// Drop the session credential (logout).
    pub fn end_session(&self) {
        self.inner.store.clear();
        tracing::info!("Session ended");
    }

    /// Renew the session credential, joining an in-flight refresh if any.
    pub async fn refresh(&self) -> Result<Credential> {
        let entry = self.enter(None);
        self.complete(entry).await
    }

    /// Renew after a request carrying `rejected` came back 401.
    ///
    /// If no refresh is running and the store already holds a different
    /// access token, a refresh settled while that request was in flight; the
    /// stored credential is returned without another backend call.
    pub async fn refresh_after(&self, rejected: Option<&str>) -> Result<Credential> {
        let entry = self.enter(Some(rejected));
        self.complete(entry).await
    }

    fn enter(&self, rejected: Option<Option<&str>>) -> Entry {
        let mut state = self.lock_state();

        if let Some(waiters) = state.as_mut() {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            tracing::debug!(queued = waiters.len(), "Refresh in flight, queueing");
            return Entry::Wait(rx);
        }

        if let Some(rejected) = rejected {
            if let Some(current) = self.inner.store.get() {
                if rejected != Some(current.access_token.as_str()) {
                    tracing::debug!("Credential already renewed, skipping refresh");
                    return Entry::Settled(current);
                }
            }
        }

        *state = Some(Vec::new());
        Entry::Lead
    }

    async fn complete(&self, entry: Entry) -> Result<Credential> {
        match entry {
            Entry::Settled(credential) => Ok(credential),
            Entry::Wait(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::RefreshFailed("refresh abandoned".to_string()))),
            Entry::Lead => {
                let mut flight = InFlight {
                    coordinator: self,
                    settled: false,
                };
                let outcome = self.call_backend().await;
                flight.settle(outcome.clone());
                outcome
            }
        }
    }

    /// The one backend call of a refresh storm.
    async fn call_backend(&self) -> Result<Credential> {
        let store = &self.inner.store;

        let Some(current) = store.get() else {
            store.clear();
            tracing::warn!("Refresh requested without a refresh credential");
            return Err(ApiError::RefreshFailed("no refresh credential".to_string()));
        };

        tracing::info!("Access token expired, refreshing");
        match self
            .inner
            .backend
            .refresh(Some(&current.access_token), &current.refresh_token)
            .await
        {
            Ok(renewed) => {
                store.set(renewed.clone());
                tracing::info!("Session refreshed");
                Ok(renewed)
            }
            Err(e) => {
                store.clear();
                tracing::warn!(error = %e, "Refresh failed, session cleared");
                Err(ApiError::RefreshFailed(e.to_string()))
            }
        }
    }

    /// Take the whole waiter queue and return to idle in one step, then
    /// complete each waiter in arrival order.
    fn settle(&self, outcome: &Result<Credential>) {
        let waiters = std::mem::take(&mut *self.lock_state()).unwrap_or_default();

        tracing::debug!(
            waiters = waiters.len(),
            success = outcome.is_ok(),
            "Refresh settled"
        );
        for waiter in waiters {
            // Receiver gone means that caller was dropped; nothing to do.
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leader's obligation to settle; fails the queue if the leader is dropped
/// mid-refresh.
///
/// The store is written in the same synchronous step that receives the
/// refresh response. A leader dropped while that response is still in
/// flight leaves the old pair in place even if the backend already rotated
/// it; the next 401 then fails to refresh and ends the session.
struct InFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, outcome: Result<Credential>) {
        self.settled = true;
        self.coordinator.settle(&outcome);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Refresh leader dropped before settling");
            self.coordinator.settle(&Err(ApiError::RefreshFailed(
                "refresh abandoned".to_string(),
            )));
        }
    }
}
