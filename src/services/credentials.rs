// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-wide credential store.

use crate::models::Credential;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared holder of the current session credential.
///
/// Cloning yields another handle to the same slot. Every write is a single
/// replacement of the whole `Option`, so readers see either the old pair or
/// the new pair, never a mix.
#[derive(Clone, Default)]
pub struct CredentialStore {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential (restored sessions, tests).
    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::new();
        store.set(credential);
        store
    }

    pub fn get(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, credential: Credential) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current access token only.
    pub fn access_token(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
