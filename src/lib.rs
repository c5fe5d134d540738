// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GymSmart console client core.
//!
//! This crate provides the pieces of the gym-management console that talk
//! to the outside world: an authenticated REST client that renews expired
//! sessions with a single shared refresh, and the live door-event feed.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use events::EventFeed;
use services::{ApiClient, CredentialStore, SessionService};

/// Shared client state: one credential store behind every component.
#[derive(Clone)]
pub struct ConsoleClient {
    pub config: Config,
    pub credentials: CredentialStore,
    pub api: ApiClient,
    pub session: SessionService,
}

impl ConsoleClient {
    pub fn new(config: Config) -> Self {
        let credentials = CredentialStore::new();
        let api = ApiClient::from_config(&config, credentials.clone());
        let session = SessionService::new(api.backend().clone(), api.coordinator().clone());
        Self {
            config,
            credentials,
            api,
            session,
        }
    }

    /// Live feed using this client's session credential.
    pub fn event_feed(&self) -> EventFeed {
        EventFeed::from_config(&self.config, self.credentials.clone())
    }
}
