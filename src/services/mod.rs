// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access and session management.

pub mod api;
pub mod backend;
pub mod credentials;
pub mod refresh;
pub mod session;

pub use api::ApiClient;
pub use backend::BackendClient;
pub use credentials::CredentialStore;
pub use refresh::RefreshCoordinator;
pub use session::SessionService;
