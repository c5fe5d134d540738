// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session credential and the refresh endpoint's wire types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access + refresh token pair.
///
/// Both halves are always present together; "no session" is modelled as
/// `Option<Credential>` rather than empty strings.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Short-lived bearer token attached to API calls
    pub access_token: String,
    /// Longer-lived token exchanged at `Auth/refresh`
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /Auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response of `POST /Auth/refresh`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

impl From<RefreshResponse> for Credential {
    fn from(r: RefreshResponse) -> Self {
        Credential::new(r.token, r.refresh_token)
    }
}
