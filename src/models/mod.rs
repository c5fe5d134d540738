// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credential;
pub mod event;
pub mod session;

pub use credential::Credential;
pub use event::EventRecord;
pub use session::{LoginRequest, RegisterRequest, Role, UserSession};

use serde::Deserialize;

/// Accept a JSON number or string where the backend is inconsistent
/// (`"userId": 7` vs `"userId": "7"`).
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
