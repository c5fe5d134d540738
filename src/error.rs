// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for calls to the gym backend.

/// Error surfaced by the authenticated request client and session calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Non-success status that the client does not recover from.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The refresh credential was absent or rejected; the session is over.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check whether the caller should send the user back to login.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::RefreshFailed(_))
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Result type alias for backend calls
pub type Result<T> = std::result::Result<T, ApiError>;
