// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login/registration payloads and the signed-in user's session profile.

use serde::{Deserialize, Serialize};

use crate::models::string_or_number;

/// Console role returned by `Auth/login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Role {
    SuperAdmin,
    Administrador,
    Entrenador,
    Vigilante,
    /// Members, and anything the backend sends that we don't recognize
    #[default]
    #[serde(other)]
    Cliente,
}

/// Body of `POST /Auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /Auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Required for the session to survive access token expiry
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
}

/// Profile block embedded in the login response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// The signed-in user, as known to the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    pub user_id: Option<String>,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture_url: Option<String>,
}

impl UserSession {
    /// Build the session view from a login response, filling in the
    /// placeholders the console shows for missing profile fields.
    pub fn from_login(response: &LoginResponse) -> Self {
        let profile = response.user_profile.clone().unwrap_or_default();
        Self {
            user_id: response.user_id.clone(),
            role: response.role.unwrap_or_default(),
            first_name: profile
                .first_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Usuario".to_string()),
            last_name: profile
                .last_name
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Desconocido".to_string()),
            profile_picture_url: profile.profile_picture_url.filter(|s| !s.is_empty()),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration form for `POST /Auth/register` (sent as multipart).
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub postal_code: String,
    pub weight: String,
    pub height: String,
    pub objective: String,
    /// Optional profile picture: (file name, bytes)
    pub profile_image: Option<(String, Vec<u8>)>,
}

impl RegisterRequest {
    /// Text fields under the names the backend binds them to.
    pub fn text_fields(&self) -> [(&'static str, &str); 10] {
        [
            ("Email", self.email.as_str()),
            ("Password", self.password.as_str()),
            ("FirstName", self.first_name.as_str()),
            ("LastName", self.last_name.as_str()),
            ("PhoneNumber", self.phone_number.as_str()),
            ("Address", self.address.as_str()),
            ("PostalCode", self.postal_code.as_str()),
            ("Weight", self.weight.as_str()),
            ("Height", self.height.as_str()),
            ("Objective", self.objective.as_str()),
        ]
    }
}
