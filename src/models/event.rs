// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access-control event records and the shapes they arrive in.
//!
//! Two upstream shapes carry the same information:
//! - device alerts (`EventNotificationAlert.AccessControllerEvent`), either
//!   bare or embedded in a raw HTTP chunk
//! - push messages relayed by the backend (`{event, mapping, profile}`)
//!
//! Both normalize to [`EventRecord`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::string_or_number;
use crate::time_utils;

/// A normalized access event, as shown in the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventRecord {
    /// When the device saw the event (device-local offset preserved)
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Employee number on the device; the correlating identifier
    pub employee_no: String,
    /// Full name when known, otherwise the employee number
    pub employee_label: String,
    pub door_id: String,
    /// "yes", "no" or "unknown" as reported upstream
    pub mask_status: String,
    /// Snapshot photo URL, if the device or backend provided one
    pub photo_ref: Option<String>,
}

impl EventRecord {
    /// Date and time columns for display.
    pub fn display_date_time(&self) -> (String, String) {
        time_utils::display_date_time(self.timestamp.as_ref())
    }
}

/// `{"EventNotificationAlert": {...}}` wrapper around a device alert.
#[derive(Debug, Deserialize)]
pub struct AlertEnvelope {
    #[serde(rename = "EventNotificationAlert")]
    pub alert: DeviceAlert,
}

/// Access-controller alert as posted by the door device.
#[derive(Debug, Deserialize)]
pub struct DeviceAlert {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    #[serde(rename = "AccessControllerEvent")]
    pub access: AccessControllerEvent,
}

#[derive(Debug, Deserialize)]
pub struct AccessControllerEvent {
    #[serde(rename = "employeeNoString")]
    pub employee_no_string: Option<String>,
    #[serde(rename = "employeeNo", default, deserialize_with = "string_or_number")]
    pub employee_no: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "doorNo", default, deserialize_with = "string_or_number")]
    pub door_no: Option<String>,
    pub mask: Option<String>,
    #[serde(rename = "pictureURL")]
    pub picture_url: Option<String>,
}

impl DeviceAlert {
    /// Normalize; `None` when the alert carries no employee number.
    pub fn into_record(self) -> Option<EventRecord> {
        let access = self.access;
        let employee_no = non_empty(access.employee_no_string).or(non_empty(access.employee_no))?;
        Some(EventRecord {
            timestamp: parse_timestamp(self.date_time.as_deref()),
            employee_label: non_empty(access.name).unwrap_or_else(|| employee_no.clone()),
            employee_no,
            door_id: non_empty(access.door_no).unwrap_or_else(|| "?".to_string()),
            mask_status: non_empty(access.mask).unwrap_or_else(|| "unknown".to_string()),
            photo_ref: non_empty(access.picture_url),
        })
    }
}

/// Event relayed by the backend hub with the member's profile attached.
#[derive(Debug, Deserialize)]
pub struct PushMessage {
    pub event: PushEvent,
    #[serde(default)]
    pub mapping: Option<PushMapping>,
    #[serde(default)]
    pub profile: Option<PushProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub employee_no: Option<String>,
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub door_number: Option<String>,
    pub mask_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMapping {
    #[serde(default, deserialize_with = "string_or_number")]
    pub employee_no: Option<String>,
    pub hikvision_photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl PushMessage {
    /// Normalize; `None` when neither the event nor the mapping names an
    /// employee.
    pub fn into_record(self) -> Option<EventRecord> {
        let (mapped_no, photo_ref) = match self.mapping {
            Some(m) => (non_empty(m.employee_no), non_empty(m.hikvision_photo_url)),
            None => (None, None),
        };
        let employee_no = non_empty(self.event.employee_no).or(mapped_no)?;

        let full_name = self.profile.and_then(|p| {
            let parts: Vec<String> = [p.first_name, p.last_name]
                .into_iter()
                .filter_map(non_empty)
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        });

        Some(EventRecord {
            timestamp: parse_timestamp(self.event.event_date.as_deref()),
            employee_label: full_name.unwrap_or_else(|| employee_no.clone()),
            employee_no,
            door_id: non_empty(self.event.door_number).unwrap_or_else(|| "?".to_string()),
            mask_status: non_empty(self.event.mask_status)
                .unwrap_or_else(|| "unknown".to_string()),
            photo_ref,
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
}
