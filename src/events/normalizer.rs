// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event stream state machine.
//!
//! Pure state: time is passed in, and the promotion timer is just a deadline
//! the driver sleeps until. Replacing or clearing the deadline cancels it.

use crate::events::frame::{decode_frame, Frame};
use crate::events::window::EventWindow;
use crate::models::EventRecord;
use serde::Serialize;
use std::time::{Duration, Instant};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Connection lifecycle of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ConnectionState {
    Connecting,
    Open,
    Erroring,
    Closed,
}

/// What a frame did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Status text/state changed; no event.
    Status,
    /// A new current event was set.
    Highlighted,
    /// Malformed or irrelevant; nothing changed.
    Dropped,
    /// The feed is closed.
    Ignored,
}

/// Observable view of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedSnapshot {
    pub state: ConnectionState,
    pub status_text: String,
    pub current: Option<EventRecord>,
    /// Newest first, at most 30 entries
    pub history: Vec<EventRecord>,
}

/// Normalizes raw frames into the display window.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    state: ConnectionState,
    status_text: String,
    window: EventWindow,
}

impl EventNormalizer {
    pub fn new(promotion_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Connecting,
            status_text: "Connecting to event stream".to_string(),
            window: EventWindow::new(promotion_delay),
        }
    }

    pub fn on_open(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Open;
        self.status_text = "Connected".to_string();
    }

    /// Apply one raw frame received at `now`.
    pub fn on_frame(&mut self, raw: &str, now: Instant) -> FrameOutcome {
        if self.state == ConnectionState::Closed {
            return FrameOutcome::Ignored;
        }

        match decode_frame(raw) {
            Some(Frame::Info(info)) => {
                self.state = ConnectionState::Open;
                self.status_text = info;
                FrameOutcome::Status
            }
            Some(Frame::Error { error, detail }) => {
                tracing::warn!(error = %error, detail = ?detail, "Event source reported an error");
                self.state = ConnectionState::Erroring;
                self.status_text = match detail {
                    Some(detail) => format!("{error}: {detail}"),
                    None => error,
                };
                FrameOutcome::Status
            }
            Some(Frame::Event(record)) => {
                tracing::debug!(
                    employee_no = %record.employee_no,
                    door = %record.door_id,
                    "Access event"
                );
                self.window.highlight(record, now);
                FrameOutcome::Highlighted
            }
            None => FrameOutcome::Dropped,
        }
    }

    /// Fire the promotion timer if it is due; returns whether anything moved.
    pub fn on_timer(&mut self, now: Instant) -> bool {
        if self.state == ConnectionState::Closed {
            return false;
        }
        self.window.promote_due(now)
    }

    /// The channel failed or ended underneath us.
    pub fn on_transport_error(&mut self, message: &str) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Erroring;
        self.status_text = message.to_string();
    }

    /// Tear down: cancel the pending promotion and stop accepting input.
    pub fn close(&mut self) {
        self.window.cancel_pending();
        self.state = ConnectionState::Closed;
        self.status_text = "Disconnected".to_string();
    }

    /// When the driver should next call [`on_timer`](Self::on_timer).
    pub fn promotion_deadline(&self) -> Option<Instant> {
        match self.state {
            ConnectionState::Closed => None,
            _ => self.window.promotion_deadline(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn window(&self) -> &EventWindow {
        &self.window
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            state: self.state,
            status_text: self.status_text.clone(),
            current: self.window.current().cloned(),
            history: self.window.history().cloned().collect(),
        }
    }
}
