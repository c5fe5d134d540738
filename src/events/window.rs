// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Highlighted-event slot plus bounded history.

use crate::models::EventRecord;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum number of events kept in history.
pub const HISTORY_LIMIT: usize = 30;

/// The feed's display window.
///
/// A new event becomes `current` and is scheduled for promotion after
/// `delay`. If another event arrives first, the pending promotion is replaced
/// and the superseded event is discarded. History is newest-first.
#[derive(Debug, Clone)]
pub struct EventWindow {
    current: Option<EventRecord>,
    history: VecDeque<EventRecord>,
    /// Deadline for promoting `current`; only set while `current` is.
    pending: Option<Instant>,
    delay: Duration,
}

impl EventWindow {
    pub fn new(delay: Duration) -> Self {
        Self {
            current: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            pending: None,
            delay,
        }
    }

    /// Make `record` the current event; returns its promotion deadline.
    pub fn highlight(&mut self, record: EventRecord, now: Instant) -> Instant {
        if let Some(superseded) = self.current.as_ref().filter(|_| self.pending.is_some()) {
            tracing::trace!(employee_no = %superseded.employee_no, "Superseded before promotion");
        }
        let deadline = now + self.delay;
        self.current = Some(record);
        self.pending = Some(deadline);
        deadline
    }

    /// Promote the current event if its deadline has passed.
    pub fn promote_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if now >= deadline => {
                self.pending = None;
                if let Some(record) = self.current.take() {
                    self.push_history(record);
                }
                true
            }
            _ => false,
        }
    }

    /// Drop the pending promotion without touching `current` or history.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn promotion_deadline(&self) -> Option<Instant> {
        self.pending
    }

    pub fn current(&self) -> Option<&EventRecord> {
        self.current.as_ref()
    }

    /// History, newest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &EventRecord> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn push_history(&mut self, record: EventRecord) {
        self.history.push_front(record);
        self.history.truncate(HISTORY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> EventRecord {
        EventRecord {
            timestamp: None,
            employee_no: n.to_string(),
            employee_label: format!("employee {}", n),
            door_id: "1".to_string(),
            mask_status: "unknown".to_string(),
            photo_ref: None,
        }
    }

    const DELAY: Duration = Duration::from_millis(1000);

    #[test]
    fn test_promotion_after_delay() {
        let t0 = Instant::now();
        let mut window = EventWindow::new(DELAY);

        let deadline = window.highlight(record(1), t0);
        assert_eq!(deadline, t0 + DELAY);

        assert!(!window.promote_due(t0 + Duration::from_millis(999)));
        assert_eq!(window.current().map(|r| r.employee_no.as_str()), Some("1"));

        assert!(window.promote_due(deadline));
        assert!(window.current().is_none());
        assert_eq!(window.history_len(), 1);
        assert_eq!(window.promotion_deadline(), None);
    }

    #[test]
    fn test_superseded_event_never_reaches_history() {
        let t0 = Instant::now();
        let mut window = EventWindow::new(DELAY);

        window.highlight(record(1), t0);
        let deadline = window.highlight(record(2), t0 + Duration::from_millis(500));

        // The first event's deadline passes with nothing due.
        assert!(!window.promote_due(t0 + DELAY));
        assert!(window.promote_due(deadline));

        let history: Vec<_> = window.history().map(|r| r.employee_no.clone()).collect();
        assert_eq!(history, vec!["2"]);
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut now = Instant::now();
        let mut window = EventWindow::new(DELAY);

        for n in 1..=HISTORY_LIMIT + 1 {
            window.highlight(record(n), now);
            now += DELAY;
            assert!(window.promote_due(now));
        }

        assert_eq!(window.history_len(), HISTORY_LIMIT);
        let history: Vec<_> = window.history().map(|r| r.employee_no.clone()).collect();
        // Newest first; event 1 was evicted.
        assert_eq!(history.first().map(String::as_str), Some("31"));
        assert_eq!(history.last().map(String::as_str), Some("2"));
    }

    #[test]
    fn test_cancel_keeps_current() {
        let t0 = Instant::now();
        let mut window = EventWindow::new(DELAY);

        window.highlight(record(1), t0);
        window.cancel_pending();

        assert!(!window.promote_due(t0 + DELAY * 10));
        assert!(window.current().is_some());
        assert_eq!(window.history_len(), 0);
    }
}
