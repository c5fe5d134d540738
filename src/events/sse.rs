// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Incremental Server-Sent-Events decoder.

/// Largest partial event held back before it is discarded.
pub const MAX_BUFFERED: usize = 1024 * 1024;

/// Splits a `text/event-stream` byte stream into event data payloads.
///
/// Bytes are buffered until a blank line ends the event, so events (and
/// UTF-8 sequences) may be split arbitrarily across network chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no separator
    scanned: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the data of every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        // A separator may straddle the old end of the buffer.
        let mut from = self.scanned.saturating_sub(3);
        while let Some((end, separator)) = find_event_end(&self.buffer, from) {
            let event: Vec<u8> = self.buffer.drain(..end + separator).collect();
            if let Some(data) = event_data(&String::from_utf8_lossy(&event[..end])) {
                frames.push(data);
            }
            from = 0;
        }
        self.scanned = self.buffer.len();

        if self.buffer.len() > MAX_BUFFERED {
            tracing::debug!(
                bytes = self.buffer.len(),
                "Discarding oversized partial event"
            );
            self.buffer.clear();
            self.scanned = 0;
        }
        frames
    }

    /// Bytes held back waiting for the end of an event.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Position and length of the first blank-line separator at or after `from`.
fn find_event_end(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..buf.len()).find_map(|i| {
        let rest = &buf[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else {
            None
        }
    })
}

/// Joined `data:` lines of one event; comments and other fields are skipped.
fn event_data(event: &str) -> Option<String> {
    let lines: Vec<&str> = event
        .lines()
        .filter(|line| !line.starts_with(':'))
        .filter_map(|line| {
            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            (field == "data").then(|| value.strip_prefix(' ').unwrap_or(value))
        })
        .collect();

    let data = lines.join("\n");
    (!data.is_empty()).then_some(data)
}
