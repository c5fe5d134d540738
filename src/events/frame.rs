// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decoding of push-channel frames.
//!
//! A frame is one of:
//! - `{"info": "..."}` connection status from the relay
//! - `{"error": "...", "detail": "..."}` relay-side failure
//! - `{"chunk": "..."}` raw text from the door device: HTTP/multipart
//!   headers, a blank line, then the JSON alert
//! - an already-structured alert or push message
//!
//! Anything else is dropped. Dropping is not an error: the feed must survive
//! whatever the device sends.

use crate::models::event::{AlertEnvelope, DeviceAlert, PushMessage};
use crate::models::EventRecord;
use serde_json::Value;

/// A successfully decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Info(String),
    Error {
        error: String,
        detail: Option<String>,
    },
    Event(EventRecord),
}

/// Decode a raw frame, or `None` if it should be dropped.
pub fn decode_frame(raw: &str) -> Option<Frame> {
    match classify(raw) {
        Ok(frame) => Some(frame),
        Err(reason) => {
            tracing::debug!(reason, len = raw.len(), "Dropping frame");
            None
        }
    }
}

fn classify(raw: &str) -> Result<Frame, &'static str> {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(v) => v,
        // Not JSON at all: treat the whole frame as chunk text.
        Err(_) => return extract_chunk(raw).map(Frame::Event),
    };

    let Value::Object(map) = &value else {
        return Err("frame is not a JSON object");
    };

    if let Some(info) = map.get("info") {
        return Ok(Frame::Info(text_of(info)));
    }
    if let Some(error) = map.get("error") {
        return Ok(Frame::Error {
            error: text_of(error),
            detail: map.get("detail").filter(|d| !d.is_null()).map(text_of),
        });
    }
    if let Some(chunk) = map.get("chunk") {
        let chunk = chunk.as_str().ok_or("chunk is not a string")?;
        return extract_chunk(chunk).map(Frame::Event);
    }

    record_from_value(value).map(Frame::Event)
}

/// Extract the event carried by a raw device chunk.
pub fn extract_chunk(chunk: &str) -> Result<EventRecord, &'static str> {
    let value: Value =
        serde_json::from_str(chunk_payload(chunk)).map_err(|_| "chunk payload is not JSON")?;
    record_from_value(value)
}

/// Body of a raw chunk, with trailing newlines and any trailing multipart
/// boundary removed.
///
/// Header blocks (HTTP response headers, multipart part headers) are skipped
/// until the text after a blank line starts with `{`. Without such a block the
/// body is whatever follows the first blank line.
pub fn chunk_payload(chunk: &str) -> &str {
    let mut body = skip_header_block(chunk).unwrap_or(chunk);
    let mut rest = body;
    while !rest.trim_start().starts_with('{') {
        match skip_header_block(rest) {
            Some(next) => rest = next,
            None => break,
        }
    }
    if rest.trim_start().starts_with('{') {
        body = rest;
    }
    let body = body.trim();

    // "...}\r\n--MIME_boundary--"
    match body.rfind('}') {
        Some(end) if body.starts_with('{') => &body[..=end],
        _ => body,
    }
}

/// Text after the first blank-line separator (`\r\n\r\n` or `\n\n`).
fn skip_header_block(text: &str) -> Option<&str> {
    match (text.find("\r\n\r\n"), text.find("\n\n")) {
        (Some(crlf), Some(lf)) if lf < crlf => Some(&text[lf + 2..]),
        (Some(crlf), _) => Some(&text[crlf + 4..]),
        (None, Some(lf)) => Some(&text[lf + 2..]),
        (None, None) => None,
    }
}

fn record_from_value(value: Value) -> Result<EventRecord, &'static str> {
    let record = if value.get("EventNotificationAlert").is_some() {
        serde_json::from_value::<AlertEnvelope>(value)
            .map_err(|_| "malformed alert envelope")?
            .alert
            .into_record()
    } else if value.get("AccessControllerEvent").is_some() {
        serde_json::from_value::<DeviceAlert>(value)
            .map_err(|_| "malformed device alert")?
            .into_record()
    } else if value.get("event").is_some() {
        serde_json::from_value::<PushMessage>(value)
            .map_err(|_| "malformed push message")?
            .into_record()
    } else {
        return Err("no event payload");
    };

    record.ok_or("event without employee number")
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
