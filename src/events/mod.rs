// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live door-event feed.

pub mod feed;
pub mod frame;
pub mod normalizer;
pub mod sse;
pub mod window;

pub use feed::{EventFeed, FeedHandle};
pub use frame::{decode_frame, Frame};
pub use normalizer::{ConnectionState, EventNormalizer, FeedSnapshot, FrameOutcome};
pub use sse::SseDecoder;
pub use window::{EventWindow, HISTORY_LIMIT};
