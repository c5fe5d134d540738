// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live event feed: owns the push connection and drives the normalizer.

use crate::config::Config;
use crate::events::normalizer::{EventNormalizer, FeedSnapshot, FrameOutcome};
use crate::events::sse::SseDecoder;
use crate::services::CredentialStore;
use futures_util::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Connection settings for the live feed.
#[derive(Clone)]
pub struct EventFeed {
    http: reqwest::Client,
    url: String,
    credentials: CredentialStore,
    promotion_delay: Duration,
    gym_id: Option<u32>,
}

/// Handle to a running feed task.
pub struct FeedHandle {
    snapshots: watch::Receiver<FeedSnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl EventFeed {
    pub fn new(url: impl Into<String>, promotion_delay: Duration, credentials: CredentialStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            credentials,
            promotion_delay,
            gym_id: None,
        }
    }

    pub fn from_config(config: &Config, credentials: CredentialStore) -> Self {
        let feed = Self::new(config.events_url.clone(), config.promotion_delay, credentials);
        match config.gym_id {
            Some(gym_id) => feed.for_gym(gym_id),
            None => feed,
        }
    }

    /// Only receive events of one gym (`?gymId=` on the stream request).
    pub fn for_gym(mut self, gym_id: u32) -> Self {
        self.gym_id = Some(gym_id);
        self
    }

    /// Start the feed on the current tokio runtime.
    pub fn spawn(self) -> FeedHandle {
        let cancel = CancellationToken::new();
        let normalizer = EventNormalizer::new(self.promotion_delay);
        let (tx, rx) = watch::channel(normalizer.snapshot());

        let task = tokio::spawn(self.run(normalizer, tx, cancel.clone()));

        FeedHandle {
            snapshots: rx,
            cancel,
            task,
        }
    }

    async fn connect(&self) -> Result<reqwest::Response, String> {
        let mut request = self.http.get(&self.url).header(ACCEPT, "text/event-stream");
        if let Some(gym_id) = self.gym_id {
            request = request.query(&[("gymId", gym_id)]);
        }
        if let Some(token) = self.credentials.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("event stream rejected: HTTP {}", response.status()));
        }
        Ok(response)
    }

    async fn run(
        self,
        mut normalizer: EventNormalizer,
        tx: watch::Sender<FeedSnapshot>,
        cancel: CancellationToken,
    ) {
        let publish = |n: &EventNormalizer| {
            tx.send_replace(n.snapshot());
        };

        let connected = tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.connect() => Some(result),
        };

        let mut stream = match connected {
            None => {
                normalizer.close();
                publish(&normalizer);
                return;
            }
            Some(Ok(response)) => {
                tracing::info!(url = %self.url, gym_id = ?self.gym_id, "Event stream connected");
                normalizer.on_open();
                Some(Box::pin(response.bytes_stream()))
            }
            Some(Err(e)) => {
                tracing::warn!(url = %self.url, error = %e, "Event stream connection failed");
                normalizer.on_transport_error(&e);
                None
            }
        };
        publish(&normalizer);

        let mut decoder = SseDecoder::new();

        loop {
            let deadline = normalizer.promotion_deadline();

            tokio::select! {
                _ = cancel.cancelled() => break,

                _ = sleep_until(deadline) => {
                    if normalizer.on_timer(now()) {
                        publish(&normalizer);
                    }
                }

                chunk = next_chunk(&mut stream) => match chunk {
                    Some(Ok(bytes)) => {
                        let mut changed = false;
                        for frame in decoder.feed(&bytes) {
                            match normalizer.on_frame(&frame, now()) {
                                FrameOutcome::Dropped | FrameOutcome::Ignored => {}
                                FrameOutcome::Status | FrameOutcome::Highlighted => changed = true,
                            }
                        }
                        if changed {
                            publish(&normalizer);
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Event stream failed");
                        normalizer.on_transport_error(&e.to_string());
                        stream = None;
                        publish(&normalizer);
                    }
                    None => {
                        tracing::info!("Event stream ended");
                        normalizer.on_transport_error("event stream ended");
                        stream = None;
                        publish(&normalizer);
                    }
                },
            }
        }

        normalizer.close();
        publish(&normalizer);
        tracing::info!("Event feed closed");
    }
}

impl FeedHandle {
    /// Subscribe to snapshot updates.
    pub fn snapshots(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Tear the feed down and wait for the task to finish.
    ///
    /// Returns the final (closed) snapshot.
    pub async fn close(self) -> FeedSnapshot {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Event feed task failed");
        }
        let snapshot = self.snapshots.borrow().clone();
        snapshot
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(tokio::time::Instant::from_std(d)).await,
        None => std::future::pending().await,
    }
}

async fn next_chunk<S, T>(stream: &mut Option<S>) -> Option<T>
where
    S: Stream<Item = T> + Unpin,
{
    match stream {
        Some(s) => s.next().await,
        None => std::future::pending().await,
    }
}
