// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live feed over a real SSE connection to the mock backend.

use gymsmart_client::events::{ConnectionState, EventFeed, FeedSnapshot};
use gymsmart_client::services::CredentialStore;
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;

mod common;
use common::MockBackend;

const PROMOTION_DELAY: Duration = Duration::from_millis(200);
const WAIT: Duration = Duration::from_secs(5);

fn alert_chunk(employee_no: &str) -> String {
    let alert = json!({
        "EventNotificationAlert": { "AccessControllerEvent": { "employeeNo": employee_no, "doorNo": 1 } }
    });
    json!({ "chunk": format!("HTTP/1.1 200 OK\r\n\r\n{}", alert) }).to_string()
}

async fn wait_for(
    rx: &mut watch::Receiver<FeedSnapshot>,
    pred: impl FnMut(&FeedSnapshot) -> bool,
) -> FeedSnapshot {
    tokio::time::timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("Timed out waiting for feed")
        .expect("Feed task went away")
        .clone()
}

#[tokio::test]
async fn test_feed_highlights_latest_and_promotes_it() {
    let frames = vec![
        json!({ "info": "Joined Gym_1" }).to_string(),
        alert_chunk("1"),
        json!({ "chunk": "not-json-after-sep\r\n\r\ngarbage" }).to_string(),
        json!({
            "event": { "employeeNo": "2", "doorNumber": 3, "maskStatus": "no" },
            "profile": { "firstName": "Rosa", "lastName": "Vega" }
        })
        .to_string(),
    ];
    let backend = MockBackend::start_with(Duration::ZERO, frames).await;

    let feed = EventFeed::new(backend.events_url(), PROMOTION_DELAY, CredentialStore::new()).spawn();
    let mut rx = feed.snapshots();

    let highlighted = wait_for(&mut rx, |s| {
        s.current.as_ref().is_some_and(|r| r.employee_no == "2")
    })
    .await;
    assert_eq!(highlighted.state, ConnectionState::Open);
    assert_eq!(highlighted.status_text, "Joined Gym_1");
    assert_eq!(
        highlighted.current.as_ref().map(|r| r.employee_label.as_str()),
        Some("Rosa Vega")
    );

    let promoted = wait_for(&mut rx, |s| !s.history.is_empty()).await;
    assert!(promoted.current.is_none());
    // Event 1 was superseded before its delay elapsed.
    let history: Vec<_> = promoted.history.iter().map(|r| r.employee_no.as_str()).collect();
    assert_eq!(history, vec!["2"]);

    let closed = feed.close().await;
    assert_eq!(closed.state, ConnectionState::Closed);
    assert_eq!(closed.history.len(), 1);
}

#[tokio::test]
async fn test_close_before_promotion_discards_pending() {
    let backend = MockBackend::start_with(Duration::ZERO, vec![alert_chunk("9")]).await;

    let feed = EventFeed::new(backend.events_url(), Duration::from_secs(60), CredentialStore::new()).spawn();
    let mut rx = feed.snapshots();
    wait_for(&mut rx, |s| s.current.is_some()).await;

    let closed = feed.close().await;
    assert_eq!(closed.state, ConnectionState::Closed);
    assert!(closed.history.is_empty());
}

#[tokio::test]
async fn test_unreachable_source_reports_error() {
    let feed = EventFeed::new(
        "http://127.0.0.1:9/api/hikvision/events",
        PROMOTION_DELAY,
        CredentialStore::new(),
    )
    .spawn();
    let mut rx = feed.snapshots();

    let snapshot = wait_for(&mut rx, |s| s.state == ConnectionState::Erroring).await;
    assert!(snapshot.current.is_none());

    let closed = feed.close().await;
    assert_eq!(closed.state, ConnectionState::Closed);
}

#[tokio::test]
async fn test_feed_subscribes_to_configured_gym() {
    let backend = MockBackend::start_with(Duration::ZERO, vec![alert_chunk("5")]).await;
    let config = gymsmart_client::config::Config {
        api_url: backend.base_url.clone(),
        events_url: backend.events_url(),
        gym_id: Some(1),
        ..Default::default()
    };

    let feed = EventFeed::from_config(&config, CredentialStore::new()).spawn();
    let mut rx = feed.snapshots();
    wait_for(&mut rx, |s| s.current.is_some()).await;

    let query = backend.state.event_query.lock().unwrap().clone();
    assert_eq!(
        query.and_then(|q| q.get("gymId").cloned()).as_deref(),
        Some("1")
    );
    feed.close().await;
}
