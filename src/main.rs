// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GymSmart console feed
//!
//! Logs in to the gym backend (when credentials are configured) and tails
//! the live door-event feed, logging each highlighted and promoted event.

use anyhow::Context;
use gymsmart_client::{config::Config, events::FeedSnapshot, ConsoleClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        api = %config.api_url,
        events = %config.events_url,
        promotion_delay_ms = config.promotion_delay.as_millis() as u64,
        gym_id = ?config.gym_id,
        "Starting GymSmart console feed"
    );

    let client = ConsoleClient::new(config);

    if let Some((email, password)) = client.config.login() {
        let user = client
            .session
            .login(email, password)
            .await
            .context("Login failed")?;
        tracing::info!(name = %user.display_name(), role = ?user.role, "Signed in");
    } else {
        tracing::info!("No GYM_EMAIL/GYM_PASSWORD configured, connecting anonymously");
    }

    let feed = client.event_feed().spawn();
    let mut snapshots = feed.snapshots();
    let mut last = snapshots.borrow().clone();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                log_changes(&last, &snapshot);
                last = snapshot;
            }
        }
    }

    let closed = feed.close().await;
    tracing::info!(history = closed.history.len(), "Feed closed");
    Ok(())
}

fn log_changes(before: &FeedSnapshot, after: &FeedSnapshot) {
    if before.state != after.state || before.status_text != after.status_text {
        tracing::info!(state = ?after.state, status = %after.status_text, "Feed status");
    }
    if let Some(event) = after.current.as_ref().filter(|_| after.current != before.current) {
        let (date, time) = event.display_date_time();
        tracing::info!(
            employee = %event.employee_label,
            door = %event.door_id,
            mask = %event.mask_status,
            date = %date,
            time = %time,
            "Access event"
        );
    }
    if after.history.len() != before.history.len() || after.history.first() != before.history.first() {
        tracing::debug!(history = after.history.len(), "History updated");
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gymsmart_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
