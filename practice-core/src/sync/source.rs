use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("calendar source error: {0}")]
    Source(String),

    #[error(transparent)]
    Store(#[from] crate::db::StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub title: String,
    pub start: DateTime<Utc>,
}

/// Only events whose title contains `keyword` (case-sensitive) are eligible
/// for import.
pub fn is_eligible(
    event: &ExternalEvent,
    keyword: &str,
) -> bool {
    event.title.contains(keyword)
}

/// An external calendar that can be asked for candidate events.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch_events(
        &self,
        keyword: &str,
    ) -> Result<Vec<ExternalEvent>, SyncError>;
}

/// Scripted calendar standing in for a real provider.
#[derive(Debug, Clone)]
pub struct SimulatedCalendarSource {
    events: Vec<ExternalEvent>,
}

impl SimulatedCalendarSource {
    /// One matching appointment at `now` and one unrelated entry.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_events(vec![
            ExternalEvent {
                title: "Shiatsu with Max".to_string(),
                start: now,
            },
            ExternalEvent {
                title: "Dentist".to_string(),
                start: now + chrono::Duration::days(1),
            },
        ])
    }

    pub fn with_events(events: Vec<ExternalEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CalendarSource for SimulatedCalendarSource {
    async fn fetch_events(
        &self,
        keyword: &str,
    ) -> Result<Vec<ExternalEvent>, SyncError> {
        Ok(self
            .events
            .iter()
            .filter(|event| is_eligible(event, keyword))
            .cloned()
            .collect())
    }
}

/// Suspends the caller; abstracted so tests can skip or control the wait.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(
        &self,
        duration: Duration,
    );
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(
        &self,
        duration: Duration,
    ) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(
        &self,
        _duration: Duration,
    ) {
    }
}
