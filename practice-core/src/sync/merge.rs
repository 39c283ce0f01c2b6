//! One-shot "connect and import" against an external calendar.
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──delay──▶ Connected
//!       ▲                                             │
//!       └───────────────── reset (data wipe) ─────────┘
//! ```
//!
//! After the connection is up, at most one eligible event is turned into a
//! booking, and only when no import-prefixed booking exists yet, at least one
//! customer exists, and the user confirms.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::source::{CalendarSource, Delay, ExternalEvent, SyncError, is_eligible};
use crate::config::PracticeConfig;
use crate::models::{Booking, ServiceType};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Yes/no gate consulted before a synthetic booking is committed.
pub trait ConfirmationGate {
    fn confirm(
        &self,
        prompt: &str,
    ) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(
        &self,
        prompt: &str,
    ) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Imported(Booking),
    Declined,
    /// An import-prefixed booking already exists.
    AlreadyImported,
    NoCustomers,
    /// The calendar returned no event matching the keyword.
    NothingToImport,
    /// Another connect call is still running; this one did nothing.
    InProgress,
}

impl SyncOutcome {
    /// Status line to surface to the user.
    pub fn notice(
        &self,
        keyword: &str,
    ) -> String {
        match self {
            Self::Imported(booking) => format!(
                "Imported 1 appointment from the external calendar (booking {}).",
                booking.id
            ),
            Self::Declined => "Import declined; no bookings were changed.".to_string(),
            Self::AlreadyImported | Self::NoCustomers | Self::NothingToImport => format!(
                "Calendar connected. Future appointments with '{keyword}' in the title will be detected automatically."
            ),
            Self::InProgress => "A calendar connection is already in progress.".to_string(),
        }
    }
}

pub struct CalendarSync {
    keyword: String,
    import_prefix: String,
    delay_duration: std::time::Duration,
    source: Box<dyn CalendarSource>,
    delay: Box<dyn Delay>,
    state: Mutex<ConnectionState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag and rolls back a half-finished connection when
/// the connect future is dropped early.
struct FlightGuard<'a> {
    sync: &'a CalendarSync,
    rollback_to: Option<ConnectionState>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.rollback_to.take() {
            self.sync.set_state(state);
        }
        self.sync.in_flight.store(false, Ordering::Release);
    }
}

impl CalendarSync {
    pub fn new(
        config: &PracticeConfig,
        source: Box<dyn CalendarSource>,
        delay: Box<dyn Delay>,
    ) -> Self {
        Self {
            keyword: config.sync_keyword.clone(),
            import_prefix: config.import_prefix.clone(),
            delay_duration: config.connect_delay(),
            source,
            delay,
            state: Mutex::new(ConnectionState::Disconnected),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Back to `Disconnected`. Only meant to accompany a full data reset.
    pub fn reset(&self) {
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(
        &self,
        state: ConnectionState,
    ) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Runs the connect action and, if the policy allows it, imports one
    /// event as a booking.
    ///
    /// Re-running after a successful import never creates a second booking:
    /// the existing import-prefixed booking is found by a prefix scan.
    pub async fn connect(
        &self,
        store: &tokio::sync::Mutex<RecordStore>,
        gate: &dyn ConfirmationGate,
    ) -> Result<SyncOutcome, SyncError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("connect ignored, another one is in flight");
            return Ok(SyncOutcome::InProgress);
        }
        let mut guard = FlightGuard {
            sync: self,
            rollback_to: None,
        };

        if self.state() != ConnectionState::Connected {
            guard.rollback_to = Some(self.state());
            self.set_state(ConnectionState::Connecting);
            info!("connecting to external calendar");
            self.delay.sleep(self.delay_duration).await;
            self.set_state(ConnectionState::Connected);
            guard.rollback_to = None;
            info!("external calendar connected");
        }

        // The source is only queried when the store could take an import.
        if let Some(outcome) = self.blocked_by(&*store.lock().await) {
            return Ok(outcome);
        }

        let events = self.source.fetch_events(&self.keyword).await?;
        let candidate = events.into_iter().find(|e| is_eligible(e, &self.keyword));

        let mut store = store.lock().await;
        self.merge(&mut store, candidate, gate).await
    }

    fn blocked_by(
        &self,
        store: &RecordStore,
    ) -> Option<SyncOutcome> {
        if store
            .list_bookings()
            .iter()
            .any(|b| b.has_external_prefix(&self.import_prefix))
        {
            debug!("import-prefixed booking present, nothing to merge");
            return Some(SyncOutcome::AlreadyImported);
        }
        if store.list_customers().is_empty() {
            return Some(SyncOutcome::NoCustomers);
        }
        None
    }

    async fn merge(
        &self,
        store: &mut RecordStore,
        candidate: Option<ExternalEvent>,
        gate: &dyn ConfirmationGate,
    ) -> Result<SyncOutcome, SyncError> {
        // Re-checked: the store may have changed while events were fetched.
        if let Some(outcome) = self.blocked_by(store) {
            return Ok(outcome);
        }
        let Some(customer_id) = store.list_customers().first().map(|c| c.id.clone()) else {
            return Ok(SyncOutcome::NoCustomers);
        };
        let Some(event) = candidate else {
            return Ok(SyncOutcome::NothingToImport);
        };

        let prompt = format!(
            "Calendar connected! Found 1 new appointment titled '{}'. Import it?",
            event.title
        );
        if !gate.confirm(&prompt) {
            info!(title = %event.title, "import declined");
            return Ok(SyncOutcome::Declined);
        }

        let now = store.clock().now();
        let booking = Booking {
            id: store.next_id("B-"),
            // No identity matching: the first customer receives the import.
            customer_id,
            external_event_id: store.next_id(&format!("{}auto_", self.import_prefix)),
            service_type: ServiceType::OneHourSession,
            appointment_date_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            notes: format!(
                "Imported automatically from external calendar (title contained '{}')",
                self.keyword
            ),
        };
        store.add_booking(booking.clone()).await?;
        info!(id = %booking.id, external_id = %booking.external_event_id, "external event imported");
        Ok(SyncOutcome::Imported(booking))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::db::InMemoryStore;
    use crate::models::NewCustomer;
    use crate::sync::source::{NoDelay, SimulatedCalendarSource, TokioDelay};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap()
    }

    async fn store() -> tokio::sync::Mutex<RecordStore> {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(now()));
        let store = RecordStore::open(Box::new(InMemoryStore::new()), "k", clock)
            .await
            .unwrap();
        tokio::sync::Mutex::new(store)
    }

    fn sync() -> CalendarSync {
        CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(SimulatedCalendarSource::new(now())),
            Box::new(NoDelay),
        )
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    struct BrokenSource;

    #[async_trait]
    impl CalendarSource for BrokenSource {
        async fn fetch_events(
            &self,
            _keyword: &str,
        ) -> Result<Vec<ExternalEvent>, SyncError> {
            Err(SyncError::Source("quota exceeded".to_string()))
        }
    }

    #[tokio::test]
    async fn imports_one_booking_for_the_first_customer() {
        let store = store().await;
        let maria = store
            .lock()
            .await
            .add_customer(NewCustomer::named("Maria Schmidt"))
            .await
            .unwrap();
        store
            .lock()
            .await
            .add_customer(NewCustomer::named("Jonas Weber"))
            .await
            .unwrap();
        let sync = sync();

        let outcome = sync.connect(&store, &yes).await.unwrap();

        let booking = match outcome {
            SyncOutcome::Imported(booking) => booking,
            other => panic!("expected an import, got {other:?}"),
        };
        assert_eq!(booking.customer_id, maria.id);
        assert!(booking.external_event_id.starts_with("gcal_auto_"));
        assert_eq!(booking.service_type, ServiceType::OneHourSession);
        assert_eq!(booking.appointment_date_time, "2026-10-15T09:00:00.000Z");
        assert!(booking.notes.contains("Shiatsu"));
        assert_eq!(store.lock().await.list_bookings(), &[booking]);
        assert_eq!(sync.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn second_connect_is_idempotent() {
        let store = store().await;
        store
            .lock()
            .await
            .add_customer(NewCustomer::named("Maria Schmidt"))
            .await
            .unwrap();
        let sync = sync();

        sync.connect(&store, &yes).await.unwrap();
        let second = sync.connect(&store, &yes).await.unwrap();

        assert_eq!(second, SyncOutcome::AlreadyImported);
        let imported = store
            .lock()
            .await
            .list_bookings()
            .iter()
            .filter(|b| b.has_external_prefix("gcal_"))
            .count();
        assert_eq!(imported, 1);
    }

    #[tokio::test]
    async fn no_customers_means_no_booking_and_no_prompt() {
        let store = store().await;
        let asked = AtomicUsize::new(0);
        let gate = |_: &str| {
            asked.fetch_add(1, Ordering::SeqCst);
            true
        };

        let outcome = sync().connect(&store, &gate).await.unwrap();

        assert_eq!(outcome, SyncOutcome::NoCustomers);
        assert!(store.lock().await.list_bookings().is_empty());
        assert_eq!(asked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn declining_changes_nothing() {
        let store = store().await;
        store
            .lock()
            .await
            .add_customer(NewCustomer::named("Maria Schmidt"))
            .await
            .unwrap();

        let outcome = sync().connect(&store, &no).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Declined);
        assert!(store.lock().await.list_bookings().is_empty());
    }

    #[tokio::test]
    async fn existing_import_from_demo_data_blocks_a_new_one() {
        let store = store().await;
        store.lock().await.load_demo().await.unwrap();

        let outcome = sync().connect(&store, &yes).await.unwrap();

        assert_eq!(outcome, SyncOutcome::AlreadyImported);
        assert_eq!(store.lock().await.list_bookings().len(), 1);
    }

    #[tokio::test]
    async fn events_without_keyword_are_ignored() {
        let store = store().await;
        store
            .lock()
            .await
            .add_customer(NewCustomer::named("Maria Schmidt"))
            .await
            .unwrap();
        let sync = CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(SimulatedCalendarSource::with_events(vec![ExternalEvent {
                title: "Team meeting".to_string(),
                start: now(),
            }])),
            Box::new(NoDelay),
        );

        let outcome = sync.connect(&store, &yes).await.unwrap();

        assert_eq!(outcome, SyncOutcome::NothingToImport);
        assert!(store.lock().await.list_bookings().is_empty());
    }

    #[tokio::test]
    async fn source_failure_is_reported_and_store_untouched() {
        let store = store().await;
        store
            .lock()
            .await
            .add_customer(NewCustomer::named("Maria Schmidt"))
            .await
            .unwrap();
        let sync = CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(BrokenSource),
            Box::new(NoDelay),
        );

        let err = sync.connect(&store, &yes).await.unwrap_err();

        assert_eq!(err, SyncError::Source("quota exceeded".to_string()));
        assert!(store.lock().await.list_bookings().is_empty());
        // A fresh attempt is allowed.
        assert!(matches!(
            sync.connect(&store, &yes).await,
            Err(SyncError::Source(_))
        ));
    }

    #[tokio::test]
    async fn existing_import_skips_the_source() {
        let store = store().await;
        store.lock().await.load_demo().await.unwrap();
        let sync = CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(BrokenSource),
            Box::new(NoDelay),
        );

        let outcome = sync.connect(&store, &yes).await;

        assert_eq!(outcome, Ok(SyncOutcome::AlreadyImported));
    }

    #[tokio::test]
    async fn empty_customer_list_skips_the_source() {
        let store = store().await;
        let sync = CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(BrokenSource),
            Box::new(NoDelay),
        );

        let outcome = sync.connect(&store, &yes).await;

        assert_eq!(outcome, Ok(SyncOutcome::NoCustomers));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_connect_is_ignored_while_in_flight() {
        let store = store().await;
        store
            .lock()
            .await
            .add_customer(NewCustomer::named("Maria Schmidt"))
            .await
            .unwrap();
        let sync = CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(SimulatedCalendarSource::new(now())),
            Box::new(TokioDelay),
        );

        let (first, second) = tokio::join!(sync.connect(&store, &yes), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(sync.state(), ConnectionState::Connecting);
            sync.connect(&store, &yes).await
        });

        assert!(matches!(first, Ok(SyncOutcome::Imported(_))));
        assert_eq!(second, Ok(SyncOutcome::InProgress));
        assert_eq!(store.lock().await.list_bookings().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_connect_rolls_back_to_disconnected() {
        let store = store().await;
        let sync = CalendarSync::new(
            &PracticeConfig::default(),
            Box::new(SimulatedCalendarSource::new(now())),
            Box::new(TokioDelay),
        );

        let timed_out =
            tokio::time::timeout(Duration::from_millis(100), sync.connect(&store, &yes)).await;

        assert!(timed_out.is_err());
        assert_eq!(sync.state(), ConnectionState::Disconnected);
        assert_eq!(
            sync.connect(&store, &yes).await,
            Ok(SyncOutcome::NoCustomers)
        );
    }

    #[tokio::test]
    async fn reset_returns_to_disconnected() {
        let store = store().await;
        let sync = sync();
        sync.connect(&store, &yes).await.unwrap();
        assert_eq!(sync.state(), ConnectionState::Connected);

        sync.reset();

        assert_eq!(sync.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn notices_name_the_keyword() {
        assert!(SyncOutcome::NoCustomers.notice("Shiatsu").contains("'Shiatsu'"));
        assert!(SyncOutcome::Declined.notice("Shiatsu").contains("declined"));
    }
}
