use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    events::{EventRecord, is_priority, lifecycle, names},
    host::HostSignal,
    identity::IdentityManager,
    metadata::MetadataSnapshot,
    queues::{BatchQueue, Debounce},
    scheduler::Command,
    session::Session,
    transport::{Batch, Dispatcher},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Queue empty, no timer armed.
    Idle,
    /// Queue non-empty, debounce timer armed.
    Accumulating,
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub batch_size: usize,
    pub debounce: Duration,
    pub debug: bool,
}

impl From<&ClientConfig> for SchedulerSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            debounce: config.debounce,
            debug: config.is_debug,
        }
    }
}

/// Event queue and flush rules.
///
/// Between commands the scheduler is either `Idle` or `Accumulating`. A flush
/// runs inside a single command, so it has no state of its own.
///
/// Owns the queue and the debounce timer exclusively. Each command is applied
/// to completion before the next one is looked at, so queue mutation and timer
/// rearming never interleave. A flush empties the queue synchronously before
/// the batch reaches the network: anything recorded while a send is in flight
/// starts the next batch.
pub struct Scheduler {
    queue: BatchQueue<EventRecord>,
    debounce: Debounce,
    inbox: mpsc::WeakUnboundedSender<Command>,
    dispatcher: Dispatcher,
    identity: IdentityManager,
    session: Session,
    metadata: Arc<MetadataSnapshot>,
    state: SchedulerState,
    debug: bool,
}

impl Scheduler {
    pub fn new(
        settings: SchedulerSettings,
        identity: IdentityManager,
        session: Session,
        metadata: MetadataSnapshot,
        dispatcher: Dispatcher,
        inbox: mpsc::WeakUnboundedSender<Command>,
    ) -> Self {
        Self {
            queue: BatchQueue::new(settings.batch_size),
            debounce: Debounce::new(settings.debounce),
            inbox,
            dispatcher,
            identity,
            session,
            metadata: Arc::new(metadata),
            state: SchedulerState::Idle,
            debug: settings.debug,
        }
    }

    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::Record {
                name,
                data,
                created_at,
            } => self.record(name, data, created_at),
            Command::SetCustomerId(id) => self.identity.override_id(id).await,
            Command::Signal { signal, at } => self.on_signal(signal, at),
            Command::Flush => self.flush(),
            Command::DebounceElapsed { timer_id } => {
                if self.debounce.fire(timer_id) {
                    self.flush();
                }
            }
            Command::PendingEvents(reply) => {
                let _ = reply.send(self.queue.len());
            }
            Command::Shutdown => self.flush(),
        }
    }

    pub fn record(&mut self, name: String, data: Value, created_at: DateTime<Utc>) {
        let record = EventRecord::new(
            name,
            data,
            self.identity.customer_id(),
            &self.session,
            &self.metadata,
            created_at,
        );

        if self.debug {
            tracing::info!(
                event = %serde_json::to_string(&record).unwrap_or_default(),
                "onEvent"
            );
        }

        let priority = is_priority(&record.event_name);
        let full = self.queue.push(record);

        if full || priority {
            self.flush();
        } else {
            self.debounce
                .rearm(&self.inbox, |timer_id| Command::DebounceElapsed { timer_id });
            self.state = SchedulerState::Accumulating;
        }
    }

    /// Hands the whole queue to the transport as one batch. No-op when empty.
    pub fn flush(&mut self) {
        self.debounce.cancel();
        if self.queue.is_empty() {
            self.state = SchedulerState::Idle;
            return;
        }

        let batch = Batch::new(self.identity.customer_id().to_string(), self.queue.take());
        tracing::debug!(events = batch.len(), "flushing event queue");
        self.dispatcher.dispatch(batch);
        self.state = SchedulerState::Idle;
    }

    fn on_signal(&mut self, signal: HostSignal, at: DateTime<Utc>) {
        let customer_id = self.identity.customer_id();
        match signal {
            HostSignal::Run => {
                let data = lifecycle::plugin_started(customer_id, &self.session, &self.metadata, at);
                self.record(names::PLUGIN_STARTED.to_string(), data, at);
            }
            HostSignal::Close => {
                let data = lifecycle::plugin_closed(customer_id, &self.session, &self.metadata, at);
                self.record(names::PLUGIN_CLOSED.to_string(), data, at);
            }
            HostSignal::Error(report) => {
                let data = lifecycle::error_occurred(&report);
                self.record(names::ERROR_OCCURRED.to_string(), data, at);
            }
        }
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

    use super::*;
    use crate::{
        host::{ClientStorage, ErrorReport, MemoryStorage},
        metadata::NOT_FOUND,
    };

    struct Harness {
        scheduler: Scheduler,
        // Keeps the scheduler's weak sender upgradable.
        _inbox_tx: UnboundedSender<Command>,
        inbox_rx: UnboundedReceiver<Command>,
        outbox: UnboundedReceiver<Batch>,
    }

    impl Harness {
        async fn new() -> Self {
            let storage: Arc<dyn ClientStorage> = Arc::new(MemoryStorage::new());
            let identity =
                IdentityManager::with_override(storage, "cust-initial".to_string()).await;
            let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
            let (dispatcher, outbox) = Dispatcher::channel();
            let settings = SchedulerSettings {
                batch_size: 10,
                debounce: Duration::from_millis(10_000),
                debug: false,
            };
            let scheduler = Scheduler::new(
                settings,
                identity,
                Session::start(),
                snapshot(),
                dispatcher,
                inbox_tx.downgrade(),
            );

            Self {
                scheduler,
                _inbox_tx: inbox_tx,
                inbox_rx,
                outbox,
            }
        }

        fn record(&mut self, name: &str) {
            self.scheduler.record(name.to_string(), json!({}), Utc::now());
        }

        fn sent(&mut self) -> Vec<Batch> {
            let mut batches = Vec::new();
            while let Ok(batch) = self.outbox.try_recv() {
                batches.push(batch);
            }
            batches
        }

        /// Feeds queued timer expiries back into the scheduler.
        async fn pump(&mut self) {
            while let Ok(command) = self.inbox_rx.try_recv() {
                self.scheduler.handle(command).await;
            }
        }
    }

    fn snapshot() -> MetadataSnapshot {
        MetadataSnapshot {
            plugin_id: Some("42".to_string()),
            document_name: NOT_FOUND.to_string(),
            page_name: "Page".to_string(),
            editor_type: Some("figma".to_string()),
            payments_status_type: "Not enabled".to_string(),
            current_page_element_count: 2,
            current_selection_count: 0,
        }
    }

    fn names_of(batch: &Batch) -> Vec<String> {
        batch.data.iter().map(|e| e.event_name.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn tenth_record_flushes_whole_queue_in_order() {
        let mut h = Harness::new().await;

        for i in 0..9 {
            h.record(&format!("feature_{i}"));
            assert_eq!(h.scheduler.pending_events(), i + 1);
            assert_eq!(h.scheduler.state(), SchedulerState::Accumulating);
        }
        assert!(h.sent().is_empty());

        h.record("feature_9");
        assert_eq!(h.scheduler.pending_events(), 0);
        assert_eq!(h.scheduler.state(), SchedulerState::Idle);

        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        let expected: Vec<String> = (0..10).map(|i| format!("feature_{i}")).collect();
        assert_eq!(names_of(&sent[0]), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn priority_events_flush_immediately() {
        for name in names::PRIORITY_EVENTS {
            let mut h = Harness::new().await;
            h.record(name);

            let sent = h.sent();
            assert_eq!(sent.len(), 1, "{name} should flush");
            assert_eq!(sent[0].len(), 1);
            assert_eq!(h.scheduler.pending_events(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn priority_event_carries_queued_events_along() {
        let mut h = Harness::new().await;
        h.record(names::API_CALL);
        h.record(names::UI_INTERACTION);
        h.record(names::ERROR_OCCURRED);

        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            names_of(&sent[0]),
            vec!["api_call", "ui_interaction", "error_occurred"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_period_flushes_once() {
        let mut h = Harness::new().await;

        for _ in 0..4 {
            h.record(names::API_CALL);
            tokio::time::advance(Duration::from_millis(2_000)).await;
            h.pump().await;
        }
        assert!(h.sent().is_empty());

        tokio::time::sleep(Duration::from_millis(10_001)).await;
        h.pump().await;

        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 4);
        assert_eq!(h.scheduler.state(), SchedulerState::Idle);

        tokio::time::sleep(Duration::from_millis(20_000)).await;
        h.pump().await;
        assert!(h.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_queued_before_rearm_is_ignored() {
        let mut h = Harness::new().await;
        h.record(names::API_CALL);

        // The timer fires and its expiry waits in the inbox unhandled.
        tokio::time::sleep(Duration::from_millis(10_001)).await;
        assert!(!h.inbox_rx.is_empty());

        // A later record rearms before that expiry is looked at.
        h.record(names::API_CALL);
        h.pump().await;
        assert!(h.sent().is_empty());
        assert_eq!(h.scheduler.pending_events(), 2);
        assert_eq!(h.scheduler.state(), SchedulerState::Accumulating);

        tokio::time::sleep(Duration::from_millis(10_001)).await;
        h.pump().await;
        let sent = h.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_queued_before_flush_is_ignored() {
        let mut h = Harness::new().await;
        h.record(names::API_CALL);
        tokio::time::sleep(Duration::from_millis(10_001)).await;

        h.scheduler.flush();
        assert_eq!(h.sent().len(), 1);

        h.record(names::API_CALL);
        h.pump().await;
        assert!(h.sent().is_empty());
        assert_eq!(h.scheduler.pending_events(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_on_empty_queue_sends_nothing() {
        let mut h = Harness::new().await;
        h.scheduler.flush();
        h.scheduler.handle(Command::Flush).await;
        assert!(h.sent().is_empty());
        assert_eq!(h.scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn customer_override_applies_to_later_records_only() {
        let mut h = Harness::new().await;
        h.record(names::FEATURE_USED);
        h.scheduler
            .handle(Command::SetCustomerId("cust-new".to_string()))
            .await;
        h.record(names::FEATURE_USED);
        h.scheduler.flush();

        let sent = h.sent();
        assert_eq!(sent[0].data[0].customer_id, "cust-initial");
        assert_eq!(sent[0].data[1].customer_id, "cust-new");
        assert_eq!(sent[0].customer_id, "cust-new");
    }

    #[tokio::test(start_paused = true)]
    async fn session_fields_identical_across_events() {
        let mut h = Harness::new().await;
        for _ in 0..25 {
            h.record(names::UI_INTERACTION);
        }
        h.scheduler.flush();

        let session = h.scheduler.session().clone();
        let events: Vec<EventRecord> = h.sent().into_iter().flat_map(|b| b.data).collect();
        assert_eq!(events.len(), 25);
        for event in events {
            assert_eq!(event.session_id, session.id());
            assert_eq!(event.session_started, session.started());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn close_signal_records_session_end() {
        let mut h = Harness::new().await;
        let at = Utc::now();
        h.scheduler
            .handle(Command::Signal {
                signal: HostSignal::Close,
                at,
            })
            .await;

        let sent = h.sent();
        let event = &sent[0].data[0];
        assert_eq!(event.event_name, names::PLUGIN_CLOSED);
        assert!(event.event_data.get("sessionEnded").is_some());
        assert_eq!(event.event_data["customerId"], "cust-initial");
    }

    #[tokio::test(start_paused = true)]
    async fn host_error_becomes_error_occurred() {
        let mut h = Harness::new().await;
        let report = ErrorReport {
            lineno: Some(12),
            ..ErrorReport::new("undefined is not a function")
        };
        h.scheduler
            .handle(Command::Signal {
                signal: HostSignal::Error(report),
                at: Utc::now(),
            })
            .await;

        let sent = h.sent();
        let event = &sent[0].data[0];
        assert_eq!(event.event_name, names::ERROR_OCCURRED);
        assert_eq!(event.event_data["message"], "undefined is not a function");
        assert_eq!(event.event_data["lineno"], 12);
    }

    #[tokio::test(start_paused = true)]
    async fn records_after_flush_start_a_new_batch() {
        let mut h = Harness::new().await;
        h.record(names::PLUGIN_STARTED);
        h.record(names::FEATURE_USED);

        assert_eq!(h.sent().len(), 1);
        assert_eq!(h.scheduler.pending_events(), 1);
    }
}
