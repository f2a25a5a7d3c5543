use std::{ops::Deref, sync::Arc};

use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    config::ClientConfig,
    error::{FiglyticsError, Result},
    host::{ClientStorage, ErrorReport, Host, HostSignal},
    scheduler::{self, Command, SchedulerSettings, Startup},
    session::Session,
    transport::{self, Dispatcher, HttpTransport, Transport},
};

/// Fire-and-forget entry points. Cheap to clone; every call is a message to
/// the scheduler task and none of them can fail from the caller's side.
#[derive(Clone)]
pub struct FiglyticsHandle {
    inbox: mpsc::UnboundedSender<Command>,
}

impl FiglyticsHandle {
    pub fn record_event(&self, name: impl Into<String>, data: impl Serialize) {
        let name = name.into();
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(event = %name, error = %e, "event data is not serializable, dropping event");
                return;
            }
        };

        self.send(Command::Record {
            name,
            data,
            created_at: Utc::now(),
        });
    }

    /// Affects events recorded after this call only.
    pub fn set_customer_id(&self, customer_id: impl Into<String>) {
        self.send(Command::SetCustomerId(customer_id.into()));
    }

    pub fn signal(&self, signal: HostSignal) {
        self.send(Command::Signal {
            signal,
            at: Utc::now(),
        });
    }

    pub fn report_error(&self, report: ErrorReport) {
        self.signal(HostSignal::Error(report));
    }

    pub fn flush(&self) {
        self.send(Command::Flush);
    }

    /// Current queue length, once every earlier call has been applied.
    pub async fn pending_events(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.inbox
            .send(Command::PendingEvents(tx))
            .map_err(|_| FiglyticsError::ClientClosed)?;
        rx.await.map_err(|_| FiglyticsError::ClientClosed)
    }

    fn send(&self, command: Command) {
        if self.inbox.send(command).is_err() {
            tracing::debug!("telemetry client closed, dropping call");
        }
    }
}

/// One telemetry client per host session.
///
/// Must be created inside a Tokio runtime. Dropping the client and every
/// handle flushes what is queued; [`Figlytics::shutdown`] also waits for the
/// outstanding sends.
pub struct Figlytics {
    handle: FiglyticsHandle,
    scheduler: JoinHandle<()>,
    delivery: JoinHandle<()>,
}

impl Figlytics {
    pub fn new(
        host: Arc<dyn Host>,
        storage: Arc<dyn ClientStorage>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(host, storage, transport, config)
    }

    pub fn with_transport(
        host: Arc<dyn Host>,
        storage: Arc<dyn ClientStorage>,
        transport: Arc<dyn Transport>,
        mut config: ClientConfig,
    ) -> Result<Self> {
        config.validate()?;

        let session = Session::start();
        let settings = SchedulerSettings::from(&config);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (dispatcher, outbox) = Dispatcher::channel();

        let delivery = tokio::spawn(transport::deliver(outbox, transport, config.is_debug));

        let startup = Startup {
            host,
            storage,
            session,
            customer_id: config.customer_id.take(),
            on_initialize: config.on_initialize.take(),
            settings,
            dispatcher,
            inbox: inbox_tx.downgrade(),
        };
        let scheduler = tokio::spawn(scheduler::run(startup, inbox_rx));

        Ok(Self {
            handle: FiglyticsHandle { inbox: inbox_tx },
            scheduler,
            delivery,
        })
    }

    pub fn handle(&self) -> FiglyticsHandle {
        self.handle.clone()
    }

    /// Flushes the queue, stops the scheduler and waits for in-flight sends.
    pub async fn shutdown(self) {
        self.handle.send(Command::Shutdown);
        drop(self.handle);

        if let Err(e) = self.scheduler.await {
            tracing::error!(error = %e, "telemetry scheduler task failed");
        }
        if let Err(e) = self.delivery.await {
            tracing::error!(error = %e, "telemetry delivery task failed");
        }
    }
}

impl Deref for Figlytics {
    type Target = FiglyticsHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
