use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::InitCallback,
    host::{ClientStorage, Host},
    identity::IdentityManager,
    metadata::MetadataSnapshot,
    scheduler::{Command, Scheduler, SchedulerSettings},
    session::Session,
    transport::Dispatcher,
};

/// Everything the scheduler task needs before it can accept commands.
pub struct Startup {
    pub host: Arc<dyn Host>,
    pub storage: Arc<dyn ClientStorage>,
    pub session: Session,
    pub customer_id: Option<String>,
    pub on_initialize: Option<InitCallback>,
    pub settings: SchedulerSettings,
    pub dispatcher: Dispatcher,
    pub inbox: mpsc::WeakUnboundedSender<Command>,
}

impl Startup {
    /// Captures metadata, resolves identity, then fires `on_initialize`.
    pub async fn initialize(self) -> Scheduler {
        let metadata = MetadataSnapshot::capture(self.host.as_ref());

        let identity = match self.customer_id.filter(|id| !id.is_empty()) {
            Some(id) => IdentityManager::with_override(self.storage, id).await,
            None => IdentityManager::resolve(self.storage).await,
        };

        tracing::debug!(
            customer_id = identity.customer_id(),
            session_id = self.session.id(),
            "telemetry client initialized"
        );

        let scheduler = Scheduler::new(
            self.settings,
            identity,
            self.session,
            metadata,
            self.dispatcher,
            self.inbox,
        );

        if let Some(callback) = self.on_initialize {
            callback();
        }

        scheduler
    }
}

/// Scheduler task body. Commands sent before initialization completes wait in
/// the inbox and are applied in order afterwards.
pub async fn run(startup: Startup, mut inbox: mpsc::UnboundedReceiver<Command>) {
    let mut scheduler = startup.initialize().await;

    while let Some(command) = inbox.recv().await {
        if let Command::Shutdown = command {
            break;
        }
        scheduler.handle(command).await;
    }

    scheduler.flush();
    tracing::debug!("telemetry scheduler stopped");
}
