use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};

use crate::transport::{Batch, Transport};

/// Hands finished batches to the delivery task without waiting on the network.
#[derive(Clone)]
pub struct Dispatcher {
    outbox: mpsc::UnboundedSender<Batch>,
}

impl Dispatcher {
    pub fn channel() -> (Dispatcher, mpsc::UnboundedReceiver<Batch>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        (Dispatcher { outbox }, rx)
    }

    /// Returns `false` if the delivery task is gone; the batch is dropped.
    pub fn dispatch(&self, batch: Batch) -> bool {
        match self.outbox.send(batch) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(events = e.0.len(), "delivery task stopped, dropping batch");
                false
            }
        }
    }
}

/// Sends every batch received on `rx`, each as its own request.
///
/// Sends run concurrently so a slow request never holds back the next batch.
/// Failures are logged and dropped. Returns once `rx` is closed and every
/// in-flight send has settled.
pub async fn deliver(
    mut rx: mpsc::UnboundedReceiver<Batch>,
    transport: Arc<dyn Transport>,
    debug: bool,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            maybe_batch = rx.recv() => match maybe_batch {
                Some(batch) => {
                    let transport = Arc::clone(&transport);
                    in_flight.spawn(send_one(transport, batch, debug));
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    while in_flight.join_next().await.is_some() {}
}

async fn send_one(transport: Arc<dyn Transport>, batch: Batch, debug: bool) {
    let events = batch.len();
    if debug {
        tracing::info!(
            events,
            payload = %serde_json::to_string(&batch).unwrap_or_default(),
            "sending event queue"
        );
    }

    match transport.send_batch(batch).await {
        Ok(()) => tracing::debug!(events, "batch sent"),
        Err(e) => tracing::error!(events, error = %e, "error sending event queue"),
    }
}
