use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::host::HostSignal;

/// Everything that can drive the scheduler, delivered through one inbox.
#[derive(Debug)]
pub enum Command {
    Record {
        name: String,
        data: Value,
        created_at: DateTime<Utc>,
    },
    SetCustomerId(String),
    Signal {
        signal: HostSignal,
        at: DateTime<Utc>,
    },
    Flush,
    DebounceElapsed {
        timer_id: u64,
    },
    PendingEvents(oneshot::Sender<usize>),
    Shutdown,
}
