pub mod dispatch;
pub mod http;

pub use dispatch::{Dispatcher, deliver};
pub use http::HttpTransport;

use async_trait::async_trait;
use serde::Serialize;

use crate::{error::Result, events::EventRecord};

/// The whole queue at the moment of a flush, sent as one request body
/// `{"data": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    /// Identity at flush time, sent as `X-Customer-Id`.
    #[serde(skip)]
    pub customer_id: String,
    pub data: Vec<EventRecord>,
}

impl Batch {
    pub fn new(customer_id: String, data: Vec<EventRecord>) -> Self {
        Self { customer_id, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Outbound sender for batches. The response is never interpreted.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_batch(&self, batch: Batch) -> Result<()>;
}
