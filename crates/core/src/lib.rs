//! Figlytics Core Library
//!
//! Batched event telemetry for plugins embedded in a host design tool:
//! enriches application events with identity, session and host metadata,
//! queues them, and ships them to the ingestion endpoint in batches.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod identity;
pub mod metadata;
pub mod queues;
pub mod scheduler;
pub mod session;
pub mod transport;

// Re-export commonly used items at crate root
pub use client::{Figlytics, FiglyticsHandle};
pub use config::ClientConfig;
pub use error::{FiglyticsError, Result};
pub use events::{EventRecord, names};
pub use host::{ClientStorage, ErrorReport, Host, HostSignal, MemoryStorage};
pub use metadata::MetadataSnapshot;
pub use transport::{Batch, HttpTransport, Transport};
