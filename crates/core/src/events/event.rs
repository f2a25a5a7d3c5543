use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::{metadata::MetadataSnapshot, session::Session};

/// One enriched application event. Immutable once built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_name: String,
    pub event_data: Value,
    pub customer_id: String,
    pub session_id: String,
    #[serde(with = "iso8601")]
    pub session_started: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub event_created: DateTime<Utc>,
    #[serde(rename = "figmaPluginMetaData")]
    pub metadata: Arc<MetadataSnapshot>,
}

impl EventRecord {
    pub fn new(
        event_name: String,
        event_data: Value,
        customer_id: &str,
        session: &Session,
        metadata: &Arc<MetadataSnapshot>,
        event_created: DateTime<Utc>,
    ) -> Self {
        Self {
            event_name,
            event_data,
            customer_id: customer_id.to_string(),
            session_id: session.id().to_string(),
            session_started: session.started(),
            event_created,
            metadata: Arc::clone(metadata),
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(ts))
    }
}
