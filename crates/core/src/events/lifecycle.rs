use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::{
    events::iso8601, host::ErrorReport, metadata::MetadataSnapshot, session::Session,
};

pub fn plugin_started(
    customer_id: &str,
    session: &Session,
    metadata: &Arc<MetadataSnapshot>,
    now: DateTime<Utc>,
) -> Value {
    json!({
        "customerId": customer_id,
        "sessionId": session.id(),
        "sessionStarted": iso8601::format(&session.started()),
        "eventCreated": iso8601::format(&now),
        "figmaPluginMetaData": metadata.as_ref(),
    })
}

pub fn plugin_closed(
    customer_id: &str,
    session: &Session,
    metadata: &Arc<MetadataSnapshot>,
    ended: DateTime<Utc>,
) -> Value {
    json!({
        "customerId": customer_id,
        "sessionId": session.id(),
        "sessionStarted": iso8601::format(&session.started()),
        "sessionEnded": iso8601::format(&ended),
        "eventCreated": iso8601::format(&ended),
        "figmaPluginMetaData": metadata.as_ref(),
    })
}

pub fn error_occurred(report: &ErrorReport) -> Value {
    serde_json::to_value(report).unwrap_or_else(|_| json!({ "message": report.message }))
}
