pub const ERROR_OCCURRED: &str = "error_occurred";
pub const API_CALL: &str = "api_call";
pub const UI_INTERACTION: &str = "ui_interaction";
pub const PLUGIN_CLOSED: &str = "plugin_closed";
pub const PLUGIN_STARTED: &str = "plugin_started";
pub const PAYMENT_COMPLETED: &str = "payment_completed";
pub const PAYMENT_INITIALIZED: &str = "payment_initialized";
pub const PAYMENT_FAILED: &str = "payment_failed";
pub const FEATURE_USED: &str = "feature_used";

/// Events that bypass batching and flush the queue as soon as they are recorded.
pub const PRIORITY_EVENTS: [&str; 3] = [ERROR_OCCURRED, PLUGIN_CLOSED, PLUGIN_STARTED];

pub fn is_priority(event_name: &str) -> bool {
    PRIORITY_EVENTS.contains(&event_name)
}
