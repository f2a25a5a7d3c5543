use chrono::{DateTime, Utc};

use crate::identity::random_token;

/// One continuous run of the hosted instance. Fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: String,
    started: DateTime<Utc>,
}

impl Session {
    pub fn start() -> Self {
        Self {
            session_id: random_token(),
            started: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }
}
