use thiserror::Error;

#[derive(Error, Debug)]
pub enum FiglyticsError {
    #[error("Client storage unavailable for key {key}: {reason}")]
    PersistenceUnavailable { key: String, reason: String },

    #[error("Host capability {capability} is not available")]
    HostCapabilityAbsent { capability: &'static str },

    #[error("Sending batch of {events} events failed: {source}")]
    TransportFailure {
        events: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Client has shut down")]
    ClientClosed,
}

pub type Result<T> = std::result::Result<T, FiglyticsError>;
