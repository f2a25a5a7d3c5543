//! Seams to the hosting plugin environment.
//!
//! The client never talks to the host directly. It reads environment facts
//! through [`Host`], persists identity through [`ClientStorage`], and receives
//! lifecycle notifications as [`HostSignal`]s delivered by the embedding code.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{FiglyticsError, Result};

/// Read-only view of the host document, page and editor state.
pub trait Host: Send + Sync {
    fn plugin_id(&self) -> Option<String>;

    /// Name of the document containing the current page, `None` when the page
    /// has no parent.
    fn document_name(&self) -> Option<String>;

    fn page_name(&self) -> String;

    fn editor_type(&self) -> Option<String>;

    /// Fails with [`FiglyticsError::HostCapabilityAbsent`] when the payments
    /// capability is not enabled for the plugin.
    fn payments_status(&self) -> Result<String>;

    fn page_element_count(&self) -> usize;

    fn selection_count(&self) -> usize;
}

/// Asynchronous string-keyed persistent storage provided by the host.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local storage, used when the host offers nothing durable and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| FiglyticsError::PersistenceUnavailable {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries =
            self.entries
                .lock()
                .map_err(|e| FiglyticsError::PersistenceUnavailable {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Uncaught error reported through the host's global error hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorReport {
    pub message: Option<String>,
    pub source: Option<String>,
    pub lineno: Option<u32>,
    pub colno: Option<u32>,
    pub error: Option<String>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostSignal {
    Run,
    Close,
    Error(ErrorReport),
}
