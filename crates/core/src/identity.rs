use std::sync::Arc;

use uuid::Uuid;

use crate::{config::CUSTOMER_ID_STORAGE_KEY, host::ClientStorage};

const TOKEN_LEN: usize = 13;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short lowercase alphanumeric token drawn from v4 UUID entropy.
pub fn random_token() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut token = String::with_capacity(TOKEN_LEN);
    for _ in 0..TOKEN_LEN {
        token.push(ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    token
}

/// Owns the pseudo-anonymous customer identifier.
///
/// Storage failures never surface: the manager falls back to an in-memory
/// identifier for the rest of the session.
pub struct IdentityManager {
    storage: Arc<dyn ClientStorage>,
    customer_id: String,
}

impl IdentityManager {
    /// Reads the persisted identifier, generating and persisting one if absent.
    pub async fn resolve(storage: Arc<dyn ClientStorage>) -> Self {
        let read = storage.get(CUSTOMER_ID_STORAGE_KEY).await;
        let stored = match read {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "identity read failed, using in-memory identifier");
                return Self {
                    storage,
                    customer_id: random_token(),
                };
            }
        };

        let customer_id = match stored {
            Some(id) => id,
            None => {
                let id = random_token();
                persist(storage.as_ref(), &id).await;
                id
            }
        };

        Self {
            storage,
            customer_id,
        }
    }

    /// Starts from an explicit identifier, persisting it over whatever is stored.
    pub async fn with_override(storage: Arc<dyn ClientStorage>, customer_id: String) -> Self {
        persist(storage.as_ref(), &customer_id).await;
        Self {
            storage,
            customer_id,
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Replaces the identifier in memory first, then persists it. Events
    /// already built keep the identifier they were built with.
    pub async fn override_id(&mut self, customer_id: String) {
        self.customer_id = customer_id;
        persist(self.storage.as_ref(), &self.customer_id).await;
    }
}

async fn persist(storage: &dyn ClientStorage, customer_id: &str) {
    if let Err(e) = storage.set(CUSTOMER_ID_STORAGE_KEY, customer_id).await {
        tracing::warn!(error = %e, "identity write failed, identifier kept in memory only");
    }
}
