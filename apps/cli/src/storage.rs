use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use figlytics_core::{ClientStorage, FiglyticsError, Result};
use tokio::{fs, sync::Mutex};

pub fn get_root_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("figlytics")
}

pub fn get_storage_path(data_dir: &Path) -> PathBuf {
    data_dir.join("client_storage.json")
}

/// Client storage kept as a single JSON object on disk.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(unavailable(&self.path, e)),
        }
    }
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> FiglyticsError {
    FiglyticsError::PersistenceUnavailable {
        key: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl ClientStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(&self.path, e))?;
        }
        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| unavailable(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_storage_path(&dir.path().join("nested"));

        let storage = FileStorage::new(path.clone());
        assert_eq!(storage.get("figlytics-customerid").await.unwrap(), None);
        storage.set("figlytics-customerid", "abc123").await.unwrap();

        let reopened = FileStorage::new(path);
        assert_eq!(
            reopened.get("figlytics-customerid").await.unwrap().as_deref(),
            Some("abc123")
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_storage_path(dir.path());
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(path);
        assert!(storage.get("k").await.is_err());
    }
}
