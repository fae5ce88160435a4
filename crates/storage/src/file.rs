use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use stylecast_core::error::{Error, Result};
use stylecast_core::store::KeyValueStore;

/// Key-value store persisted as a single JSON object on disk. The whole
/// map is read and rewritten per operation; a mutex serializes writers so
/// interleaved sets cannot drop each other's keys. Writes go through a
/// temp file + rename so a crash never leaves a torn settings file.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::Storage(format!(
                "{}: expected a JSON object, found {}",
                self.path.display(),
                value_kind(&other)
            ))),
            Err(e) => Err(Error::Storage(format!("{}: {}", self.path.display(), e))),
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(map.clone()))?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = map.len(), "Settings store written");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stylecast_core::Settings;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("settings.json"))
    }

    #[tokio::test]
    async fn get_on_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileStore::new(&path);
        store.set("apiKey", json!("fa-test")).await.unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("apiKey").await.unwrap(), Some(json!("fa-test")));
    }

    #[tokio::test]
    async fn settings_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut settings = Settings::default();
        settings.model_images = vec!["data:image/jpeg;base64,AAAA".to_string()];
        settings.first_swap_done = true;
        store.save_settings(&settings).await.unwrap();

        let loaded = store.load_settings().await.unwrap();
        assert_eq!(loaded.model_images.len(), 1);
        assert!(loaded.first_swap_done);
        assert!(!loaded.first_variation_done);
    }

    #[tokio::test]
    async fn non_object_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();

        let store = FileStore::new(&path);
        let err = store.get("k").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set("k", json!(true)).await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
