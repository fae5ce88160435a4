use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::settings::Settings;

pub const SETTINGS_KEY: &str = "settings";

/// Asynchronous key-value store, the abstraction over whatever the host
/// platform provides for local persistence. Single-key operations are
/// atomic; callers never hold locks across awaits.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;

    async fn load_settings(&self) -> Result<Settings> {
        match self.get(SETTINGS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Settings::default()),
        }
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.set(SETTINGS_KEY, serde_json::to_value(settings)?).await
    }
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
