pub mod actions;
pub mod config_cmd;
pub mod models;
pub mod scan_cmd;
pub mod status;

use stylecast_core::{KeyValueStore, Paths, Settings};
use stylecast_storage::FileStore;

pub(crate) fn settings_store(paths: &Paths) -> FileStore {
    FileStore::new(paths.settings_file())
}

pub(crate) async fn load_settings(store: &FileStore) -> anyhow::Result<Settings> {
    Ok(store.load_settings().await?)
}
