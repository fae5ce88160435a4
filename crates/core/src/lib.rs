pub mod config;
pub mod error;
pub mod message;
pub mod paths;
pub mod settings;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use message::{ActionAck, ActionKind, PushEvent, UiBus};
pub use paths::Paths;
pub use settings::{
    OutputFormat, SeedChoice, Settings, DEFAULT_FIRST_RUN_SEED, MAX_MODEL_IMAGES,
};
pub use store::{KeyValueStore, MemoryStore, SETTINGS_KEY};
