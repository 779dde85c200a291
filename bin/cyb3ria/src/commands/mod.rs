pub mod auth;
pub mod chat;
pub mod completions_cmd;
pub mod config_cmd;
pub mod request;
pub mod status;

use cyb3ria_core::{Config, Paths};
use cyb3ria_storage::{FileStore, KeyValueStore};
use std::sync::Arc;

/// Profile storage shared by the chat and request commands.
pub(crate) fn open_store(paths: &Paths, config: &Config) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(config.storage_file(paths)))
}
