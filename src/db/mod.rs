//! Storage engines.
//!
//! A backend is shared by the whole app and hands each request its own
//! session. A session serves the full set of records of a kind, keyed by
//! `<Class>.<id>` in the order the engine produced them, and releases what it
//! holds on `close`.

mod db_storage;
mod file_storage;
pub mod states;

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::core::config::{AppConfig, StorageEngine};
use crate::core::AppError;
use crate::models::states::State;

pub use db_storage::{DbSession, DbStorage};
pub use file_storage::{FileSession, FileStorage, FileStorageError};

/// One request's view of the storage.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All persisted states, keyed by `State.<id>`, in storage order.
    async fn all_states(&self) -> Result<IndexMap<String, State>, AppError>;

    /// Release whatever the session holds. The next call to `all_states`
    /// reopens it.
    async fn close(&self) -> Result<(), AppError>;
}

pub trait StorageBackend: Send + Sync {
    /// A fresh session. Nothing is opened until the first read.
    fn open_session(&self) -> Arc<dyn Storage>;
}

/// Builds the engine selected by `storage.engine`.
pub fn open_storage(configuration: &AppConfig) -> Result<Arc<dyn StorageBackend>, anyhow::Error> {
    match configuration.storage.engine {
        StorageEngine::File => {
            tracing::info!(path = %configuration.storage.file_path, "Using file storage");
            Ok(Arc::new(FileStorage::new(&configuration.storage.file_path)))
        }
        StorageEngine::Db => {
            let mysql = configuration
                .mysql
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("db storage selected but no `mysql` section is configured"))?;
            tracing::info!(host = %mysql.host, database = %mysql.database_name, "Using db storage");
            Ok(Arc::new(DbStorage::connect(mysql)))
        }
    }
}
