use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::core::{AppError, AppErrorType};
use crate::db::{Storage, StorageBackend};
use crate::models::states::{State, STATE_CLASS};

type Objects = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed object store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Object {key} is not a valid {class}: {source}")]
    InvalidObject {
        key: String,
        class: &'static str,
        source: serde_json::Error,
    },
}

impl From<FileStorageError> for AppError {
    fn from(error: FileStorageError) -> Self {
        let error_type = match error {
            FileStorageError::Read { .. } => AppErrorType::StorageError,
            FileStorageError::Parse { .. } | FileStorageError::InvalidObject { .. } => {
                AppErrorType::JsonParseError
            }
        };
        AppError {
            message: Some("Failed to load stored objects".to_string()),
            cause: Some(error.to_string()),
            error_type,
        }
    }
}

/// JSON document store mapping `<Class>.<id>` to the serialized object.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StorageBackend for FileStorage {
    fn open_session(&self) -> Arc<dyn Storage> {
        Arc::new(FileSession::new(self.path.clone()))
    }
}

/// The document as one request sees it. Read on first use and dropped on
/// `close`, so the next read goes back to disk.
pub struct FileSession {
    path: PathBuf,
    objects: Mutex<Option<Objects>>,
}

impl FileSession {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            objects: Mutex::new(None),
        }
    }

    async fn reload(&self) -> Result<Objects, FileStorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No object store on disk yet");
                return Ok(Objects::new());
            }
            Err(source) => {
                return Err(FileStorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(Objects::new());
        }

        serde_json::from_str(&contents).map_err(|source| FileStorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

fn is_state(value: &Value) -> bool {
    value.get("__class__").and_then(Value::as_str) == Some(STATE_CLASS)
}

#[async_trait]
impl Storage for FileSession {
    async fn all_states(&self) -> Result<IndexMap<String, State>, AppError> {
        let mut objects = self.objects.lock().await;
        if objects.is_none() {
            *objects = Some(self.reload().await?);
        }

        let mut states = IndexMap::new();
        for (key, value) in objects.iter().flatten().filter(|(_, v)| is_state(v)) {
            let state: State = serde_json::from_value(value.clone()).map_err(|source| {
                FileStorageError::InvalidObject {
                    key: key.clone(),
                    class: STATE_CLASS,
                    source,
                }
            })?;
            states.insert(key.clone(), state);
        }

        Ok(states)
    }

    async fn close(&self) -> Result<(), AppError> {
        self.objects.lock().await.take();
        Ok(())
    }
}
