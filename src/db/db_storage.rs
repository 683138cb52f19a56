use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::{MySql, MySqlPool};
use tokio::sync::Mutex;

use crate::core::config::MySqlConfig;
use crate::core::AppError;
use crate::db::{Storage, StorageBackend};
use crate::models::states::State;

const ALL_STATES: &str = "SELECT id, created_at, updated_at, name FROM states ORDER BY id";

/// MySQL backed storage. Each session borrows its own pooled connection.
pub struct DbStorage {
    pool: MySqlPool,
}

impl DbStorage {
    pub fn connect(config: &MySqlConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(config.connect());

        Self::with_pool(pool)
    }

    pub fn with_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl StorageBackend for DbStorage {
    fn open_session(&self) -> Arc<dyn Storage> {
        Arc::new(DbSession::new(self.pool.clone()))
    }
}

/// A connection taken from the pool on first use and handed back on `close`.
pub struct DbSession {
    pool: MySqlPool,
    conn: Mutex<Option<PoolConnection<MySql>>>,
}

impl DbSession {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            conn: Mutex::new(None),
        }
    }

    pub async fn is_open(&self) -> bool {
        self.conn.lock().await.is_some()
    }
}

#[async_trait]
impl Storage for DbSession {
    async fn all_states(&self) -> Result<IndexMap<String, State>, AppError> {
        let mut conn = self.conn.lock().await;
        if conn.is_none() {
            *conn = Some(self.pool.acquire().await?);
        }
        let conn = conn
            .as_mut()
            .ok_or_else(|| AppError::internal_error("Storage session is not open"))?;

        let states = sqlx::query_as::<_, State>(ALL_STATES)
            .fetch_all(&mut **conn)
            .await?;

        Ok(states
            .into_iter()
            .map(|state| (state.storage_key(), state))
            .collect())
    }

    async fn close(&self) -> Result<(), AppError> {
        if self.conn.lock().await.take().is_some() {
            tracing::debug!("Released storage session");
        }
        Ok(())
    }
}
