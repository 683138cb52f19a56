use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hbnb_web::core::{get_subscriber, init_subscriber, AppError};
use hbnb_web::db::{Storage, StorageBackend};
use hbnb_web::hbnb_web_server::run;
use hbnb_web::models::states::State;
use indexmap::IndexMap;
use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// In-memory storage. Every session reads the same states and bumps the
/// shared close counter.
#[derive(Default)]
pub struct FakeStorage {
    states: Vec<State>,
    fail_reads: bool,
    fail_close: bool,
    close_calls: AtomicUsize,
}

impl FakeStorage {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            states: names.iter().map(|name| State::new(*name)).collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn failing_close(names: &[&str]) -> Self {
        Self {
            fail_close: true,
            ..Self::with_names(names)
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.states.iter().map(|state| state.id.clone()).collect()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

pub struct FakeBackend(Arc<FakeStorage>);

impl StorageBackend for FakeBackend {
    fn open_session(&self) -> Arc<dyn Storage> {
        Arc::new(FakeSession(self.0.clone()))
    }
}

struct FakeSession(Arc<FakeStorage>);

#[async_trait]
impl Storage for FakeSession {
    async fn all_states(&self) -> Result<IndexMap<String, State>, AppError> {
        if self.0.fail_reads {
            return Err(AppError::storage_error("storage is down"));
        }
        Ok(self
            .0
            .states
            .iter()
            .map(|state| (state.storage_key(), state.clone()))
            .collect())
    }

    async fn close(&self) -> Result<(), AppError> {
        self.0.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_close {
            return Err(AppError::storage_error("close failed"));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub storage: Arc<FakeStorage>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_app(storage: FakeStorage) -> TestApp {
    Lazy::force(&TRACING);

    let storage = Arc::new(storage);
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().expect("Failed to read local address").port();

    let server = run(listener, Arc::new(FakeBackend(storage.clone())))
        .await
        .expect("Failed to build the server");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        storage,
        api_client: reqwest::Client::new(),
    }
}

/// State names in the order the page lists them.
pub fn rendered_names(html: &str) -> Vec<String> {
    html.split("<B>")
        .skip(1)
        .filter_map(|chunk| chunk.split_once("</B>"))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// State ids in the order the page lists them.
pub fn rendered_ids(html: &str) -> Vec<String> {
    html.split("<LI>")
        .skip(1)
        .filter_map(|chunk| chunk.split_once(": <B>"))
        .map(|(id, _)| id.to_string())
        .collect()
}
