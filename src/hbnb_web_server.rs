use crate::core::{AppConfig, StorageTeardown};
use crate::db::{open_storage, StorageBackend};
use crate::routes::hbnb_routes;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{dev::Server, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct HbnbWebServer {
    port: u16,
    server: Server,
}

impl HbnbWebServer {
    pub async fn build(configuration: AppConfig) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.server.host, configuration.server.port
        );

        let storage = open_storage(&configuration)?;

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, storage).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn run(
    listener: TcpListener,
    storage: Arc<dyn StorageBackend>,
) -> Result<Server, anyhow::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .configure(hbnb_routes)
            .wrap(StorageTeardown::new(storage.clone()))
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(TracingLogger::default())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
