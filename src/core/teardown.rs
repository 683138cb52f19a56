//! Request teardown: every request gets its own storage session, released
//! once the response is built or the request is dropped.

use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;

use crate::db::{Storage, StorageBackend};

/// Middleware that opens a session per request, stores it in the request
/// extensions, and calls [`Storage::close`] on it exactly once afterwards,
/// whether the handler succeeded, failed, no route matched, or the client
/// went away.
#[derive(Clone)]
pub struct StorageTeardown {
    backend: Arc<dyn StorageBackend>,
}

impl StorageTeardown {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

impl<S, B> Transform<S, ServiceRequest> for StorageTeardown
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = StorageTeardownMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StorageTeardownMiddleware {
            service,
            backend: self.backend.clone(),
        }))
    }
}

pub struct StorageTeardownMiddleware<S> {
    service: S,
    backend: Arc<dyn StorageBackend>,
}

impl<S, B> Service<ServiceRequest> for StorageTeardownMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = self.backend.open_session();
        req.extensions_mut().insert(session.clone());
        let guard = SessionGuard {
            session: Some(session),
        };
        let fut = self.service.call(req);

        Box::pin(async move {
            let outcome = fut.await;
            let error = match &outcome {
                Ok(res) => res.response().error(),
                Err(e) => Some(e),
            };
            guard.release(error).await;
            outcome
        })
    }
}

/// Owns the request's session until it has been closed. Dropped while still
/// holding it, the close runs on the worker in the background.
struct SessionGuard {
    session: Option<Arc<dyn Storage>>,
}

impl SessionGuard {
    async fn release(mut self, error: Option<&Error>) {
        if let Some(session) = self.session.take() {
            teardown_storage(session.as_ref(), error).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Request dropped before completion");
            actix_web::rt::spawn(async move {
                teardown_storage(session.as_ref(), None).await;
            });
        }
    }
}

/// Closes the storage session. `error` is what the request ended with, if
/// anything; it is logged but never changes what happens.
pub async fn teardown_storage(storage: &dyn Storage, error: Option<&Error>) {
    if let Some(e) = error {
        tracing::debug!(error.message = %e, "Tearing down after failed request");
    }

    if let Err(e) = storage.close().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to close storage"
        );
    }
}
