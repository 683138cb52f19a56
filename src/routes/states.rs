use std::sync::Arc;

use actix_web::{
    get,
    http::header::ContentType,
    web::{self},
    HttpResponse, Responder,
};
use askama::Template;
use tracing::instrument;

use crate::{
    core::AppError,
    db::{states, Storage},
    templates::StatesListTemplate,
};

/// HTML page listing every state, sorted by name.
#[instrument(name = "States List", skip(storage))]
#[get("/states_list")]
pub async fn states_list(
    storage: web::ReqData<Arc<dyn Storage>>,
) -> Result<impl Responder, AppError> {
    let states = states::fetch_states(&**storage).await.map_err(|e| {
        tracing::error!("Failed to fetch states: {:?}", e);
        AppError {
            message: Some("Failed to fetch states".to_string()),
            cause: e.cause.or(e.message),
            error_type: e.error_type,
        }
    })?;
    tracing::debug!(count = states.len(), "Rendering states list");

    let body = StatesListTemplate { states: &states }.render()?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
