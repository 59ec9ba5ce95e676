use actix_web::{HttpRequest, HttpResponse};
use log::debug;
use serde_json::json;
use tracing::instrument;

#[instrument(skip_all)]
pub(crate) async fn default_handler(request: HttpRequest) -> HttpResponse {
    debug!("Got request for non-existent resource: {} {}", request.method(), request.path());

    HttpResponse::NotFound().json(json!({
        "error": "Not found"
    }))
}
