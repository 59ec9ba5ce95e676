use actix_web::{HttpResponse, Responder};
use anyhow::Result;
use serde_json::json;
use tracker_macros::route;

#[route("/api", method = "GET")]
pub(crate) async fn api() -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(json!({
        "app": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION")
    })))
}
