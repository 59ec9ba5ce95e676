use crate::fields::Fields;
use crate::filter::Filter;
use crate::prelude::HttpRequestExtensions;
use crate::service::{IssueService, Reply};

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use anyhow::Result;
use log::debug;
use serde::Deserialize;
use tracker_macros::route;

#[derive(Deserialize)]
pub(crate) struct ProjectRequest {
    pub(crate) project: String,
}

#[route("/api/issues/{project}", method = "GET")]
pub(crate) async fn list_issues(uri: web::Path<ProjectRequest>, request: HttpRequest, service: web::Data<IssueService>) -> Result<impl Responder> {
    let filter = Filter::from_query(&request.q_string());
    let issues = service.list(&uri.project, &filter).await?;

    Ok(HttpResponse::Ok().json(issues))
}

#[route("/api/issues/{project}", method = "POST")]
pub(crate) async fn create_issue(uri: web::Path<ProjectRequest>, request: HttpRequest, body: web::Bytes, service: web::Data<IssueService>) -> Result<impl Responder> {
    let fields = Fields::parse(request.get_header(CONTENT_TYPE), &body)?;
    let reply = service.create(&uri.project, &fields).await?;

    Ok(reply_with(reply))
}

// Updates and deletes address issues by id only, the project in the path is not checked
#[route("/api/issues/{project}", method = "PUT")]
pub(crate) async fn update_issue(request: HttpRequest, body: web::Bytes, service: web::Data<IssueService>) -> Result<impl Responder> {
    let fields = Fields::parse(request.get_header(CONTENT_TYPE), &body)?;
    let reply = service.update(fields).await?;

    Ok(reply_with(reply))
}

#[route("/api/issues/{project}", method = "DELETE")]
pub(crate) async fn delete_issue(request: HttpRequest, body: web::Bytes, service: web::Data<IssueService>) -> Result<impl Responder> {
    let fields = Fields::parse(request.get_header(CONTENT_TYPE), &body)?;
    let reply = service.delete(&fields).await?;

    Ok(reply_with(reply))
}

/// Validation failures are sent with status 200 as well, only the payload differs
fn reply_with(reply: Reply) -> HttpResponse {
    if reply.is_failure() {
        debug!("Rejected issue request: {:?}", &reply);
    }

    HttpResponse::Ok().json(reply)
}
