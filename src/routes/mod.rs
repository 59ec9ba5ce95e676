use std::future::Future;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN};
use actix_web::web::ServiceConfig;
use actix_web::Error;

mod api;
mod issues;
pub(crate) mod not_found;

pub(crate) fn init(config: &mut ServiceConfig) {
    config.service(api::api);

    config.service(issues::list_issues);
    config.service(issues::create_issue);
    config.service(issues::update_issue);
    config.service(issues::delete_issue);
}

/// Middleware for `App::wrap_fn`: allows any origin on every response below `/api`, including errors.
pub(crate) fn allow_any_origin<S, B>(request: ServiceRequest, service: &S) -> impl Future<Output = Result<ServiceResponse<B>, Error>>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody,
{
    let fut = service.call(request);

    async move {
        let mut response = fut.await?;

        if response.request().path().starts_with("/api") {
            response.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }

        Ok(response)
    }
}
