use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use anyhow::Error as AnyhowError;
use log::error;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Message sent to the client for every error that is not a [HttpError][TrackerErrors::HttpError].
/// The actual cause only ends up in the log.
pub(crate) const INTERNAL_ERROR: &str = "internal error";

#[derive(Error, Debug)]
pub(crate) enum TrackerErrors {
    #[error("{1}")]
    HttpError(u16, String)
}

/// Error type of all route handlers, created from the `anyhow::Error` returned by the handler body.
pub(crate) struct TrackerError {
    error: AnyhowError
}

impl TrackerError {
    fn http_error(&self) -> Option<(u16, &str)> {
        self.error.downcast_ref::<TrackerErrors>().map(|err| match err {
            TrackerErrors::HttpError(status, message) => (*status, message.as_str())
        })
    }
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.error)
    }
}

impl Debug for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:?}", self.error)
    }
}

impl Serialize for TrackerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
    {
        let message = self.http_error().map_or(INTERNAL_ERROR, |(_, message)| message);

        let mut state = serializer.serialize_struct("TrackerError", 1)?;
        state.serialize_field("error", message)?;
        state.end()
    }
}

impl From<AnyhowError> for TrackerError {
    fn from(error: AnyhowError) -> Self {
        TrackerError { error }
    }
}

impl ResponseError for TrackerError {
    fn status_code(&self) -> StatusCode {
        match self.http_error() {
            // A programmer passed a invalid status code
            Some((status, _)) => StatusCode::from_u16(status).unwrap_or(StatusCode::IM_A_TEAPOT),
            None => StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!("Error occurred while handling route: {:#}", self.error);
        }

        HttpResponse::build(status_code).json(self)
    }
}

/// Creates a [HttpError][TrackerErrors::HttpError] wrapped in `anyhow::Error` without returning it.
///
/// ```ignore
/// let id = maybe_id.ok_or_else(|| err!(BAD_REQUEST, "Missing id"))?;
/// ```
#[macro_export]
macro_rules! err {
    ($status:ident, $message:expr) => {
        anyhow::Error::from($crate::error::TrackerErrors::HttpError(actix_web::http::StatusCode::$status.as_u16(), ($message).to_string()))
    };
}

/// Returns early from the current function with a [HttpError][TrackerErrors::HttpError].
#[macro_export]
macro_rules! die {
    ($status:ident, $message:expr) => {
        return Err($crate::err!($status, $message))
    };
}
