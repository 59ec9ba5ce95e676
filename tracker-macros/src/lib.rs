use crate::route::route as internal_route;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

mod route;

/// Creates a resource handler whose body returns `anyhow::Result`.
/// This macro is a thin layer over the actix_web method `actix_web::route`
///
/// # Syntax
///
/// ```text
/// #[route("path", method = "HTTP_METHOD"[, attributes])]
/// ```
///
/// All attributes are forwarded to `actix_web::route` as-is.
///
/// # Differences
///
/// 1. The handler body returns `anyhow::Result`, errors are converted into `crate::error::TrackerError`
///    which decides about the status code and json body
/// 2. `#[instrument(skip_all)]` from the tracing library is attached with the handler name as span name
#[proc_macro_attribute]
#[proc_macro_error]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
    internal_route(args, input)
}
