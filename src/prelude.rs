use actix_web::HttpRequest;
use qstring::QString;

pub(crate) trait HttpRequestExtensions {
    /// Gets a specific header from the current request.
    ///
    /// If the requested header does not exist in the current request or is not valid utf-8, returns `None`.
    /// This method does not allocate but instead returns a `&str`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// # let request = actix_web::test::TestRequest::default().insert_header(("content-type", "text/plain")).to_http_request();
    ///
    /// use crate::prelude::*;
    ///
    /// let content_type = request.get_header("content-type");
    /// assert_eq!(content_type, Some("text/plain"));
    /// ```
    fn get_header<S: AsRef<str>>(&self, header: S) -> Option<&str>;

    /// Gets a [QString](qstring::QString) built from the query string of the current request.
    ///
    /// It is guaranteed to not fail or panic. If no query string was sent with the request,
    /// a empty QString struct is returned. `+` is decoded as space like in url encoded forms.
    /// This method will always allocate.
    fn q_string(&self) -> QString;
}

impl HttpRequestExtensions for HttpRequest {
    fn get_header<S: AsRef<str>>(&self, header: S) -> Option<&str> {
        self.headers().get(header.as_ref())?.to_str().ok()
    }

    fn q_string(&self) -> QString {
        QString::from(self.query_string().replace('+', "%20").as_str())
    }
}
