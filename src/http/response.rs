//! HTTP response building module
//!
//! Every builder here stamps the cross-origin isolation headers before the
//! response leaves the handler, so they are present on success and error alike.

use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

use super::body::{self, ResponseBody};
use crate::error::ServeError;

pub const CROSS_ORIGIN_OPENER_POLICY: &str = "cross-origin-opener-policy";
pub const CROSS_ORIGIN_EMBEDDER_POLICY: &str = "cross-origin-embedder-policy";
pub const CROSS_ORIGIN_RESOURCE_POLICY: &str = "cross-origin-resource-policy";

/// Header name/value pairs applied to every response
pub const ISOLATION_HEADERS: [(&str, &str); 3] = [
    (CROSS_ORIGIN_OPENER_POLICY, "same-origin"),
    (CROSS_ORIGIN_EMBEDDER_POLICY, "require-corp"),
    (CROSS_ORIGIN_RESOURCE_POLICY, "same-origin"),
];

pub const ALLOWED_METHODS: &str = "GET, HEAD";

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

fn isolated(status: StatusCode) -> Builder {
    ISOLATION_HEADERS
        .iter()
        .fold(Response::builder().status(status), |builder, (name, value)| {
            builder.header(*name, *value)
        })
}

/// Build the plain-text response for a rejected request
pub fn build_error_response(err: &ServeError) -> Response<ResponseBody> {
    let message = err.public_message();
    let mut builder = isolated(err.status())
        .header(CONTENT_TYPE, PLAIN_TEXT)
        .header(CONTENT_LENGTH, message.len());

    if matches!(err, ServeError::MethodNotAllowed) {
        builder = builder.header(ALLOW, ALLOWED_METHODS);
    }

    builder
        .body(body::full(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(err.status().as_str(), &e);
            fallback(err.status())
        })
}

/// Build a 200 response for a file of `len` bytes
///
/// `body` is empty for HEAD and the file stream for GET; the headers are the same.
pub fn build_file_response(
    content_type: &'static str,
    len: u64,
    body: ResponseBody,
) -> Response<ResponseBody> {
    isolated(StatusCode::OK)
        .header(CONTENT_TYPE, HeaderValue::from_static(content_type))
        .header(CONTENT_LENGTH, len)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Last-resort response when the builder rejects a header; still isolated.
fn fallback(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = status;
    for (name, value) in ISOLATION_HEADERS {
        response
            .headers_mut()
            .insert(name, HeaderValue::from_static(value));
    }
    response
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn assert_isolated(response: &Response<ResponseBody>) {
        let headers = response.headers();
        assert_eq!(headers[CROSS_ORIGIN_OPENER_POLICY], "same-origin");
        assert_eq!(headers[CROSS_ORIGIN_EMBEDDER_POLICY], "require-corp");
        assert_eq!(headers[CROSS_ORIGIN_RESOURCE_POLICY], "same-origin");
    }

    #[tokio::test]
    async fn test_error_responses_are_isolated() {
        let cases = [
            (ServeError::MethodNotAllowed, 405, "Method Not Allowed"),
            (ServeError::BadRequest("nul byte"), 400, "Bad Request"),
            (ServeError::NotFound, 404, "Not Found"),
            (
                ServeError::Internal(std::io::Error::other("disk")),
                500,
                "Internal Server Error",
            ),
        ];

        for (err, status, message) in cases {
            let response = build_error_response(&err);
            assert_eq!(response.status().as_u16(), status);
            assert_isolated(&response);
            assert_eq!(response.headers()[CONTENT_TYPE], PLAIN_TEXT);
            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(body, message.as_bytes());
        }
    }

    #[test]
    fn test_allow_only_on_405() {
        let response = build_error_response(&ServeError::MethodNotAllowed);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");

        let response = build_error_response(&ServeError::NotFound);
        assert!(response.headers().get(ALLOW).is_none());
    }

    #[test]
    fn test_file_response_headers() {
        let response = build_file_response("image/png", 42, body::empty());
        assert_eq!(response.status(), StatusCode::OK);
        assert_isolated(&response);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[CONTENT_LENGTH], "42");
    }

    #[test]
    fn test_fallback_is_isolated() {
        let response = fallback(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_isolated(&response);
    }
}
