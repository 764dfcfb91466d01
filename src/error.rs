use hyper::StatusCode;
use thiserror::Error;

/// Reasons a request is answered without file contents.
///
/// The `Display` output is for logs only. Clients see [`ServeError::public_message`],
/// which never carries paths or OS error text.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Method other than GET or HEAD
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Request target could not be parsed, decoded, or carried a NUL byte
    #[error("bad request: {0}")]
    BadRequest(&'static str),

    /// Missing file, non-regular file, or a path outside the root
    #[error("not found")]
    NotFound,

    /// I/O failure before any response byte was sent
    #[error("I/O error: {0}")]
    Internal(#[from] std::io::Error),
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body sent to the client
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::BadRequest(_) => "Bad Request",
            Self::NotFound => "Not Found",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}
