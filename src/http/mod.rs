//! HTTP protocol layer module
//!
//! Body types, MIME detection, and response builders, decoupled from request handling.

pub mod body;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use response::{build_error_response, build_file_response, ISOLATION_HEADERS};
