//! coi-serve
//!
//! A static file server that serves a single root directory over HTTP/1.1 and
//! opts every response into cross-origin isolation (COOP/COEP/CORP headers).

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::ServeError;
