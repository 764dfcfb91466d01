//! Static file serving module
//!
//! Stats a resolved path and answers with its headers, plus a streamed body for GET.

use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::ServeError;
use crate::http::{self, body, mime, ResponseBody};
use crate::logger;

/// Read buffer size for streamed bodies
const CHUNK_SIZE: usize = 64 * 1024;

/// Serve the regular file at `path`, which must already be bound-checked
///
/// Directories and anything that fails to stat are reported as not found.
/// The file handle lives inside the body stream and is closed when the body is
/// dropped, whether it finished, failed, or the client went away.
pub async fn serve_file(
    path: &Path,
    is_head: bool,
) -> Result<Response<ResponseBody>, ServeError> {
    let metadata = fs::metadata(path).await.map_err(|_| ServeError::NotFound)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let content_type = mime::content_type_for(path);
    if is_head {
        return Ok(http::build_file_response(
            content_type,
            metadata.len(),
            body::empty(),
        ));
    }

    let file = open_for_streaming(path, File::open(path)).await?;
    Ok(http::build_file_response(
        content_type,
        metadata.len(),
        file_body(file, path.to_path_buf()),
    ))
}

/// Await an open that follows a successful stat; failure here is a 500
async fn open_for_streaming<R, F>(path: &Path, open: F) -> Result<R, ServeError>
where
    F: Future<Output = io::Result<R>>,
{
    open.await.map_err(|e| {
        logger::log_error(&format!("Failed to open '{}': {e}", path.display()));
        ServeError::Internal(e)
    })
}

/// Stream `reader` in chunks; a read error ends the body and aborts the connection
fn file_body<R>(reader: R, path: PathBuf) -> ResponseBody
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, CHUNK_SIZE)
        .inspect_err(move |e| {
            logger::log_error(&format!(
                "Read failed mid-stream for '{}': {e}",
                path.display()
            ));
        })
        .map_ok(Frame::data);

    StreamBody::new(stream).boxed_unsync()
}
