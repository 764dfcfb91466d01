//! Request target resolution
//!
//! Turns a raw request target into a filesystem path under the root, or a
//! rejection. No file I/O happens here.

use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::config::DEFAULT_DOCUMENT;
use crate::error::ServeError;
use crate::logger;

const FALLBACK_BASE: &str = "http://localhost/";

/// Resolve `target` (path and query, percent-encoded) against `root`
///
/// `root` must already be canonical. The returned path equals `root` or lies
/// beneath it; anything else is reported as [`ServeError::NotFound`].
pub fn resolve_target(
    root: &Path,
    target: &str,
    host: Option<&str>,
) -> Result<PathBuf, ServeError> {
    let decoded = decode_path(target, host)?;
    let relative = with_default_document(&decoded);

    let candidate = normalize(&root.join(relative.trim_start_matches('/')));
    if !is_within_root(root, &candidate) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {target} -> {}",
            candidate.display()
        ));
        return Err(ServeError::NotFound);
    }
    Ok(candidate)
}

/// Parse the target as a URL and percent-decode its path
pub fn decode_path(target: &str, host: Option<&str>) -> Result<String, ServeError> {
    let url = base_url(host)?
        .join(target)
        .map_err(|_| ServeError::BadRequest("unparsable request target"))?;

    let raw = url.path();
    if !has_valid_escapes(raw) {
        return Err(ServeError::BadRequest("malformed percent escape"));
    }
    let decoded = urlencoding::decode(raw)
        .map_err(|_| ServeError::BadRequest("path is not valid UTF-8"))?;

    if decoded.contains('\0') {
        logger::log_warning(&format!("NUL byte in request path rejected: {target}"));
        return Err(ServeError::BadRequest("NUL byte in path"));
    }
    Ok(decoded.into_owned())
}

/// The Host header only seeds the parse base; a bogus one falls back to localhost.
fn base_url(host: Option<&str>) -> Result<Url, ServeError> {
    host.and_then(|h| Url::parse(&format!("http://{h}/")).ok())
        .map_or_else(|| Url::parse(FALLBACK_BASE), Ok)
        .map_err(|_| ServeError::BadRequest("unparsable base URL"))
}

/// Every `%` must introduce two hex digits
fn has_valid_escapes(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

fn with_default_document(path: &str) -> String {
    if path.is_empty() || path == "/" {
        DEFAULT_DOCUMENT.to_string()
    } else if path.ends_with('/') {
        format!("{path}{DEFAULT_DOCUMENT}")
    } else {
        path.to_string()
    }
}

/// Lexically resolve `.` and `..` and collapse separators
///
/// `..` never climbs above the filesystem root. Symlinks are not followed.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// True when `candidate` is `root` itself or a descendant of it
///
/// Comparison is per component, so `/srv/www-old` is not inside `/srv/www`.
pub fn is_within_root(root: &Path, candidate: &Path) -> bool {
    candidate == root || candidate.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/www")
    }

    #[test]
    fn test_default_document() {
        assert_eq!(resolve_target(&root(), "/", None).unwrap(), root().join("index.html"));
        assert_eq!(
            resolve_target(&root(), "/sub/", None).unwrap(),
            root().join("sub/index.html")
        );
        assert_eq!(
            resolve_target(&root(), "/?q=1", None).unwrap(),
            root().join("index.html")
        );
    }

    #[test]
    fn test_plain_paths() {
        assert_eq!(
            resolve_target(&root(), "/images/wK.png", None).unwrap(),
            root().join("images/wK.png")
        );
        assert_eq!(
            resolve_target(&root(), "/a//b/./c.txt", None).unwrap(),
            root().join("a/b/c.txt")
        );
        assert_eq!(
            resolve_target(&root(), "/with%20space.html", None).unwrap(),
            root().join("with space.html")
        );
    }

    #[test]
    fn test_traversal_is_not_found() {
        for target in [
            "/..%2f..%2fetc/passwd",
            "/sub/..%2f..%2f..%2fetc/passwd",
            "/%2e%2e%2f%2e%2e%2fetc/passwd",
        ] {
            assert!(
                matches!(resolve_target(&root(), target, None), Err(ServeError::NotFound)),
                "{target} should be rejected"
            );
        }
    }

    #[test]
    fn test_dot_segments_clamp_at_url_root() {
        // The URL parser resolves literal dot segments before decoding
        assert_eq!(
            resolve_target(&root(), "/../../etc/passwd", None).unwrap(),
            root().join("etc/passwd")
        );
    }

    #[test]
    fn test_parent_within_root_is_allowed() {
        assert_eq!(
            resolve_target(&root(), "/sub%2f..%2findex.html", None).unwrap(),
            root().join("index.html")
        );
    }

    #[test]
    fn test_nul_byte_is_bad_request() {
        assert!(matches!(
            resolve_target(&root(), "/index.html%00.png", None),
            Err(ServeError::BadRequest(_))
        ));
    }

    #[test]
    fn test_malformed_escapes_are_bad_request() {
        for target in ["/%zz", "/bad%2", "/%ff%fe.html"] {
            assert!(
                matches!(resolve_target(&root(), target, None), Err(ServeError::BadRequest(_))),
                "{target} should be rejected"
            );
        }
    }

    #[test]
    fn test_host_header_is_not_trusted() {
        assert_eq!(
            resolve_target(&root(), "/index.html", Some("evil host/../")).unwrap(),
            root().join("index.html")
        );
        assert_eq!(
            resolve_target(&root(), "/index.html", Some("example.com:8080")).unwrap(),
            root().join("index.html")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("/a//b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_is_within_root() {
        assert!(is_within_root(&root(), &root()));
        assert!(is_within_root(&root(), Path::new("/srv/www/a.html")));
        assert!(!is_within_root(&root(), Path::new("/srv/www-old/a.html")));
        assert!(!is_within_root(&root(), Path::new("/srv")));
    }
}
