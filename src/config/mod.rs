// Configuration module entry point
// Loads startup configuration from the environment and resolves the root directory

mod state;
mod types;

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ::config::{ConfigError, Environment};

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, ServerConfig};

/// File served for `/` and any path ending in `/`
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Prefix for nested settings, e.g. `SERVE_SERVER__ROOT` or `SERVE_LOGGING__ACCESS_LOG`
pub const ENV_PREFIX: &str = "SERVE";

/// Unprefixed variable carrying the listening port
pub const PORT_VAR: &str = "PORT";

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let port = std::env::var(PORT_VAR).ok();
        Self::load_from(Environment::with_prefix(ENV_PREFIX), port.as_deref())
    }

    /// Load configuration from an explicit environment source and `PORT` value
    pub fn load_from(env: Environment, port: Option<&str>) -> Result<Self, ConfigError> {
        let port = parse_port(port)?;

        let settings = ::config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .set_override_option("server.port", port.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Resolve the root directory to a canonical absolute path
    ///
    /// Falls back to the directory holding the running executable.
    pub fn resolve_root(&self) -> io::Result<PathBuf> {
        let root = match &self.server.root {
            Some(root) => root.clone(),
            None => {
                let exe = std::env::current_exe()?;
                exe.parent().map(PathBuf::from).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory")
                })?
            }
        };

        let root = root.canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("root is not a directory: {}", root.display()),
            ));
        }
        Ok(root)
    }
}

/// True when `root` holds the document served for `/`
pub fn has_default_document(root: &Path) -> bool {
    root.join(DEFAULT_DOCUMENT).is_file()
}

fn parse_port(port: Option<&str>) -> Result<Option<u16>, ConfigError> {
    match port.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u16>()
            .map(Some)
            .map_err(|e| ConfigError::Message(format!("Invalid {PORT_VAR} value '{value}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from(env_with(&[]), None).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.server.root.is_none());
        assert!(cfg.server.workers.is_none());
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_port_override() {
        let cfg = Config::load_from(env_with(&[]), Some("9090")).unwrap();
        assert_eq!(cfg.server.port, 9090);

        let cfg = Config::load_from(env_with(&[]), Some("")).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        assert!(Config::load_from(env_with(&[]), Some("http")).is_err());
        assert!(Config::load_from(env_with(&[]), Some("70000")).is_err());
    }

    #[test]
    fn test_prefixed_settings() {
        let cfg = Config::load_from(
            env_with(&[
                ("SERVE_SERVER__HOST", "127.0.0.1"),
                ("SERVE_SERVER__WORKERS", "2"),
                ("SERVE_SERVER__ROOT", "/srv/www"),
                ("SERVE_LOGGING__ACCESS_LOG", "false"),
                ("SERVE_LOGGING__ACCESS_LOG_FORMAT", "json"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.server.root, Some(PathBuf::from("/srv/www")));
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "json");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 3000;
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 3000);

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_resolve_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.server.root = Some(dir.path().to_path_buf());
        assert_eq!(cfg.resolve_root().unwrap(), dir.path().canonicalize().unwrap());

        cfg.server.root = Some(dir.path().join("missing"));
        assert!(cfg.resolve_root().is_err());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        cfg.server.root = Some(file);
        assert!(cfg.resolve_root().is_err());
    }

    #[test]
    fn test_has_default_document() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_default_document(dir.path()));

        std::fs::create_dir(dir.path().join(DEFAULT_DOCUMENT)).unwrap();
        assert!(!has_default_document(dir.path()));

        let other = tempfile::tempdir().unwrap();
        std::fs::write(other.path().join(DEFAULT_DOCUMENT), "<h1>board</h1>").unwrap();
        assert!(has_default_document(other.path()));
    }

    #[test]
    fn test_shipped_assets_have_default_document() {
        let public = Path::new(env!("CARGO_MANIFEST_DIR")).join("public");
        assert!(has_default_document(&public));
    }
}
