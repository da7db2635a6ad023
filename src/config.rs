use std::net::SocketAddr;
use std::path::PathBuf;

/// Process-wide configuration, assembled once at startup and passed into
/// constructors. Lifecycle is the process lifetime; nothing here mutates
/// at runtime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Secret guarding the administrative endpoints.
    pub admin_secret: String,
    /// String served from `/version`.
    pub version: String,
    /// SQLite database file for volume metadata; in-memory if unset.
    pub sqlite_path: Option<PathBuf>,
    /// Root directory for stored blobs.
    pub blobs_dir: PathBuf,
    /// Log level for http tracing.
    pub log_level: tracing::Level,
}
