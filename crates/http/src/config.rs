//! Parser configuration.
//!
//! A [`ParserConfig`] is built once at process start and shared by every
//! connection through a [`triomphe::Arc`]. Nothing in the ingestion core mutates
//! it afterwards.
//!
//! ```
//! use http_ingest::config::ParserConfig;
//!
//! let config = ParserConfig::default()
//!     .with_max_content_length(64 * 1024 * 1024)
//!     .with_body_buffer_size(256 * 1024)
//!     .with_server("example.org", 8080)
//!     .into_shared();
//!
//! assert_eq!(config.server_port(), 8080);
//! ```

use std::path::{Path, PathBuf};

use triomphe::Arc;

/// Default ceiling for a single request body.
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 8 * 1024 * 1024;

/// Default size above which a body is written to a temporary file.
pub const DEFAULT_BODY_BUFFER_SIZE: u64 = 512 * 1024;

/// Default maximum number of header fields in one request.
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Default maximum size of the request line plus header block, the size class
/// of a connection's read buffer.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 16 * 1024;

/// Default maximum length of the request target.
pub const DEFAULT_MAX_URI_LEN: usize = 8 * 1024;

/// Limits and fixed metadata consumed by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    max_content_length: u64,
    body_buffer_size: u64,
    server_name: String,
    server_port: u16,
    max_headers: usize,
    max_header_bytes: usize,
    max_uri_len: usize,
    require_content_length: bool,
    temp_dir: PathBuf,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            body_buffer_size: DEFAULT_BODY_BUFFER_SIZE,
            server_name: "0.0.0.0".to_owned(),
            server_port: 8000,
            max_headers: DEFAULT_MAX_HEADERS,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_uri_len: DEFAULT_MAX_URI_LEN,
            require_content_length: false,
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl ParserConfig {
    /// Sets the largest body, in bytes, a request may declare or send.
    #[must_use]
    pub fn with_max_content_length(mut self, max_content_length: u64) -> Self {
        self.max_content_length = max_content_length;
        self
    }

    /// Sets the in-memory threshold. Bodies declaring more bytes than this are
    /// spilled to a temporary file.
    #[must_use]
    pub fn with_body_buffer_size(mut self, body_buffer_size: u64) -> Self {
        self.body_buffer_size = body_buffer_size;
        self
    }

    /// Sets the server name and port reported in every request's metadata.
    #[must_use]
    pub fn with_server(mut self, name: impl Into<String>, port: u16) -> Self {
        self.server_name = name.into();
        self.server_port = port;
        self
    }

    #[must_use]
    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn with_max_uri_len(mut self, max_uri_len: usize) -> Self {
        self.max_uri_len = max_uri_len;
        self
    }

    /// When enabled, `POST`, `PUT` and `PATCH` requests without a
    /// `Content-Length` header are rejected with `411 Length Required`.
    /// Disabled by default: such requests are treated as having an empty body.
    #[must_use]
    pub fn with_require_content_length(mut self, require: bool) -> Self {
        self.require_content_length = require;
        self
    }

    /// Sets the directory large bodies are spilled into.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Freezes the configuration so it can be shared between connections.
    pub fn into_shared(self) -> Arc<ParserConfig> {
        Arc::new(self)
    }

    pub fn max_content_length(&self) -> u64 {
        self.max_content_length
    }

    pub fn body_buffer_size(&self) -> u64 {
        self.body_buffer_size
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn max_headers(&self) -> usize {
        self.max_headers
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn max_uri_len(&self) -> usize {
        self.max_uri_len
    }

    pub fn require_content_length(&self) -> bool {
        self.require_content_length
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_content_length(), DEFAULT_MAX_CONTENT_LENGTH);
        assert_eq!(config.body_buffer_size(), DEFAULT_BODY_BUFFER_SIZE);
        assert_eq!(config.max_headers(), 64);
        assert_eq!(config.max_header_bytes(), 16 * 1024);
        assert_eq!(config.server_name(), "0.0.0.0");
        assert_eq!(config.server_port(), 8000);
        assert!(!config.require_content_length());
    }

    #[test]
    fn builder_overrides() {
        let config = ParserConfig::default()
            .with_max_content_length(100)
            .with_body_buffer_size(10)
            .with_server("localhost", 9000)
            .with_require_content_length(true)
            .with_temp_dir("/var/tmp")
            .into_shared();

        assert_eq!(config.max_content_length(), 100);
        assert_eq!(config.body_buffer_size(), 10);
        assert_eq!(config.server_name(), "localhost");
        assert_eq!(config.server_port(), 9000);
        assert!(config.require_content_length());
        assert_eq!(config.temp_dir(), Path::new("/var/tmp"));
    }
}
