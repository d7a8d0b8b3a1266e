//! Incremental HTTP/1.x request ingestion
//!
//! This crate is the request side of an HTTP/1.x server: it turns bytes read
//! from a non-blocking socket into request records that a dispatcher can hand
//! to an application. It never blocks on I/O and never writes responses;
//! the event loop owns the socket, this crate owns the parsing state.
//!
//! # Features
//!
//! - Resumable parsing: a request may arrive across any number of reads
//! - Pipelining: requests already present in the buffer are parsed back to back
//! - In-place normalization of header names, method and path
//! - CGI-style metadata (`REQUEST_METHOD`, `PATH_INFO`, `HTTP_*`, ...)
//! - `Content-Length` bodies kept in memory or spilled to a temporary file
//! - Keep-alive tracking for HTTP/1.0 and HTTP/1.1
//! - Every rejection maps to a status code (400, 411, 413 or 500)
//!
//! # Example
//!
//! ```no_run
//! use http_ingest::config::ParserConfig;
//! use http_ingest::connection::{Connection, ParseOutcome};
//! use http_ingest::protocol::ConnectionId;
//! use tokio::io::AsyncWriteExt;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let config = ParserConfig::default().with_server("127.0.0.1", 8080).into_shared();
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     for id in 1.. {
//!         let (mut tcp_stream, peer) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let mut connection = Connection::new(config.clone(), ConnectionId::new(id), Some(peer));
//!         tokio::spawn(async move {
//!             while let Ok(Some(outcome)) = connection.read_from(&mut tcp_stream).await {
//!                 if let ParseOutcome::Error(status) = outcome {
//!                     warn!(%status, "bad request");
//!                     break;
//!                 }
//!                 while let Some(request) = connection.next_request() {
//!                     info!(path = request.environ().path_info(), "request");
//!                     let _ = tcp_stream.write_all(b"HTTP/1.1 204 No Content\r\n\r\n").await;
//!                 }
//!                 if outcome != ParseOutcome::Incomplete && !connection.keep_alive() {
//!                     break;
//!                 }
//!             }
//!             connection.reset();
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: limits and fixed metadata, shared by every connection
//! - [`connection`]: the connection driver and its request queue
//! - [`codec`]: header parsing, request assembly and body ingestion
//! - [`protocol`]: request records, metadata mapping, body storage and errors
//!
//! # Request lifecycle
//!
//! Each delivery of bytes to a [`connection::Connection`] resumes the request
//! currently being parsed. The header block is tokenized by
//! [`codec::header::HeaderDecoder`] once it is complete, then assembled into a
//! [`protocol::Request`]. A declared body is copied into a
//! [`protocol::body::BodyBuffer`], in memory below the configured threshold and
//! in a temporary file above it. The finished request is pushed onto the
//! connection's queue and the remaining buffered bytes, if any, start the
//! next request.
//!
//! # Error Handling
//!
//! [`protocol::ParseError`] covers every way a request can be rejected, and
//! [`protocol::ParseError::status_code`] gives the status to answer with. The
//! rejected request stays on the connection so the dispatcher can see it; the
//! connection parses nothing more and must be closed.
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - No chunked request bodies: `Transfer-Encoding` is rejected
//! - Only origin-form request targets
//! - Maximum header block size: 16KB by default
//! - Maximum number of headers: 64 by default

pub mod codec;
pub mod config;
pub mod connection;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
