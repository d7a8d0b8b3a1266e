//! Connection driver module
//!
//! This module owns the per-socket state of the ingestion core: the read
//! buffer, the request currently being parsed and the queue of completed
//! requests waiting for the dispatcher.
//!
//! # Components
//!
//! - [`Connection`]: accepts newly read bytes, resumes parsing where the last
//!   read stopped and parses pipelined requests back to back
//! - [`ParseOutcome`]: what a delivery of bytes produced
//! - [`RequestQueue`]: FIFO of completed requests
//!
//! # Features
//!
//! - Never blocks: parsing only consumes bytes that were already delivered
//! - Keep-alive tracking from the last completed request
//! - Any rejected request aborts pipelining and poisons the connection
//! - Teardown releases every request and its body storage, temp files included

mod http_connection;
mod request_queue;

pub use http_connection::Connection;
pub use http_connection::ParseOutcome;
pub use request_queue::RequestQueue;
