//! HTTP codec module for decoding requests
//!
//! This module turns the bytes of a connection's read buffer into request
//! records. It uses a state machine per request: the header block is parsed
//! first, then the body, if one was declared, is moved into its storage.
//!
//! # Architecture
//!
//! - [`RequestDecoder`]: decodes complete requests, implementing
//!   [`tokio_util::codec::Decoder`]
//! - Header parsing via the [`header`] module
//! - Body ingestion via the [`body`] module
//!
//! # Features
//!
//! - Resumes parsing across reads without re-copying buffered bytes
//! - Zero-copy tokenizing; names, path and method are normalized in place
//! - Content-Length based bodies, kept in memory or spilled to disk
//! - Leaves pipelined bytes untouched for the next request

pub mod body;
pub mod header;
mod request_decoder;

pub use request_decoder::RequestDecoder;
