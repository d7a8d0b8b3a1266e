//! Request head processing.
//!
//! # Components
//!
//! - [`HeaderDecoder`]: the header parser. Tokenizes the request line and
//!   header block into byte ranges ([`RequestHead`], [`HeaderIndex`]) and tells
//!   incomplete input apart from malformed input
//! - `assembler`: applies protocol rules to those ranges and fills in the
//!   request record: header name normalization, `Content-Length`, keep-alive,
//!   request target checks and method recognition
//! - `target`: in-place percent-decoding of the path and query extraction
//!
//! # Limits
//!
//! - Maximum number of headers: 64 by default, see
//!   [`ParserConfig::with_max_headers`](crate::config::ParserConfig::with_max_headers)
//! - Maximum header block size: 16KB by default
//! - Maximum request target length: 8KB by default

mod assembler;
mod header_decoder;
mod target;

pub(crate) use assembler::assemble;
pub use header_decoder::HeaderDecoder;
pub use header_decoder::HeaderIndex;
pub use header_decoder::RequestHead;
