//! HTTP request decoder module
//!
//! Drives one request at a time through its two phases, header parsing and
//! body ingestion, over a read buffer that may be filled across many reads.
//!
//! # Components
//!
//! - [`RequestDecoder`]: coordinates header and body parsing and owns the
//!   request currently being read
//! - Header parsing: [`HeaderDecoder`] plus the request assembler
//! - Body handling: [`BodyDecoder`]
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http_ingest::codec::RequestDecoder;
//! use http_ingest::config::ParserConfig;
//! use http_ingest::protocol::ConnectionId;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new(ParserConfig::default().into_shared(), ConnectionId::new(1), None);
//! let mut buffer = BytesMut::from(&b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//!
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.environ().path_info(), Some("/index.html"));
//! assert!(buffer.is_empty());
//! ```

use std::net::SocketAddr;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{trace, warn};
use triomphe::Arc;

use crate::codec::body::BodyDecoder;
use crate::codec::header::{HeaderDecoder, assemble};
use crate::config::ParserConfig;
use crate::protocol::environ::keys;
use crate::protocol::{ConnectionId, Environ, ParseError, Request};

/// A decoder for HTTP requests that handles both headers and body.
///
/// # State Machine
///
/// - no request being read: waiting for the first byte of a new request
/// - `body_decoder` is `None`: parsing the header block
/// - `body_decoder` is `Some`: ingesting the body
///
/// A decoded request is returned as soon as its last body byte is consumed.
/// Bytes after it stay in the buffer for the next call. Once a request has
/// been rejected the decoder stops consuming input.
#[derive(Debug)]
pub struct RequestDecoder {
    config: Arc<ParserConfig>,
    connection: ConnectionId,
    base_environ: Environ,
    header_decoder: HeaderDecoder,
    body_decoder: Option<BodyDecoder>,
    reading: Option<Request>,
}

impl RequestDecoder {
    /// Creates a decoder for the connection `connection`, whose peer is
    /// `peer` when known.
    pub fn new(config: Arc<ParserConfig>, connection: ConnectionId, peer: Option<SocketAddr>) -> Self {
        let base_environ = base_environ(&config, peer);
        Self { config, connection, base_environ, header_decoder: HeaderDecoder::new(), body_decoder: None, reading: None }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The request currently being read, if any. After an error this is the
    /// rejected request, carrying its status code.
    pub fn reading_request(&self) -> Option<&Request> {
        self.reading.as_ref()
    }

    /// Whether the header block of the current request has been parsed.
    pub fn is_header_complete(&self) -> bool {
        self.body_decoder.is_some()
    }

    /// Whether a request was rejected. The decoder is unusable until reset.
    pub fn is_failed(&self) -> bool {
        self.reading.as_ref().is_some_and(Request::is_bad_request)
    }

    /// Drops the request being read, along with its body storage.
    pub fn reset(&mut self) {
        self.reading = None;
        self.body_decoder = None;
        self.header_decoder.reset();
    }

    fn decode_request(&mut self, src: &mut BytesMut) -> Result<Option<Request>, ParseError> {
        let Self { config, connection, base_environ, header_decoder, body_decoder, reading } = self;

        if reading.is_none() {
            if src.is_empty() {
                return Ok(None);
            }
            trace!(connection = %connection, "begin request");
            header_decoder.reset();
            *reading = Some(Request::new(*connection, base_environ.clone()));
        }
        let Some(request) = reading.as_mut() else {
            return Ok(None);
        };

        if body_decoder.is_none() {
            let Some(head) = header_decoder.decode(src, config)? else {
                return Ok(None);
            };

            assemble(config, &head, &mut src[..head.body_offset()], request)?;
            src.advance(head.body_offset());
            *body_decoder = Some(BodyDecoder::new(request.body_length()));
        }

        let complete = match body_decoder {
            Some(body) => body.decode(request, src, config)?,
            None => false,
        };

        if complete {
            body_decoder.take();
            return Ok(reading.take());
        }
        Ok(None)
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode one complete request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: a request, including its whole body, was decoded
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the request was rejected; its status code is recorded on
    ///   [`RequestDecoder::reading_request`]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.is_failed() {
            return Ok(None);
        }

        self.decode_request(src).inspect_err(|e| {
            let status = e.status_code();
            warn!(connection = %self.connection, status = status.as_u16(), cause = %e, "rejecting request");
            if let Some(request) = self.reading.as_mut() {
                request.set_bad_request(status);
            }
        })
    }
}

/// The metadata every request on a connection starts with.
fn base_environ(config: &ParserConfig, peer: Option<SocketAddr>) -> Environ {
    let mut environ = Environ::with_capacity(24);
    environ.insert(keys::SCRIPT_NAME, "");
    environ.insert(keys::SERVER_NAME, config.server_name().to_owned());
    environ.insert(keys::SERVER_PORT, config.server_port().to_string());
    if let Some(peer) = peer {
        environ.insert(keys::REMOTE_ADDR, peer.ip().to_string());
        environ.insert(keys::REMOTE_PORT, peer.port().to_string());
    }
    environ
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::body::BodyKind;
    use http::StatusCode;
    use indoc::indoc;

    fn decoder(config: ParserConfig) -> RequestDecoder {
        RequestDecoder::new(config.into_shared(), ConnectionId::new(1), Some("10.0.0.1:4321".parse().unwrap()))
    }

    #[test]
    fn fixed_metadata() {
        let mut decoder = decoder(ParserConfig::default().with_server("example.org", 8080));
        let mut buffer = BytesMut::from("GET / HTTP/1.0\r\n\r\n");

        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        let environ = request.environ();

        assert_eq!(environ.get(keys::SCRIPT_NAME), Some(""));
        assert_eq!(environ.get(keys::SERVER_NAME), Some("example.org"));
        assert_eq!(environ.get(keys::SERVER_PORT), Some("8080"));
        assert_eq!(environ.get(keys::REMOTE_ADDR), Some("10.0.0.1"));
        assert_eq!(environ.get(keys::REMOTE_PORT), Some("4321"));
        assert_eq!(environ.server_protocol(), Some("HTTP/1.0"));
        assert_eq!(request.connection_id(), ConnectionId::new(1));
    }

    #[test]
    fn header_then_body() {
        let str = indoc! {r##"
        POST /upload HTTP/1.1
        Host: 127.0.0.1:8080
        Content-Length: 10

        0123456789"##};

        let mut decoder = decoder(ParserConfig::default());
        let mut buffer = BytesMut::from(&str[..str.len() - 4]);

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(decoder.is_header_complete());
        assert_eq!(decoder.reading_request().unwrap().body_read(), 6);
        assert!(buffer.is_empty());

        buffer.extend_from_slice(&str.as_bytes()[str.len() - 4..]);
        let request = decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(request.body_read(), 10);
        assert_eq!(request.body_kind(), BodyKind::Memory);
        assert_eq!(request.body().unwrap().as_bytes(), Some(&b"0123456789"[..]));
        assert!(decoder.reading_request().is_none());
        assert!(!decoder.is_header_complete());
    }

    #[test]
    fn leaves_next_request_in_buffer() {
        let mut decoder = decoder(ParserConfig::default());
        let mut buffer = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET / HTTP/1.1\r\n\r\n");

        let first = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.body().unwrap().as_bytes(), Some(&b"abc"[..]));
        assert_eq!(&buffer[..], b"GET / HTTP/1.1\r\n\r\n");

        let second = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(second.environ().request_method(), Some("GET"));
        assert!(buffer.is_empty());
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn rejected_request_stops_decoding() {
        let mut decoder = decoder(ParserConfig::default());
        let mut buffer = BytesMut::from("GET / HTTP/1.1\r\nConnection: maybe\r\n\r\nGET / HTTP/1.1\r\n\r\n");

        let error = decoder.decode(&mut buffer).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(decoder.is_failed());
        assert_eq!(decoder.reading_request().unwrap().bad_request_code(), Some(StatusCode::BAD_REQUEST));

        // the pipelined request behind the bad one is never parsed
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(decoder.is_failed());

        decoder.reset();
        assert!(!decoder.is_failed());
        assert!(decoder.reading_request().is_none());
    }

    #[test]
    fn too_large_declared_body_allocates_nothing() {
        let mut decoder = decoder(ParserConfig::default().with_max_content_length(8));
        let mut buffer = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 9\r\n\r\n123456789");

        let error = decoder.decode(&mut buffer).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let request = decoder.reading_request().unwrap();
        assert_eq!(request.bad_request_code(), Some(StatusCode::PAYLOAD_TOO_LARGE));
        assert_eq!(request.body_kind(), BodyKind::None);
    }
}
