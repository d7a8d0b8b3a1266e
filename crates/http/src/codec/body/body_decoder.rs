//! Body ingestion for requests with a declared `Content-Length`.
//!
//! Storage is chosen lazily, on the first body byte, from the declared length:
//!
//! - declared length 0: nothing is ever allocated
//! - up to the in-memory threshold: a buffer sized to the declared length
//! - above the threshold: a temporary file
//!
//! Bytes past the declared length are never consumed; they belong to the next
//! pipelined request.

use std::cmp;

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::config::ParserConfig;
use crate::ensure;
use crate::protocol::body::BodyBuffer;
use crate::protocol::{ParseError, Request};

/// Feeds body bytes from the read buffer into a request's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDecoder {
    /// The declared body length
    length: u64,
}

impl BodyDecoder {
    /// Creates a decoder for a body of `length` declared bytes.
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Moves up to the remaining declared length out of `src` into the
    /// request body.
    ///
    /// # Returns
    /// * `Ok(true)` once every declared byte has been consumed
    /// * `Ok(false)` when more bytes are needed
    /// * `Err(ParseError)` if the body is too large or storage failed
    pub fn decode(&mut self, request: &mut Request, src: &mut BytesMut, config: &ParserConfig) -> Result<bool, ParseError> {
        if self.length == 0 {
            return Ok(true);
        }

        if src.is_empty() {
            return Ok(request.body_read() >= self.length);
        }

        let remaining = self.length.saturating_sub(request.body_read());
        let len = cmp::min(remaining, src.len() as u64) as usize;
        ingest(request, &src[..len], config)?;
        src.advance(len);

        trace!(len, body_read = request.body_read(), body_length = self.length, "ingested body bytes");
        Ok(request.body_read() >= self.length)
    }
}

/// Writes `buf` into the request body, allocating storage on first use.
pub(crate) fn ingest(request: &mut Request, buf: &[u8], config: &ParserConfig) -> Result<(), ParseError> {
    let max_content_length = config.max_content_length();
    let total = request.body_read() + buf.len() as u64;
    ensure!(total <= max_content_length, ParseError::too_large_body(total, max_content_length));

    let body = request.body_or_try_insert_with(|body_length| {
        // storage is only ever set up for a declared body
        ensure!(body_length > 0, ParseError::LengthRequired);

        let body = if body_length > config.body_buffer_size() {
            BodyBuffer::file(config.temp_dir(), max_content_length)?
        } else {
            BodyBuffer::memory(body_length, max_content_length)
        };
        debug!(body_length, kind = ?body.kind(), "allocated body storage");
        Ok(body)
    })?;

    body.write(buf)?;
    request.add_body_read(buf.len() as u64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::body::BodyKind;
    use crate::protocol::{ConnectionId, Environ};
    use http::StatusCode;

    fn request_with_length(length: u64) -> Request {
        let mut request = Request::new(ConnectionId::new(1), Environ::new());
        request.set_body_length(length);
        request
    }

    #[test]
    fn test_basic() {
        let config = ParserConfig::default();
        let mut buffer: BytesMut = BytesMut::from(&b"101234567890abcdef\r\n\r\n"[..]);
        let mut request = request_with_length(10);

        let mut body_decoder = BodyDecoder::new(10);
        assert!(body_decoder.decode(&mut request, &mut buffer, &config).unwrap());

        assert_eq!(request.body_read(), 10);
        assert_eq!(request.body().unwrap().as_bytes(), Some(&b"1012345678"[..]));
        assert_eq!(&buffer[..], b"90abcdef\r\n\r\n");
    }

    #[test]
    fn across_reads() {
        let config = ParserConfig::default();
        let mut request = request_with_length(6);
        let mut body_decoder = BodyDecoder::new(6);

        let mut buffer = BytesMut::from(&b"abc"[..]);
        assert!(!body_decoder.decode(&mut request, &mut buffer, &config).unwrap());
        assert!(buffer.is_empty());
        assert!(!body_decoder.decode(&mut request, &mut buffer, &config).unwrap());

        buffer.extend_from_slice(b"defGET");
        assert!(body_decoder.decode(&mut request, &mut buffer, &config).unwrap());
        assert_eq!(request.body().unwrap().as_bytes(), Some(&b"abcdef"[..]));
        assert_eq!(&buffer[..], b"GET");
    }

    #[test]
    fn empty_body_allocates_nothing() {
        let config = ParserConfig::default();
        let mut request = request_with_length(0);
        let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);

        assert!(BodyDecoder::new(0).decode(&mut request, &mut buffer, &config).unwrap());
        assert_eq!(request.body_kind(), BodyKind::None);
        assert_eq!(buffer.len(), 18);
    }

    #[test]
    fn storage_threshold() {
        let config = ParserConfig::default().with_body_buffer_size(8);

        let mut at_threshold = request_with_length(8);
        ingest(&mut at_threshold, b"12345678", &config).unwrap();
        assert_eq!(at_threshold.body_kind(), BodyKind::Memory);

        let mut below = request_with_length(7);
        ingest(&mut below, b"1234567", &config).unwrap();
        assert_eq!(below.body_kind(), BodyKind::Memory);

        let mut above = request_with_length(9);
        ingest(&mut above, b"123456789", &config).unwrap();
        assert_eq!(above.body_kind(), BodyKind::File);
        assert_eq!(&above.body_mut().unwrap().to_bytes().unwrap()[..], b"123456789");
    }

    #[test]
    fn over_max_content_length() {
        let config = ParserConfig::default().with_max_content_length(4);
        let mut request = request_with_length(4);

        ingest(&mut request, b"abc", &config).unwrap();
        let error = ingest(&mut request, b"de", &config).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(request.body_read(), 3);
    }

    #[test]
    fn ingest_without_declared_length() {
        let config = ParserConfig::default();
        let mut request = request_with_length(0);

        let error = ingest(&mut request, b"abc", &config).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::LENGTH_REQUIRED);
        assert_eq!(request.body_kind(), BodyKind::None);
    }

    #[test]
    fn storage_failure() {
        let missing = std::env::temp_dir().join("http-ingest-missing-dir").join("nested");
        let config = ParserConfig::default().with_body_buffer_size(1).with_temp_dir(missing);
        let mut request = request_with_length(2);

        let error = ingest(&mut request, b"ab", &config).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
