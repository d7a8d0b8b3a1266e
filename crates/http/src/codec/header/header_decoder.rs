//! Header parser: tokenizes one request line plus header block.
//!
//! Tokenizing is delegated to `httparse`. The parser only records byte ranges
//! into the caller's buffer for the method, request target and each header
//! name/value, so nothing is copied at this layer and the ranges stay valid
//! however the caller later moves the buffer.
//!
//! The result of one attempt is one of:
//!
//! - `Ok(None)`: the header block is incomplete, retry once more bytes arrived
//! - `Err(_)`: the request line or a header is malformed
//! - `Ok(Some(head))`: a complete head; `head.body_offset()` is one past the
//!   terminating blank line

use httparse::{Error, Status};
use tracing::trace;

use crate::config::ParserConfig;
use crate::ensure;
use crate::protocol::ParseError;

/// Hard upper bound on the header slots handed to `httparse`.
const MAX_HEADER_NUM: usize = 128;

/// Start and end positions of one header's name and value in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderIndex {
    pub name: (usize, usize),
    pub value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

/// The tokens of a complete request head, as ranges into the parsed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    method: (usize, usize),
    target: (usize, usize),
    minor_version: u8,
    headers: Vec<HeaderIndex>,
    body_offset: usize,
}

impl RequestHead {
    pub fn method(&self) -> (usize, usize) {
        self.method
    }

    pub fn target(&self) -> (usize, usize) {
        self.target
    }

    /// `0` for HTTP/1.0, `1` for HTTP/1.1.
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    /// Header ranges in the order they appeared. Repeated names are kept as
    /// separate entries.
    pub fn headers(&self) -> &[HeaderIndex] {
        &self.headers
    }

    /// Offset one past the blank line ending the header block. Everything
    /// after it is body or the next pipelined request.
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }
}

/// Incremental header parser for one request at a time.
///
/// Keeps the length of the previous attempt so a retry without new bytes
/// returns immediately.
#[derive(Debug, Default)]
pub struct HeaderDecoder {
    last_len: usize,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to parse a request head from the start of `src`.
    ///
    /// `src` holds every byte received for this request so far.
    pub fn decode(&mut self, src: &[u8], config: &ParserConfig) -> Result<Option<RequestHead>, ParseError> {
        if src.len() == self.last_len {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let max_headers = config.max_headers().min(MAX_HEADER_NUM);
        let mut req = httparse::Request::new(&mut headers[..max_headers]);

        let parsed_result = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(max_headers),
            Error::Version => ParseError::InvalidVersion(None),
            Error::Token => ParseError::InvalidMethod,
            e => ParseError::invalid_header(e),
        });

        let max_header_bytes = config.max_header_bytes();
        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(body_offset, header_count = req.headers.len(), "parsed request head");
                ensure!(body_offset <= max_header_bytes, ParseError::too_large_header(body_offset, max_header_bytes));

                let method = req.method.ok_or(ParseError::InvalidMethod)?;
                let target = req.path.ok_or_else(|| ParseError::invalid_uri("missing request target"))?;
                let minor_version = req.version.ok_or(ParseError::InvalidVersion(None))?;

                let base = src.as_ptr() as usize;
                let mut indices = vec![EMPTY_HEADER_INDEX; req.headers.len()];
                HeaderIndex::record(src, req.headers, &mut indices);

                self.last_len = 0;
                Ok(Some(RequestHead {
                    method: span(base, method.as_bytes()),
                    target: span(base, target.as_bytes()),
                    minor_version,
                    headers: indices,
                    body_offset,
                }))
            }
            Status::Partial => {
                ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
                self.last_len = src.len();
                Ok(None)
            }
        }
    }

    /// Forgets the previous attempt, for a new request.
    pub fn reset(&mut self) {
        self.last_len = 0;
    }
}

impl HeaderIndex {
    /// Records the byte positions of header names and values from the parsed headers.
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            indices.name = span(bytes_ptr, header.name.as_bytes());
            indices.value = span(bytes_ptr, header.value);
        }
    }
}

fn span(base: usize, part: &[u8]) -> (usize, usize) {
    let start = part.as_ptr() as usize - base;
    (start, start + part.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn text<'a>(src: &'a [u8], range: (usize, usize)) -> &'a str {
        std::str::from_utf8(&src[range.0..range.1]).unwrap()
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##}
        .replace('\n', "\r\n");
        let src = str.as_bytes();

        let head = HeaderDecoder::new().decode(src, &ParserConfig::default()).unwrap().unwrap();

        assert_eq!(text(src, head.method()), "GET");
        assert_eq!(text(src, head.target()), "/index.html");
        assert_eq!(head.minor_version(), 1);
        assert_eq!(head.headers().len(), 3);

        let pairs: Vec<_> = head.headers().iter().map(|h| (text(src, h.name), text(src, h.value))).collect();
        assert_eq!(pairs, vec![("Host", "127.0.0.1:8080"), ("User-Agent", "curl/7.79.1"), ("Accept", "*/*")]);

        assert_eq!(&src[head.body_offset()..], b"123");
    }

    #[test]
    fn duplicate_names_are_kept_in_order() {
        let src = b"GET / HTTP/1.0\r\nAccept: a\r\nAccept: b\r\n\r\n";
        let head = HeaderDecoder::new().decode(src, &ParserConfig::default()).unwrap().unwrap();

        assert_eq!(head.minor_version(), 0);
        let values: Vec<_> = head.headers().iter().map(|h| text(src, h.value)).collect();
        assert_eq!(values, vec!["a", "b"]);
        assert_eq!(head.body_offset(), src.len());
    }

    #[test]
    fn partial_then_complete() {
        let src = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let config = ParserConfig::default();
        let mut decoder = HeaderDecoder::new();

        assert_eq!(decoder.decode(&src[..10], &config).unwrap(), None);
        assert_eq!(decoder.decode(&src[..30], &config).unwrap(), None);
        // same length as the previous attempt: no re-parse
        assert_eq!(decoder.decode(&src[..30], &config).unwrap(), None);

        let head = decoder.decode(src, &config).unwrap().unwrap();
        assert_eq!(head.body_offset(), src.len());
    }

    #[test]
    fn short_heads() {
        let config = ParserConfig::default();

        let src = b"X / HTTP/1.0\n\n";
        let head = HeaderDecoder::new().decode(src, &config).unwrap().unwrap();
        assert_eq!(text(src, head.method()), "X");
        assert_eq!(text(src, head.target()), "/");
        assert_eq!(head.body_offset(), src.len());

        let result = HeaderDecoder::new().decode(b"GARBAGE\r\n\r\n", &config);
        assert_eq!(result.unwrap_err().status_code(), http::StatusCode::BAD_REQUEST);

        assert_eq!(HeaderDecoder::new().decode(b"GE", &config).unwrap(), None);
    }

    #[test]
    fn malformed_request_line() {
        let config = ParserConfig::default();
        let result = HeaderDecoder::new().decode(b"GET /index.html HTTP/2.0\r\n\r\n", &config);
        assert!(matches!(result, Err(ParseError::InvalidVersion(_))));

        let result = HeaderDecoder::new().decode(b" / HTTP/1.1\r\nHost: localhost\r\n\r\n", &config);
        assert_eq!(result.unwrap_err().status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn control_byte_in_header_name() {
        let config = ParserConfig::default();
        let result = HeaderDecoder::new().decode(b"GET / HTTP/1.1\r\nHo\x00st: localhost\r\n\r\n", &config);
        assert_eq!(result.unwrap_err().status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn too_many_headers() {
        let config = ParserConfig::default().with_max_headers(2);
        let src = b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n";
        let result = HeaderDecoder::new().decode(src, &config);
        assert!(matches!(result, Err(ParseError::TooManyHeaders { max_num: 2 })));
    }

    #[test]
    fn too_large_header() {
        let config = ParserConfig::default().with_max_header_bytes(32);
        let src = format!("GET / HTTP/1.1\r\nX-Long: {}", "a".repeat(64));
        let result = HeaderDecoder::new().decode(src.as_bytes(), &config);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }
}
