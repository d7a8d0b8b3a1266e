use std::io;

use http::StatusCode;
use thiserror::Error;

/// Errors raised while turning raw bytes into a request.
///
/// Needing more bytes is not an error; the decoders report it as `Ok(None)`.
/// Every variant maps onto the status code reported to the client through
/// [`ParseError::status_code`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid request target: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid query string: byte {byte:#04x} is not allowed")]
    InvalidQuery { byte: u8 },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid connection header: {value}")]
    InvalidConnection { value: String },

    #[error("unsupported transfer-encoding: {value}")]
    UnsupportedTransferEncoding { value: String },

    #[error("body size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeBody { current_size: u64, max_size: u64 },

    #[error("content-length required")]
    LengthRequired,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn invalid_connection(value: &[u8]) -> Self {
        Self::InvalidConnection { value: String::from_utf8_lossy(value).into_owned() }
    }

    pub fn unsupported_transfer_encoding(value: &[u8]) -> Self {
        Self::UnsupportedTransferEncoding { value: String::from_utf8_lossy(value).into_owned() }
    }

    pub fn too_large_body(current_size: u64, max_size: u64) -> Self {
        Self::TooLargeBody { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status code the response layer reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TooLargeBody { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::LengthRequired => StatusCode::LENGTH_REQUIRED,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TooLargeHeader { .. }
            | Self::TooManyHeaders { .. }
            | Self::InvalidHeader { .. }
            | Self::InvalidVersion(_)
            | Self::InvalidMethod
            | Self::InvalidUri { .. }
            | Self::InvalidQuery { .. }
            | Self::InvalidContentLength { .. }
            | Self::InvalidConnection { .. }
            | Self::UnsupportedTransferEncoding { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ParseError::invalid_header("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::InvalidQuery { byte: 0x80 }.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::too_many_headers(64).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::too_large_body(11, 10).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ParseError::LengthRequired.status_code(), StatusCode::LENGTH_REQUIRED);
        assert_eq!(
            ParseError::io(io::Error::other("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display() {
        assert_eq!(ParseError::InvalidQuery { byte: 0xff }.to_string(), "invalid query string: byte 0xff is not allowed");
        assert_eq!(ParseError::invalid_connection(b"upgrade").to_string(), "invalid connection header: upgrade");
    }
}
