//! Request assembler: protocol rules on top of the header parser's tokens.
//!
//! Works on the header block in place. Header names are upper-cased with `-`
//! mapped to `_`, the path is percent-decoded over itself and the method is
//! case-folded, all without growing the buffer. The results are copied once
//! into the request's metadata mapping.

use http::Version;
use tracing::debug;

use crate::codec::header::target::decode_target;
use crate::codec::header::RequestHead;
use crate::config::ParserConfig;
use crate::ensure;
use crate::protocol::environ::keys;
use crate::protocol::{Method, ParseError, Request};

/// Applies protocol semantics to a parsed head and fills in `request`.
///
/// `buf` is the header block `head` was parsed from. On error the request is
/// left partially filled; the caller records the status code on it.
pub(crate) fn assemble(
    config: &ParserConfig,
    head: &RequestHead,
    buf: &mut [u8],
    request: &mut Request,
) -> Result<(), ParseError> {
    let mut keep_alive = head.minor_version() == 1;
    let mut content_length = None;

    for index in head.headers() {
        let (name_start, name_end) = index.name;
        let (value_start, value_end) = index.value;

        normalize_header_name(&mut buf[name_start..name_end])?;
        let name = &buf[name_start..name_end];
        let value = &buf[value_start..value_end];

        match name {
            b"CONTENT_TYPE" => request.environ_mut().insert_latin1(keys::CONTENT_TYPE, value),
            b"CONTENT_LENGTH" => {
                content_length = Some(parse_content_length(value)?);
                request.environ_mut().insert_latin1(keys::CONTENT_LENGTH, value);
            }
            _ => {
                match name {
                    b"CONNECTION" => keep_alive = parse_connection(value)?,
                    b"TRANSFER_ENCODING" => return Err(ParseError::unsupported_transfer_encoding(value)),
                    _ => {}
                }
                request.environ_mut().insert_header(name, value);
            }
        }
    }

    let body_length = content_length.unwrap_or(0);
    let max_content_length = config.max_content_length();
    ensure!(body_length <= max_content_length, ParseError::too_large_body(body_length, max_content_length));

    let (version, protocol) = match head.minor_version() {
        1 => (Version::HTTP_11, keys::HTTP_11),
        _ => (Version::HTTP_10, keys::HTTP_10),
    };
    request.set_version(version);
    request.environ_mut().insert(keys::SERVER_PROTOCOL, protocol);

    let (target_start, target_end) = head.target();
    let target = &mut buf[target_start..target_end];
    ensure!(
        target.len() <= config.max_uri_len(),
        ParseError::invalid_uri(format!("target length {} exceed the limit {}", target.len(), config.max_uri_len()))
    );
    ensure!(target.first() == Some(&b'/'), ParseError::invalid_uri("only origin-form targets are supported"));

    let decoded = decode_target(target)?;
    let path = std::str::from_utf8(&target[..decoded.path_len])
        .map_err(|_| ParseError::invalid_uri("decoded path is not valid utf-8"))?;
    request.environ_mut().insert(keys::PATH_INFO, path.to_owned());
    if let Some(query) = decoded.query {
        request.environ_mut().insert_latin1(keys::QUERY_STRING, &target[query]);
    }

    let (method_start, method_end) = head.method();
    let method = Method::normalize(&mut buf[method_start..method_end]);
    request.environ_mut().insert(keys::REQUEST_METHOD, method.to_cow());

    if content_length.is_none() && config.require_content_length() && method.expects_body() {
        return Err(ParseError::LengthRequired);
    }

    debug!(method = %method, body_length, keep_alive, "assembled request head");
    request.set_method(method);
    request.set_body_length(body_length);
    request.set_keep_alive(keep_alive);
    Ok(())
}

/// Upper-cases a header name in place and maps `-` to `_`.
///
/// Every byte must be visible ASCII (0x21..=0x7E); anything else, including
/// control characters and non-ASCII bytes, is rejected.
pub(crate) fn normalize_header_name(name: &mut [u8]) -> Result<(), ParseError> {
    for b in name.iter_mut() {
        let c = *b;
        ensure!((0x21..=0x7E).contains(&c), ParseError::invalid_header(format!("invalid byte {c:#04x} in header name")));
        *b = if c == b'-' { b'_' } else { c.to_ascii_uppercase() };
    }
    Ok(())
}

/// Parses a `Content-Length` value as plain decimal digits.
pub(crate) fn parse_content_length(value: &[u8]) -> Result<u64, ParseError> {
    let mut length: u64 = 0;
    for &c in value {
        ensure!(c.is_ascii_digit(), ParseError::invalid_content_length(format!("value {} is not u64", String::from_utf8_lossy(value))));
        length = length
            .checked_mul(10)
            .and_then(|length| length.checked_add(u64::from(c - b'0')))
            .ok_or_else(|| ParseError::too_large_body(u64::MAX, u64::MAX))?;
    }
    Ok(length)
}

/// Resolves a `Connection` header value to the keep-alive flag.
fn parse_connection(value: &[u8]) -> Result<bool, ParseError> {
    if value.eq_ignore_ascii_case(b"keep-alive") {
        Ok(true)
    } else if value.eq_ignore_ascii_case(b"close") {
        Ok(false)
    } else {
        Err(ParseError::invalid_connection(value))
    }
}
