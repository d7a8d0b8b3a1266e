//! Request target decoding.
//!
//! The path is percent-decoded in place in a single forward scan: the write
//! cursor never overtakes the read cursor, so the decoded path is a prefix of
//! the original target and the buffer never grows. The query string, which
//! follows the first `?`, is left undecoded at its original position and ends at
//! the first `#`. A fragment is discarded.

use std::ops::Range;

use crate::ensure;
use crate::protocol::ParseError;

/// Where the decoded pieces of a target ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedTarget {
    /// Length of the decoded path, which starts at offset 0.
    pub(crate) path_len: usize,
    /// Range of a non-empty query string.
    pub(crate) query: Option<Range<usize>>,
}

/// Decodes `target` in place.
///
/// A `%` followed by fewer than two bytes is kept literally; a `%` followed by
/// two bytes that are not both hex digits is rejected. Any byte of 127 or
/// above in the query is rejected.
pub(crate) fn decode_target(target: &mut [u8]) -> Result<DecodedTarget, ParseError> {
    let len = target.len();
    let mut read = 0;
    let mut write = 0;
    let mut query = None;

    while read < len {
        let c = target[read];
        match c {
            b'%' if read + 2 < len => {
                let (hi, lo) = (target[read + 1], target[read + 2]);
                let decoded = hex_pair(hi, lo)
                    .ok_or_else(|| ParseError::invalid_uri(format!("invalid percent-encoding at offset {read}")))?;
                target[write] = decoded;
                read += 3;
            }
            b'?' => {
                query = scan_query(target, read + 1)?;
                break;
            }
            b'#' => break,
            _ => {
                target[write] = c;
                read += 1;
            }
        }
        write += 1;
    }

    Ok(DecodedTarget { path_len: write, query })
}

fn scan_query(target: &[u8], start: usize) -> Result<Option<Range<usize>>, ParseError> {
    let mut end = start;
    for &c in &target[start..] {
        if c == b'#' {
            break;
        }
        ensure!(c < 127, ParseError::InvalidQuery { byte: c });
        end += 1;
    }
    Ok((end > start).then_some(start..end))
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    Some((hex_value(hi)? << 4) | hex_value(lo)?)
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
