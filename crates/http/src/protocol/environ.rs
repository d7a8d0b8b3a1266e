//! The request metadata mapping.
//!
//! Keys follow the CGI convention: fixed upper-case names for request and
//! server metadata, and `HTTP_`-prefixed names for client headers so a header
//! can never collide with a standard key. Fixed key names live in [`keys`] as
//! read-only statics.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map;

/// Fixed metadata keys.
pub mod keys {
    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
    pub const PATH_INFO: &str = "PATH_INFO";
    pub const QUERY_STRING: &str = "QUERY_STRING";
    pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
    pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
    pub const SERVER_NAME: &str = "SERVER_NAME";
    pub const SERVER_PORT: &str = "SERVER_PORT";
    pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
    pub const REMOTE_ADDR: &str = "REMOTE_ADDR";
    pub const REMOTE_PORT: &str = "REMOTE_PORT";

    /// Prefix applied to every client header other than `Content-Type` and
    /// `Content-Length`.
    pub const HEADER_PREFIX: &str = "HTTP_";

    pub const HTTP_10: &str = "HTTP/1.0";
    pub const HTTP_11: &str = "HTTP/1.1";
}

/// Header name and value pairs surfaced to the application layer.
///
/// Inserting an existing key replaces its value, so for a header repeated in
/// the request the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ {
    entries: HashMap<Cow<'static, str>, Cow<'static, str>>,
}

impl Environ {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity) }
    }

    pub fn insert(
        &mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Option<Cow<'static, str>> {
        self.entries.insert(key.into(), value.into())
    }

    /// Inserts a client header under its `HTTP_` key. `name` must already be
    /// normalized.
    pub(crate) fn insert_header(&mut self, name: &[u8], value: &[u8]) {
        let mut key = String::with_capacity(keys::HEADER_PREFIX.len() + name.len());
        key.push_str(keys::HEADER_PREFIX);
        key.extend(name.iter().map(|&b| b as char));
        self.entries.insert(Cow::Owned(key), Cow::Owned(latin1(value)));
    }

    pub(crate) fn insert_latin1(&mut self, key: &'static str, value: &[u8]) {
        self.entries.insert(Cow::Borrowed(key), Cow::Owned(latin1(value)));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|value| &**value)
    }

    /// Looks a client header up by its normalized name, e.g. `USER_AGENT`.
    pub fn header(&self, normalized_name: &str) -> Option<&str> {
        match normalized_name {
            "CONTENT_TYPE" => self.get(keys::CONTENT_TYPE),
            "CONTENT_LENGTH" => self.get(keys::CONTENT_LENGTH),
            name => self.get(&format!("{}{name}", keys::HEADER_PREFIX)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Cow<'static, str>> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.entries.iter() }
    }

    pub fn request_method(&self) -> Option<&str> {
        self.get(keys::REQUEST_METHOD)
    }

    pub fn path_info(&self) -> Option<&str> {
        self.get(keys::PATH_INFO)
    }

    pub fn query_string(&self) -> Option<&str> {
        self.get(keys::QUERY_STRING)
    }

    pub fn server_protocol(&self) -> Option<&str> {
        self.get(keys::SERVER_PROTOCOL)
    }
}

/// Iterator over the entries of an [`Environ`], in no particular order.
#[derive(Debug)]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, Cow<'static, str>, Cow<'static, str>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (&**key, &**value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Environ {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_prefixed() {
        let mut environ = Environ::new();
        environ.insert_header(b"USER_AGENT", b"curl/7.79.1");
        environ.insert_latin1(keys::CONTENT_TYPE, b"text/plain");

        assert_eq!(environ.get("HTTP_USER_AGENT"), Some("curl/7.79.1"));
        assert_eq!(environ.header("USER_AGENT"), Some("curl/7.79.1"));
        assert_eq!(environ.header("CONTENT_TYPE"), Some("text/plain"));
        assert!(!environ.contains_key("USER_AGENT"));
    }

    #[test]
    fn last_duplicate_wins() {
        let mut environ = Environ::new();
        environ.insert_header(b"ACCEPT", b"text/html");
        environ.insert_header(b"ACCEPT", b"*/*");
        assert_eq!(environ.len(), 1);
        assert_eq!(environ.header("ACCEPT"), Some("*/*"));
    }

    #[test]
    fn values_are_latin1() {
        let mut environ = Environ::new();
        environ.insert_header(b"X_NAME", &[b'c', 0xe9]);
        assert_eq!(environ.header("X_NAME"), Some("c\u{e9}"));
    }

    #[test]
    fn iterates_entries() {
        let mut environ = Environ::with_capacity(2);
        environ.insert(keys::SCRIPT_NAME, "");
        environ.insert(keys::SERVER_PORT, "8000");
        let mut entries: Vec<_> = environ.iter().collect();
        entries.sort_unstable();
        assert_eq!(entries, vec![("SCRIPT_NAME", ""), ("SERVER_PORT", "8000")]);
    }
}
