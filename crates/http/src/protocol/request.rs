//! The per-request record.
//!
//! A [`Request`] is created when the first byte of a new request is seen,
//! filled in while its header block and body arrive, and then handed to the
//! connection's queue. From there the dispatcher owns it; dropping it releases
//! the body storage, including any spill file.

use std::fmt;
use std::time::{Duration, Instant};

use http::{StatusCode, Version};

use crate::protocol::Environ;
use crate::protocol::Method;
use crate::protocol::ParseError;
use crate::protocol::body::{BodyBuffer, BodyKind};

/// Opaque handle naming the connection a request arrived on.
///
/// The dispatcher uses it to recover connection-scoped context, such as the
/// peer address, without the request owning the connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

#[derive(Debug)]
pub struct Request {
    connection: ConnectionId,
    environ: Environ,
    method: Option<Method>,
    version: Version,
    keep_alive: bool,
    body_length: u64,
    body_read: u64,
    body: Option<BodyBuffer>,
    bad_request: Option<StatusCode>,
    started_at: Instant,
}

impl Request {
    pub(crate) fn new(connection: ConnectionId, environ: Environ) -> Self {
        Self {
            connection,
            environ,
            method: None,
            version: Version::HTTP_11,
            keep_alive: false,
            body_length: 0,
            body_read: 0,
            body: None,
            bad_request: None,
            started_at: Instant::now(),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection
    }

    /// The request metadata mapping.
    pub fn environ(&self) -> &Environ {
        &self.environ
    }

    pub(crate) fn environ_mut(&mut self) -> &mut Environ {
        &mut self.environ
    }

    /// The resolved method. `None` until the header block has been assembled.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub(crate) fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Whether the client asked to keep the connection open after this
    /// request, resolved from the version and the `Connection` header.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub(crate) fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    /// The body length declared by `Content-Length`, zero when absent.
    pub fn body_length(&self) -> u64 {
        self.body_length
    }

    pub(crate) fn set_body_length(&mut self, body_length: u64) {
        self.body_length = body_length;
    }

    /// Body bytes consumed so far.
    pub fn body_read(&self) -> u64 {
        self.body_read
    }

    pub(crate) fn add_body_read(&mut self, len: u64) {
        self.body_read += len;
    }

    /// Declared body bytes not yet received.
    pub fn body_remaining(&self) -> u64 {
        self.body_length - self.body_read
    }

    pub fn body(&self) -> Option<&BodyBuffer> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut BodyBuffer> {
        self.body.as_mut()
    }

    /// Takes the body storage out of the request.
    pub fn take_body(&mut self) -> Option<BodyBuffer> {
        self.body.take()
    }

    /// Returns the body storage, creating it from the declared length first
    /// if there is none yet.
    pub(crate) fn body_or_try_insert_with<F>(&mut self, f: F) -> Result<&mut BodyBuffer, ParseError>
    where
        F: FnOnce(u64) -> Result<BodyBuffer, ParseError>,
    {
        let body = match self.body.take() {
            Some(body) => body,
            None => f(self.body_length)?,
        };
        Ok(self.body.insert(body))
    }

    pub fn body_kind(&self) -> BodyKind {
        self.body.as_ref().map_or(BodyKind::None, BodyBuffer::kind)
    }

    /// The status code this request was rejected with, if any. A rejected
    /// request is terminal for its connection.
    pub fn bad_request_code(&self) -> Option<StatusCode> {
        self.bad_request
    }

    pub fn is_bad_request(&self) -> bool {
        self.bad_request.is_some()
    }

    pub(crate) fn set_bad_request(&mut self, code: StatusCode) {
        self.bad_request = Some(code);
    }

    /// True once every declared body byte has been consumed.
    pub fn is_body_complete(&self) -> bool {
        self.body_read >= self.body_length
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
