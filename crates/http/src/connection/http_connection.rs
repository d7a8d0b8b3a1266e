use std::io;
use std::net::SocketAddr;

use bytes::BytesMut;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};
use triomphe::Arc;

use crate::codec::RequestDecoder;
use crate::config::ParserConfig;
use crate::connection::RequestQueue;
use crate::protocol::{ConnectionId, Request};

/// Initial capacity of the read buffer and the size of each read.
const READ_BUFFER_SIZE: usize = 16 * 1024;

/// The result of handing newly read bytes to a [`Connection`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// This many requests were completed and queued.
    Complete(usize),
    /// Nothing was completed; more bytes are needed.
    Incomplete,
    /// A request was rejected with this status code. The connection must be
    /// closed once the error has been answered.
    Error(StatusCode),
}

/// Per-socket request ingestion state
///
/// `Connection` does no I/O on its own. The event loop reads from the socket
/// and hands the bytes to [`Connection::deliver_bytes`] (or lets
/// [`Connection::read_from`] do the read), then drains
/// [`Connection::next_request`] until it returns `None`.
///
/// Bytes are accumulated in the read buffer until a full request is present.
/// Completed requests are cut off its front, so whatever remains is the
/// beginning of the next pipelined request.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    read_buf: BytesMut,
    decoder: RequestDecoder,
    keep_alive: bool,
    completed: u64,
    queue: RequestQueue,
}

impl Connection {
    pub fn new(config: Arc<ParserConfig>, id: ConnectionId, peer: Option<SocketAddr>) -> Self {
        Self {
            id,
            peer,
            read_buf: BytesMut::with_capacity(READ_BUFFER_SIZE),
            decoder: RequestDecoder::new(config, id, peer),
            keep_alive: false,
            completed: 0,
            queue: RequestQueue::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Appends newly read bytes and parses as far as they allow.
    pub fn deliver_bytes(&mut self, bytes: &[u8]) -> ParseOutcome {
        if let Some(code) = self.bad_request_code() {
            return ParseOutcome::Error(code);
        }
        self.read_buf.extend_from_slice(bytes);
        self.execute_parse()
    }

    /// Performs one read from `reader` into the read buffer and parses the
    /// result.
    ///
    /// Returns `Ok(None)` once the reader is at end of stream. A request that
    /// was still being read at that point is left in place; call
    /// [`Connection::reset`] to release it.
    pub async fn read_from<R>(&mut self, reader: &mut R) -> io::Result<Option<ParseOutcome>>
    where
        R: AsyncRead + Unpin,
    {
        if let Some(code) = self.bad_request_code() {
            return Ok(Some(ParseOutcome::Error(code)));
        }

        self.read_buf.reserve(READ_BUFFER_SIZE);
        let n = reader.read_buf(&mut self.read_buf).await?;
        if n == 0 {
            trace!(connection = %self.id, buffered = self.read_buf.len(), "end of stream");
            return Ok(None);
        }

        trace!(connection = %self.id, read = n, "read bytes");
        Ok(Some(self.execute_parse()))
    }

    fn execute_parse(&mut self) -> ParseOutcome {
        let mut queued = 0;

        loop {
            match self.decoder.decode(&mut self.read_buf) {
                Ok(Some(request)) => {
                    self.keep_alive = request.keep_alive();
                    self.completed += 1;
                    queued += 1;
                    self.queue.push(request);

                    if self.read_buf.is_empty() {
                        break;
                    }
                    debug!(connection = %self.id, remaining = self.read_buf.len(), "parsing pipelined request");
                }
                Ok(None) => break,
                Err(e) => {
                    self.keep_alive = false;
                    return ParseOutcome::Error(e.status_code());
                }
            }
        }

        if queued > 0 { ParseOutcome::Complete(queued) } else { ParseOutcome::Incomplete }
    }

    /// Removes the oldest completed request.
    pub fn next_request(&mut self) -> Option<Request> {
        self.queue.shift()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// The request currently being parsed. After an error this is the
    /// rejected request.
    pub fn reading_request(&self) -> Option<&Request> {
        self.decoder.reading_request()
    }

    pub fn bad_request_code(&self) -> Option<StatusCode> {
        self.decoder.reading_request().and_then(Request::bad_request_code)
    }

    /// Whether the connection may stay open after the queued requests have
    /// been answered. False until a request has completed.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Number of requests fully parsed on this connection.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Bytes received but not yet consumed by a request.
    pub fn buffered_len(&self) -> usize {
        self.read_buf.len()
    }

    /// Tears the connection state down: the request being parsed, every
    /// queued request and their body storage are released.
    pub fn reset(&mut self) {
        debug!(connection = %self.id, queued = self.queue.len(), completed = self.completed, "reset connection");
        self.decoder.reset();
        self.queue.clear();
        self.read_buf.clear();
        self.keep_alive = false;
    }
}
