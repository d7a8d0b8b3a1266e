use std::collections::VecDeque;
use std::collections::vec_deque;

use crate::protocol::Request;

/// Completed requests waiting for the dispatcher, oldest first.
///
/// Requests are pushed in the order their last byte was parsed, which is the
/// order the client sent them on the connection.
#[derive(Debug, Default)]
pub struct RequestQueue {
    requests: VecDeque<Request>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, request: Request) {
        self.requests.push_back(request);
    }

    /// Removes and returns the oldest request.
    pub fn shift(&mut self) -> Option<Request> {
        self.requests.pop_front()
    }

    pub fn front(&self) -> Option<&Request> {
        self.requests.front()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Request> {
        self.requests.iter()
    }

    /// Drops every queued request along with its body storage.
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

impl<'a> IntoIterator for &'a RequestQueue {
    type Item = &'a Request;
    type IntoIter = vec_deque::Iter<'a, Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
