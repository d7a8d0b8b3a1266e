//! Fixtures shared by the ingestion benchmarks.

/// A captured request and the way it is fed to a connection.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    file: TestFile,
    delivery: Delivery,
}

impl TestCase {
    /// The whole capture in a single read.
    pub fn whole(name: &'static str, file: TestFile) -> Self {
        Self { name, file, delivery: Delivery::Whole }
    }

    /// The capture split into reads of `size` bytes.
    pub fn chunked(name: &'static str, file: TestFile, size: usize) -> Self {
        Self { name, file, delivery: Delivery::Chunks(size) }
    }

    /// `count` copies of the capture back to back in a single read.
    pub fn pipelined(name: &'static str, file: TestFile, count: usize) -> Self {
        Self { name, file, delivery: Delivery::Pipelined(count) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// Number of requests the case produces.
    pub fn requests(&self) -> usize {
        match self.delivery {
            Delivery::Pipelined(count) => count,
            Delivery::Whole | Delivery::Chunks(_) => 1,
        }
    }

    /// The bytes handed to the connection, in delivery order.
    pub fn reads(&self) -> Vec<Vec<u8>> {
        let content = self.file.content().as_bytes();
        match self.delivery {
            Delivery::Whole => vec![content.to_vec()],
            Delivery::Chunks(size) => content.chunks(size.max(1)).map(<[u8]>::to_vec).collect(),
            Delivery::Pipelined(count) => vec![content.repeat(count)],
        }
    }

    /// Total bytes of the case, used for throughput.
    pub fn len(&self) -> usize {
        self.file.content().len() * self.requests()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    Whole,
    Chunks(usize),
    Pipelined(usize),
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}
