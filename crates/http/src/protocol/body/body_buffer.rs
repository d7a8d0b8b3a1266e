use std::fs::File;
use std::io;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::ensure;
use crate::protocol::ParseError;
use crate::protocol::body::TempFile;

/// Where a request body lives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// No storage was ever allocated.
    None,
    /// Held in memory.
    Memory,
    /// Spilled to a temporary file.
    File,
}

#[derive(Debug)]
enum Storage {
    Memory(BytesMut),
    File(TempFile),
}

/// Growable store for one request body.
///
/// The total number of bytes written never exceeds `limit`; a write that
/// would cross it fails with [`ParseError::TooLargeBody`] and stores nothing.
#[derive(Debug)]
pub struct BodyBuffer {
    storage: Storage,
    written: u64,
    limit: u64,
}

impl BodyBuffer {
    /// An in-memory buffer with room for `capacity` bytes.
    pub fn memory(capacity: u64, limit: u64) -> Self {
        let capacity = usize::try_from(capacity.min(limit)).unwrap_or(0);
        debug!(capacity, "allocating in-memory body buffer");
        Self { storage: Storage::Memory(BytesMut::with_capacity(capacity)), written: 0, limit }
    }

    /// A file-backed buffer inside `dir`.
    pub fn file(dir: &Path, limit: u64) -> Result<Self, ParseError> {
        let file = TempFile::create_in(dir).map_err(ParseError::io)?;
        debug!(path = %file.path().display(), "spilling body to temporary file");
        Ok(Self { storage: Storage::File(file), written: 0, limit })
    }

    pub fn kind(&self) -> BodyKind {
        match self.storage {
            Storage::Memory(_) => BodyKind::Memory,
            Storage::File(_) => BodyKind::File,
        }
    }

    /// Appends `buf`.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), ParseError> {
        let total = self.written + buf.len() as u64;
        ensure!(total <= self.limit, ParseError::too_large_body(total, self.limit));

        match &mut self.storage {
            Storage::Memory(bytes) => bytes.extend_from_slice(buf),
            Storage::File(file) => file.write_all(buf).map_err(ParseError::io)?,
        }
        self.written = total;
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// The body bytes, when held in memory.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.storage {
            Storage::Memory(bytes) => Some(&bytes[..]),
            Storage::File(_) => None,
        }
    }

    /// Path of the spill file, when file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Memory(_) => None,
            Storage::File(file) => Some(file.path()),
        }
    }

    /// Rewinds a file-backed body for reading.
    pub fn file_mut(&mut self) -> Option<io::Result<&mut File>> {
        match &mut self.storage {
            Storage::Memory(_) => None,
            Storage::File(file) => Some(file.rewind()),
        }
    }

    /// Copies the whole body out, whichever storage backs it.
    pub fn to_bytes(&mut self) -> io::Result<Bytes> {
        match &mut self.storage {
            Storage::Memory(bytes) => Ok(Bytes::copy_from_slice(&bytes[..])),
            Storage::File(file) => file.read_to_vec().map(Bytes::from),
        }
    }

    /// Consumes the buffer into its bytes. A spill file is read back and
    /// removed.
    pub fn into_bytes(self) -> io::Result<Bytes> {
        match self.storage {
            Storage::Memory(bytes) => Ok(bytes.freeze()),
            Storage::File(mut file) => file.read_to_vec().map(Bytes::from),
        }
    }
}
