//! Request body storage.
//!
//! A body is held in one of two places, picked once per request from the
//! declared `Content-Length`:
//!
//! - [`BodyKind::Memory`]: a `BytesMut` sized to the declared length, for
//!   bodies up to the configured in-memory threshold
//! - [`BodyKind::File`]: a temporary file, for anything larger, so adversarial
//!   uploads cannot grow process memory
//!
//! Requests without a body never allocate storage ([`BodyKind::None`]).
//!
//! [`BodyBuffer`] enforces the maximum content length on every write, and a
//! file-backed buffer deletes its file when dropped.

mod body_buffer;
mod temp_file;

pub use body_buffer::BodyBuffer;
pub use body_buffer::BodyKind;
pub use temp_file::TempFile;
