use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{trace, warn};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A read/write file under the spill directory, removed when dropped.
#[derive(Debug)]
pub struct TempFile {
    file: File,
    path: PathBuf,
}

impl TempFile {
    /// Creates a new, uniquely named file inside `dir`.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("http-ingest-{}-{id}.body", process::id()));
        let file = OpenOptions::new().read(true).write(true).create_new(true).open(&path)?;
        trace!(path = %path.display(), "created body spill file");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    /// Reads the whole file from the start. The write position is left at the
    /// end afterwards.
    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        self.file.flush()?;
        let end = self.file.seek(SeekFrom::End(0))?;
        self.file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::with_capacity(usize::try_from(end).unwrap_or(0));
        self.file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Rewinds the file and hands it over for reading. The file is still
    /// removed from disk when this `TempFile` is dropped.
    pub fn rewind(&mut self) -> io::Result<&mut File> {
        self.file.flush()?;
        self.file.seek(SeekFrom::Start(0))?;
        Ok(&mut self.file)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), cause = %e, "failed to remove body spill file");
        }
    }
}
