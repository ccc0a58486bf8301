use std::fs::OpenOptions;
use std::io::{self, Write};
use std::fs::File;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use parking_lot::Mutex;

use super::LedgerError;

/// Append-only byte log backing the ledger.
///
/// `header` is written first only when the log does not exist yet (or is
/// empty). The header check and the write happen as one step, so every block
/// lands contiguously.
pub trait AppendLog: Send + Sync {
    fn append_block(&self, header: &[u8], block: &[u8]) -> Result<(), LedgerError>;
}

/// Ledger file opened in append mode for every block.
///
/// Each append holds an exclusive OS lock on the file while it checks for the
/// header and writes, so separate processes sharing the ledger serialise too.
pub struct FileAppendLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl AppendLog for FileAppendLog {
    fn append_block(&self, header: &[u8], block: &[u8]) -> Result<(), LedgerError> {
        let _guard = self.lock.lock();

        let open_error = |source: io::Error| LedgerError::Open {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(open_error)?;

        FileExt::lock_exclusive(&file).map_err(open_error)?;
        let result = write_block(&mut file, header, block, &self.path);
        FileExt::unlock(&file).map_err(LedgerError::Write)?;
        result
    }
}

fn write_block(
    file: &mut File,
    header: &[u8],
    block: &[u8],
    path: &Path,
) -> Result<(), LedgerError> {
    let needs_header = file.metadata().map_err(LedgerError::Write)?.len() == 0;

    // One write per block so other appenders cannot split it.
    let mut buf = Vec::with_capacity(header.len() + block.len());
    if needs_header {
        log::info!("Creating ledger at {}", path.display());
        buf.extend_from_slice(header);
    }
    buf.extend_from_slice(block);

    file.write_all(&buf).map_err(LedgerError::Write)?;
    file.flush().map_err(LedgerError::Write)
}

/// In-memory log, handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    contents: Mutex<Option<Vec<u8>>>,
    fail: bool,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that already exists with the given contents.
    pub fn existing(contents: &str) -> Self {
        Self {
            contents: Mutex::new(Some(contents.as_bytes().to_vec())),
            fail: false,
        }
    }

    /// A log whose every append fails with an I/O error.
    pub fn failing() -> Self {
        Self {
            contents: Mutex::new(None),
            fail: true,
        }
    }

    pub fn exists(&self) -> bool {
        self.contents.lock().is_some()
    }

    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl AppendLog for InMemoryLog {
    fn append_block(&self, header: &[u8], block: &[u8]) -> Result<(), LedgerError> {
        if self.fail {
            return Err(LedgerError::Write(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "ledger is read-only",
            )));
        }

        let mut contents = self.contents.lock();
        let buf = contents.get_or_insert_with(Vec::new);
        if buf.is_empty() {
            buf.extend_from_slice(header);
        }
        buf.extend_from_slice(block);
        Ok(())
    }
}
