use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::format::{decode_line, encode_record, DecodedLine, LOG_HEADER};
use crate::domain::{AllocationRecord, LogStoreError};
use crate::ports::outbound::{AllocationLog, AppendReceipt, LogFingerprint};

/// Line-oriented allocation log on disk.
///
/// Every append is flushed with `sync_data` before it is reported as
/// committed. Reads tolerate anything an operator may have typed into the
/// file: invalid UTF-8 is replaced, unrecognized lines are skipped.
#[derive(Debug)]
pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    /// Open the log at `path`, creating it with the header on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LogStoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };

        match fs::metadata(&store.path) {
            Ok(metadata) => {
                info!(
                    path = %store.path.display(),
                    bytes = metadata.len(),
                    "Found existing allocation log"
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                store.initialize()?;
                info!(path = %store.path.display(), "Created allocation log");
            }
            Err(e) => return Err(LogStoreError::io("open", e)),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header if the file does not exist. Returns true if created.
    fn initialize(&self) -> Result<bool, LogStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LogStoreError::io("initialize", e))?;
            }
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                file.write_all(LOG_HEADER.as_bytes())
                    .and_then(|_| file.sync_all())
                    .map_err(|e| LogStoreError::io("initialize", e))?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(LogStoreError::io("initialize", e)),
        }
    }

    fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
        if len == 0 {
            return Ok(true);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    fn append_line(&self, record: &AllocationRecord) -> io::Result<AppendReceipt> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;
        let before = fingerprint_of(&file.metadata()?);
        let len = before.len;

        let mut line = String::new();
        if !Self::ends_with_newline(&mut file, len)? {
            warn!(path = %self.path.display(), "Allocation log has an unterminated last line; closing it");
            line.push('\n');
        }
        line.push_str(&encode_record(record));

        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        Ok(AppendReceipt {
            bytes_written: line.len() as u64,
            previous: Some(before),
            fingerprint: Some(fingerprint_of(&file.metadata()?)),
        })
    }
}

fn fingerprint_of(metadata: &Metadata) -> LogFingerprint {
    LogFingerprint {
        len: metadata.len(),
        modified: metadata.modified().ok(),
    }
}

impl AllocationLog for FileLogStore {
    fn append(&self, record: &AllocationRecord) -> Result<AppendReceipt, LogStoreError> {
        if self.initialize()? {
            warn!(path = %self.path.display(), "Allocation log was missing; recreated before append");
        }
        self.append_line(record)
            .map_err(|e| LogStoreError::io("append", e))
    }

    fn read_all(&self) -> Result<Vec<AllocationRecord>, LogStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Allocation log missing; starting from an empty history");
                self.initialize()?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(LogStoreError::io("read", e)),
        };

        let content = String::from_utf8_lossy(&bytes);
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (idx, line) in content.lines().enumerate() {
            match decode_line(line) {
                DecodedLine::Record(record) => records.push(record),
                DecodedLine::Malformed => {
                    skipped += 1;
                    warn!(line = idx + 1, content = line, "Skipping malformed allocation log entry");
                }
                DecodedLine::NotARecord => {}
            }
        }

        debug!(
            path = %self.path.display(),
            records = records.len(),
            skipped,
            "Read allocation log"
        );
        Ok(records)
    }

    fn fingerprint(&self) -> Result<Option<LogFingerprint>, LogStoreError> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(Some(fingerprint_of(&metadata))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LogStoreError::io("stat", e)),
        }
    }
}
