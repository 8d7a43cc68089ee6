//! # Pool Snapshot Writer
//!
//! Mirrors the current remaining quantities into a small text file for
//! operators. The file is regenerated from the log on every reconcile and
//! never read back.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::format::encode_snapshot;
use crate::domain::{LogStoreError, PoolState};
use crate::ports::outbound::SnapshotSink;

#[derive(Debug)]
pub struct FileSnapshotWriter {
    path: PathBuf,
}

impl FileSnapshotWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSink for FileSnapshotWriter {
    fn publish(&self, pool: &PoolState) -> Result<(), LogStoreError> {
        let err = |e: std::io::Error| LogStoreError::io("snapshot", e);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(err)?;
            }
        }

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).map_err(err)?;
        file.write_all(encode_snapshot(pool).as_bytes()).map_err(err)?;
        file.sync_all().map_err(err)?;
        fs::rename(&temp_path, &self.path).map_err(err)?;

        Ok(())
    }
}
