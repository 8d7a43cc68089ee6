//! # Data Directory Lock
//!
//! One process owns the allocation log at a time. The owner holds an
//! exclusive `fs2` lock on `<data_dir>/LOCK` and writes its PID into it.
//! The OS drops the lock when the owner exits, even on a crash.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

const LOCK_FILE: &str = "LOCK";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("cannot open lock file: {0}")]
    CreateFailed(#[source] io::Error),

    #[error("allocation log is owned by {} ({})", owner(.pid), .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("cannot record owner PID: {0}")]
    WriteFailed(#[source] io::Error),
}

fn owner(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("process {pid}"),
        None => "another process".to_string(),
    }
}

/// Held ownership of a data directory. Dropping it releases the lock and
/// removes the lock file.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl DataDirLock {
    /// Take the lock or fail immediately with `AlreadyLocked`.
    pub fn acquire(data_dir: &Path) -> Result<Self, LockError> {
        std::fs::create_dir_all(data_dir).map_err(LockError::CreateFailed)?;
        let path = data_dir.join(LOCK_FILE);

        // Opened without truncation so a refused attempt can still read the owner's PID
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(LockError::CreateFailed)?;

        if FileExt::try_lock_exclusive(&file).is_err() {
            let pid = std::fs::read_to_string(&path)
                .ok()
                .and_then(|text| text.trim().parse().ok());
            return Err(LockError::AlreadyLocked { pid, path });
        }

        let pid = std::process::id();
        file.set_len(0)
            .and_then(|_| writeln!(file, "{pid}"))
            .and_then(|_| file.sync_all())
            .map_err(LockError::WriteFailed)?;

        Ok(Self { file, path, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
