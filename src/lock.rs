//! Account file locking and crash-safe record replacement
//!
//! Each account record `<key>.json` has a sibling `<key>.json.lock`. Holding
//! an exclusive fs2 lock on it is what makes an account's read-modify-write
//! a critical section, across threads and processes alike.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Pause between attempts on a contended lock
const RETRY_PAUSE: Duration = Duration::from_millis(20);

/// Exclusive hold on one account; released on drop.
#[derive(Debug)]
pub struct AccountLock {
    file: File,
}

impl AccountLock {
    /// Wait up to `timeout` for the lock at `path`, creating the lock file
    /// (and its directory) on first use.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let deadline = Instant::now() + timeout;
        let mut attempts = 0u32;
        while !try_lock(&file)? {
            if Instant::now() >= deadline {
                warn!(path = %path.display(), attempts, "account lock timed out");
                return Err(Error::LockFailed(path.to_path_buf()));
            }
            attempts += 1;
            thread::sleep(RETRY_PAUSE);
        }
        if attempts > 0 {
            debug!(path = %path.display(), attempts, "account lock acquired after contention");
        }
        Ok(Self { file })
    }
}

impl Drop for AccountLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// `Ok(false)` when another holder has the lock.
fn try_lock(file: &File) -> Result<bool> {
    match file.try_lock_exclusive() {
        Ok(()) => Ok(true),
        Err(err) if is_contended(&err) => Ok(false),
        Err(err) => Err(Error::Io(err)),
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Lock file guarding `path`: `<path>.lock`
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Replace `path` with `data` so that readers see either the old or the
/// new record, never a torn one. Callers hold the account lock.
pub fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = dir.join(format!(".{file_name}.{}.tmp", std::process::id()));

    let mut file = File::create(&staging)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&staging, path)?;
    Ok(())
}
