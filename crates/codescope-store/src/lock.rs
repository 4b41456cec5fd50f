//! Advisory single-writer lock.
//!
//! The lock is a file next to the database recording the holder's PID and
//! acquisition time. A holder older than the stale threshold is treated as
//! abandoned (crashed indexer) and reclaimed.

use codescope_core::CodescopeError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locks older than this are considered abandoned.
const STALE_AFTER_SECS: i64 = 30 * 60;

/// Poll interval while waiting for a contended lock.
const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// An acquired writer lock; released on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct LockRecord {
    pid: u32,
    acquired_at: i64,
}

impl StoreLock {
    /// Acquire the lock at `path`, waiting up to `timeout` for a live
    /// holder to release it. Stale locks are reclaimed immediately.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, CodescopeError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
            {
                Ok(mut file) => {
                    let record = LockRecord {
                        pid: std::process::id(),
                        acquired_at: chrono::Utc::now().timestamp(),
                    };
                    let body = serde_json::to_string(&record)?;
                    file.write_all(body.as_bytes())?;
                    file.flush()?;
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    let holder = Self::read_holder(path);
                    if let Some(record) = &holder {
                        let age = chrono::Utc::now().timestamp() - record.acquired_at;
                        if age > STALE_AFTER_SECS {
                            tracing::warn!(
                                pid = record.pid,
                                age_secs = age,
                                "reclaiming stale store lock"
                            );
                            let _ = std::fs::remove_file(path);
                            continue;
                        }
                    } else {
                        // Unreadable lock file: treat as abandoned.
                        let _ = std::fs::remove_file(path);
                        continue;
                    }

                    if std::time::Instant::now() >= deadline {
                        return Err(CodescopeError::LockContention {
                            holder_pid: holder.map(|r| r.pid).unwrap_or(0),
                        });
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn read_holder(path: &Path) -> Option<LockRecord> {
        let body = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&body).ok()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to release store lock: {err}");
        }
    }
}
