//! Cleanup driver: delete everything the creation log records.
//!
//! The log is consumed as a work queue. Every recorded object gets a delete
//! call (retried while the service is rate limiting), and afterwards the log
//! is rewritten with only the entries that still exist remotely. Running
//! cleanup again therefore only retries what failed last time.

use std::time::Duration;

use tracing::{info, warn};

use crate::api::{Megaverse, RemoteError};
use crate::model::GridObject;
use crate::retry::{RetryPolicy, Sleeper};
use crate::storage::{self, CreationLog, LogLine};

/// Default pause between objects.
pub const DEFAULT_OBJECT_DELAY: Duration = Duration::from_millis(200);

/// Tunables for a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Attempts per object and the wait after a rate-limited attempt.
    pub retry: RetryPolicy,
    /// Pause between one object and the next.
    pub object_delay: Duration,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            object_delay: DEFAULT_OBJECT_DELAY,
        }
    }
}

/// An object that could not be deleted this run.
#[derive(Debug)]
pub struct DeleteFailure {
    pub object: GridObject,
    pub error: RemoteError,
}

/// What a cleanup run did.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failures: Vec<DeleteFailure>,
    /// Log lines that couldn't be decoded and were carried over untouched.
    pub unreadable: usize,
}

impl CleanupReport {
    /// Entries left in the log for the next run.
    pub fn remaining(&self) -> usize {
        self.failures.len() + self.unreadable
    }
}

#[derive(Debug)]
pub enum CleanupOutcome {
    /// No log to work from.
    NothingToDo,
    Finished(CleanupReport),
}

/// Delete every object in `log`, then shrink the log to what's left.
///
/// A missing or unreadable log is not an error. Only a failure to rewrite
/// the log is returned as one.
pub fn cleanup<M, S>(
    api: &M,
    log: &CreationLog,
    options: &CleanupOptions,
    sleeper: &mut S,
) -> storage::Result<CleanupOutcome>
where
    M: Megaverse + ?Sized,
    S: Sleeper + ?Sized,
{
    let lines = match log.load() {
        Ok(Some(lines)) => lines,
        Ok(None) => {
            info!(path = %log.path().display(), "log file not found, nothing to clean up");
            return Ok(CleanupOutcome::NothingToDo);
        }
        Err(e) => {
            warn!("could not read log, nothing to clean up: {e}");
            return Ok(CleanupOutcome::NothingToDo);
        }
    };

    let total = lines.len();
    info!(total, "cleaning up objects");

    let mut report = CleanupReport::default();
    let mut kept = Vec::new();

    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            sleeper.sleep(options.object_delay);
        }
        let n = i + 1;

        let object = match &line {
            LogLine::Object { object, .. } => *object,
            LogLine::Unreadable { reason, .. } => {
                warn!("Skipping unreadable log entry {n}/{total}: {reason}");
                report.unreadable += 1;
                kept.push(line);
                continue;
            }
        };

        let result = options.retry.run(sleeper, RemoteError::is_rate_limited, |_| {
            api.delete(&object)
        });

        match result {
            Ok(()) => {
                report.deleted += 1;
                info!("Deleted {object} ({n}/{total})");
            }
            Err(error) => {
                warn!("Error deleting {object}: {error}");
                report.failures.push(DeleteFailure { object, error });
                kept.push(line);
            }
        }
    }

    log.rewrite(&kept)?;

    if kept.is_empty() {
        info!(deleted = report.deleted, "all objects deleted, log cleared");
    } else {
        warn!(
            deleted = report.deleted,
            remaining = report.remaining(),
            "some objects remain; run cleanup again to retry"
        );
    }
    Ok(CleanupOutcome::Finished(report))
}
