//! Creation driver: push a list of objects to the megaverse.
//!
//! Objects are created one at a time, in order, with a fixed pause between
//! calls. Each success is appended to the creation log before moving on. A
//! failed create is reported and skipped; nothing is rolled back or retried.

use std::time::Duration;

use tracing::{info, warn};

use crate::api::{Megaverse, RemoteError};
use crate::model::GridObject;
use crate::retry::Sleeper;
use crate::storage::{self, CreationLog};

/// Default pause between create calls.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// An object the service refused to create.
#[derive(Debug)]
pub struct CreateFailure {
    pub object: GridObject,
    pub error: RemoteError,
}

/// What a creation run did.
#[derive(Debug, Default)]
pub struct CreateReport {
    pub created: usize,
    pub failures: Vec<CreateFailure>,
}

/// Create every object in `objects`, logging each success to `log`.
///
/// Only a log write failure stops the run early: an object that exists
/// remotely but isn't in the log could never be cleaned up.
pub fn create_objects<M, S>(
    api: &M,
    objects: &[GridObject],
    log: &CreationLog,
    delay: Duration,
    sleeper: &mut S,
) -> storage::Result<CreateReport>
where
    M: Megaverse + ?Sized,
    S: Sleeper + ?Sized,
{
    let total = objects.len();
    let mut report = CreateReport::default();
    info!(total, "creating objects");

    for (i, object) in objects.iter().enumerate() {
        if i > 0 {
            sleeper.sleep(delay);
        }
        let n = i + 1;

        match api.create(object) {
            Ok(()) => {
                log.append(object)?;
                report.created += 1;
                info!("Created {object} ({n}/{total})");
            }
            Err(error) => {
                warn!(
                    kind = %object.kind(),
                    position = %object.position(),
                    "Error creating {object}: {error}"
                );
                report.failures.push(CreateFailure {
                    object: *object,
                    error,
                });
            }
        }
    }

    info!(
        created = report.created,
        failed = report.failures.len(),
        "creation finished"
    );
    Ok(report)
}
