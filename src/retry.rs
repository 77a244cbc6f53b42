//! Bounded retry and request pacing.
//!
//! Sleeping goes through the [`Sleeper`] trait so the drivers can be tested
//! without waiting on a real clock.

use std::thread;
use std::time::Duration;

use tracing::warn;

/// Something that can pause the current run.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// How many times to try an operation and how long to wait between tries.
///
/// `max_attempts` counts the first try, so `1` means "never retry".
/// A value of `0` is treated as `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `op` until it succeeds, fails with an error `retryable` rejects,
    /// or the attempt budget is spent. Returns the last result.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, E, S, R, F>(&self, sleeper: &mut S, retryable: R, mut op: F) -> Result<T, E>
    where
        S: Sleeper + ?Sized,
        R: Fn(&E) -> bool,
        F: FnMut(u32) -> Result<T, E>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && retryable(&e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
                        "{e}; retrying"
                    );
                    sleeper.sleep(self.delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Records requested sleeps instead of sleeping.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub sleeps: Vec<Duration>,
}

#[cfg(test)]
impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
