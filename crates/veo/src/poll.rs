//! Bounded, cancellable polling of a long-running operation.
//!
//! [`poll_until_done`] waits `interval` between status checks and gives up
//! after `max_polls` checks or as soon as the [`CancellationToken`] fires.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::VeoApiError;
use crate::error::GenerationError;
use crate::messages::Operation;

/// Default delay between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of status checks before giving up (15 minutes at 10 s).
pub const DEFAULT_MAX_POLLS: u32 = 90;

/// Tunable parameters for operation polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

impl PollConfig {
    /// Worst-case time spent waiting on one operation.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_polls
    }
}

/// Poll `operation` until it reports `done`.
///
/// `check` fetches the latest state for an operation name. An operation that
/// is already done is returned without any check.
pub async fn poll_until_done<F, Fut>(
    mut operation: Operation,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<Operation, GenerationError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Operation, VeoApiError>>,
{
    let mut polls = 0u32;

    while !operation.done {
        let name = operation.name.clone();

        if polls >= config.max_polls {
            tracing::warn!(operation = %name, polls, "Poll budget exhausted");
            return Err(GenerationError::Timeout {
                operation: name,
                polls,
            });
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(GenerationError::Cancelled { operation: name });
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        polls += 1;
        let mut next = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(GenerationError::Cancelled { operation: name });
            }
            result = check(name.clone()) => result?,
        };

        if next.name.is_empty() {
            next.name = name;
        }
        tracing::debug!(operation = %next.name, polls, done = next.done, "Polled operation");
        operation = next;
    }

    Ok(operation)
}
