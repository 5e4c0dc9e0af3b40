use tokio::time::Duration;

use crate::common::{error, info, warn};
use crate::core::Probe;
use crate::{KvseedError, Result};

/// The store never passed a health check within the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unreachable {
    pub attempts: u32,
}

impl From<Unreachable> for KvseedError {
    fn from(unreachable: Unreachable) -> Self {
        KvseedError::Unreachable {
            attempts: unreachable.attempts,
        }
    }
}

// Waits for a store that may still be starting up.
pub struct RetryConnector<P> {
    probe: P,
    fail_limit: i32,
    wait_time: Duration,
}

impl<P> RetryConnector<P>
where
    P: Probe,
{
    pub fn new(probe: P, fail_limit: i32, wait_time: Duration) -> Self {
        Self {
            probe,
            fail_limit,
            wait_time,
        }
    }

    /// Probe up to `fail_limit` times, sleeping `wait_time` before each
    /// attempt, and open the store handle after the first healthy probe.
    /// Failing to open the handle counts as a failed attempt.
    pub async fn connect<S, F>(&self, mut open: F) -> Result<S, Unreachable>
    where
        F: FnMut() -> Result<S>,
    {
        let limit = u32::try_from(self.fail_limit).unwrap_or(0);
        let mut failures = 0;

        while failures < limit {
            tokio::time::sleep(self.wait_time).await;

            match self.probe.check().await {
                Ok(()) => match open() {
                    Ok(store) => {
                        info!(attempt = failures + 1, "Store is up");
                        return Ok(store);
                    }
                    Err(err) => warn!(cause = %err, "Open store handle"),
                },
                Err(err) => {
                    info!(
                        cause = %err,
                        attempt = failures + 1,
                        limit,
                        "Waiting for store to fully start up..."
                    );
                }
            }

            failures += 1;
        }

        error!(
            attempts = failures,
            wait_ms = self.wait_time.as_millis() as u64,
            "Timeout for connecting to store"
        );
        Err(Unreachable { attempts: failures })
    }
}
