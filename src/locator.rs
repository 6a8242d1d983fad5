use std::time::Duration;

use thiserror::Error;

use crate::traversal::TraversalError;

/// Attempt budget for one locate run. Counted in attempts, not wall-clock
/// time: at the nominal frame cadence this works out to about a minute, but a
/// slower tick stretches it.
pub const MAX_ATTEMPTS: u32 = 3600;

/// Poll cadence for the locator. One attempt runs per tick.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval: Duration,
}

impl Ticker {
    /// Nominal display-refresh cadence (60 ticks per second).
    pub fn frame() -> Self {
        Self {
            interval: Duration::from_millis(16),
        }
    }

    /// Zero-delay ticks. Keeps the attempt accounting but lets tests burn
    /// through the full budget instantly.
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
        }
    }

    pub async fn wait(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::frame()
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("gave up after {MAX_ATTEMPTS} attempts")]
    Timeout,
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

/// Polls `attempt` once per tick until it succeeds, fails fatally, or the
/// attempt budget runs out. A retryable failure (an intermediate node that is
/// not there yet) consumes one attempt; any other failure aborts on the spot.
///
/// Ordering is attempt, wait one tick, attempt: no wait after the final
/// attempt. Dropping the returned future cancels the poll; there is no other
/// cancel path.
pub async fn locate<T, F>(mut attempt: F, ticker: &Ticker) -> Result<T, LocateError>
where
    F: FnMut() -> Result<T, TraversalError>,
{
    for n in 1..=MAX_ATTEMPTS {
        match attempt() {
            Ok(found) => return Ok(found),
            Err(err) if err.is_retryable() => {
                if n == MAX_ATTEMPTS {
                    break;
                }
                ticker.wait().await;
            }
            Err(err) => return Err(LocateError::Traversal(err)),
        }
    }
    Err(LocateError::Timeout)
}
