//! Sliding-window throttle for upstream API requests.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Bounds the outbound request rate: in any trailing window of `period`, at
/// most `max_calls` acquisitions complete.
///
/// The limiter keeps a queue of monotonic acquisition timestamps behind a
/// single mutex. Each [`acquire`](Self::acquire) expires entries older than
/// `now - period`, then either records `now` and returns, or sleeps until the
/// oldest recorded timestamp leaves the window and retries. Safe to share
/// behind an `Arc` across tasks; release order among waiters is unspecified.
#[derive(Debug)]
pub struct RateLimiter {
    timestamps: Mutex<VecDeque<Instant>>,
    max_calls: usize,
    period: Duration,
}

impl RateLimiter {
    /// `max_calls` is clamped to at least one.
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            timestamps: Mutex::new(VecDeque::new()),
            max_calls: max_calls.max(1),
            period,
        }
    }

    /// Suspends the caller until one more upstream call may be issued, then
    /// records the acquisition. Cannot fail; only process termination aborts
    /// a waiter.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().await;
                let now = Instant::now();

                while let Some(&oldest) = timestamps.front() {
                    if now.duration_since(oldest) >= self.period {
                        timestamps.pop_front();
                    } else {
                        break;
                    }
                }

                if timestamps.len() < self.max_calls {
                    timestamps.push_back(now);
                    return;
                }

                match timestamps.front() {
                    Some(&oldest) => self.period.saturating_sub(now.duration_since(oldest)),
                    None => Duration::ZERO,
                }
                // lock drops here so other tasks can expire entries while we sleep
            };
            sleep(wait).await;
        }
    }
}
