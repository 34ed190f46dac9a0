//! Bounded polling for asynchronous state checks.
//!
//! This module provides [`poll_until`], a reusable retry loop for waiting on
//! remote state to settle: an optional initial delay, a fixed interval
//! between tries, a hard try budget, and an optional stability requirement
//! (the predicate must hold for N additional consecutive observations before
//! the poll resolves).

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, WaitError};

/// Options controlling a bounded poll.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Slept once before the first predicate call.
    pub initial_delay: Duration,
    /// Slept between predicate calls.
    pub interval: Duration,
    /// Maximum consecutive failing observations before giving up. Passing
    /// observations reset the budget.
    pub max_tries: u32,
    /// Additional consecutive successes required after the first before the
    /// poll resolves. Zero means a single success suffices.
    pub required_consecutive_passes: u32,
    /// Human-readable description of the awaited condition, used in the
    /// timeout error and log lines.
    pub description: String,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            interval: Duration::from_secs(5),
            max_tries: 60,
            required_consecutive_passes: 0,
            description: String::from("condition"),
        }
    }
}

impl PollOptions {
    /// Creates poll options for the given condition description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Sets the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the interval between tries.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the maximum number of tries.
    #[must_use]
    pub const fn with_max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries;
        self
    }

    /// Sets the number of additional consecutive passes required.
    #[must_use]
    pub const fn with_required_consecutive_passes(mut self, passes: u32) -> Self {
        self.required_consecutive_passes = passes;
        self
    }
}

/// Polls `predicate` until it holds, with a bounded failure budget.
///
/// A passing observation increments a stability counter and is re-checked
/// immediately; the poll resolves once the counter exceeds
/// `required_consecutive_passes`. A failing observation resets the counter
/// to zero, consumes one try, and sleeps `interval` before the next check.
/// Passes reset the try budget, so `max_tries` bounds consecutive failures,
/// not total predicate calls. Predicate errors abort the poll immediately.
///
/// # Errors
///
/// Returns [`WaitError::PollTimeout`] after `max_tries` consecutive failing
/// observations, or the predicate's own error if one occurs.
pub async fn poll_until<F, Fut>(mut predicate: F, options: &PollOptions) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if !options.initial_delay.is_zero() {
        tokio::time::sleep(options.initial_delay).await;
    }

    let mut consecutive_passes: u32 = 0;
    let mut failed_tries: u32 = 0;

    loop {
        if predicate().await? {
            consecutive_passes += 1;
            failed_tries = 0;
            debug!(
                "Poll for {} passed ({consecutive_passes} consecutive)",
                options.description
            );

            if consecutive_passes > options.required_consecutive_passes {
                return Ok(());
            }
            // Re-check immediately while the condition keeps holding.
        } else {
            if consecutive_passes > 0 {
                debug!(
                    "Poll for {} regressed, resetting stability counter",
                    options.description
                );
            }
            consecutive_passes = 0;
            failed_tries += 1;

            if failed_tries >= options.max_tries {
                return Err(WaitError::PollTimeout {
                    description: options.description.clone(),
                    tries: failed_tries,
                }
                .into());
            }

            tokio::time::sleep(options.interval).await;
        }
    }
}
