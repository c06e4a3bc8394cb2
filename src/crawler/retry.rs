//! Retry controller
//!
//! | Failure | Action |
//! |---------|--------|
//! | Transport error | Retry immediately, up to `max_retries` |
//! | Body read error | Retry immediately, up to `max_retries` |
//! | HTTP 503 | Retry after backoff, without limit |
//! | Any other HTTP status >= 400 | Give up |

use std::time::Duration;

/// Delays applied before repeating a 503 response, indexed by attempt - 1.
/// The last entry is repeated for every later attempt.
pub const BACKOFF_SCHEDULE_MS: [u64; 6] = [200, 500, 1000, 2000, 5000, 8000];

/// HTTP status that signals rate limiting
pub const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// Class of a failed fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The request could not be sent or no response arrived
    Transport,
    /// A response arrived but its body could not be read
    Body,
    /// The server answered with an HTTP error status
    Status(u16),
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Repeat the request right away
    RetryNow,
    /// Repeat the request after sleeping
    RetryAfter(Duration),
    /// Stop; the resource has failed
    GiveUp,
}

/// Returns the delay before repeat number `attempt` of a 503 response
pub fn backoff_delay(attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let index = (attempt as usize - 1).min(BACKOFF_SCHEDULE_MS.len() - 1);
    Duration::from_millis(BACKOFF_SCHEDULE_MS[index])
}

/// Retry policy for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Maximum retries for transport and body failures
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decides how to continue after a failure
    ///
    /// `attempts` is the resource's failure counter including this failure.
    pub fn decide(&self, class: FailureClass, attempts: u32) -> RetryDecision {
        match class {
            FailureClass::Transport | FailureClass::Body => {
                if attempts > self.max_retries {
                    RetryDecision::GiveUp
                } else {
                    RetryDecision::RetryNow
                }
            }
            FailureClass::Status(STATUS_SERVICE_UNAVAILABLE) => {
                RetryDecision::RetryAfter(backoff_delay(attempts))
            }
            FailureClass::Status(_) => RetryDecision::GiveUp,
        }
    }
}
