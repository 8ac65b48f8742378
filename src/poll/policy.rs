//! Delay policies between two reads of a remote state.

use crate::cloud::traits::{CloudError, CloudResult, ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait between two polls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollPolicy {
    /// The same delay between every attempt.
    Fixed { period_ms: u64 },
    /// Start at `initial_ms`, multiply after every attempt, never exceed `max_ms`.
    Backoff {
        initial_ms: u64,
        max_ms: u64,
        #[serde(default = "PollPolicy::default_multiplier")]
        multiplier: f64,
    },
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::Fixed { period_ms: 1000 }
    }
}

impl PollPolicy {
    fn default_multiplier() -> f64 {
        2.0
    }

    #[must_use]
    pub const fn fixed(period: Duration) -> Self {
        Self::Fixed {
            period_ms: duration_ms(period),
        }
    }

    #[must_use]
    pub fn backoff(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self::Backoff {
            initial_ms: duration_ms(initial),
            max_ms: duration_ms(max),
            multiplier,
        }
    }

    /// The endless sequence of delays this policy produces.
    #[must_use]
    pub fn delays(&self) -> Delays {
        match *self {
            Self::Fixed { period_ms } => Delays {
                next: Duration::from_millis(period_ms),
                max: Duration::from_millis(period_ms),
                multiplier: 1.0,
            },
            Self::Backoff {
                initial_ms,
                max_ms,
                multiplier,
            } => Delays {
                next: Duration::from_millis(initial_ms.min(max_ms)),
                max: Duration::from_millis(max_ms),
                multiplier,
            },
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero period, a cap below the initial
    /// delay, or a multiplier below 1.
    pub fn validate(&self) -> CloudResult<()> {
        match *self {
            Self::Fixed { period_ms: 0 } | Self::Backoff { initial_ms: 0, .. } => Err(
                CloudError::new(ErrorKind::InvalidInput, "Poll period must be positive"),
            ),
            Self::Backoff {
                initial_ms, max_ms, ..
            } if max_ms < initial_ms => Err(CloudError::new(
                ErrorKind::InvalidInput,
                format!("Backoff cap {max_ms}ms is below the initial delay {initial_ms}ms"),
            )),
            Self::Backoff { multiplier, .. } if !multiplier.is_finite() || multiplier < 1.0 => {
                Err(CloudError::new(
                    ErrorKind::InvalidInput,
                    format!("Backoff multiplier must be a finite number >= 1, got {multiplier}"),
                ))
            }
            _ => Ok(()),
        }
    }
}

const fn duration_ms(duration: Duration) -> u64 {
    // Partial milliseconds round up, durations beyond u64 milliseconds are clamped.
    let mut ms = duration.as_millis();
    if duration.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    if ms > u64::MAX as u128 {
        u64::MAX
    } else {
        ms as u64
    }
}

/// Iterator over the delays of a [`PollPolicy`].
#[derive(Clone, Debug)]
pub struct Delays {
    next: Duration,
    max: Duration,
    multiplier: f64,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        if self.multiplier > 1.0 && self.multiplier.is_finite() {
            self.next = Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
                .map_or(self.max, |grown| grown.min(self.max));
        }
        Some(current)
    }
}

/// Poll policy plus the wall-clock budget of one wait.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default)]
    pub policy: PollPolicy,

    #[serde(default = "PollConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            policy: PollPolicy::default(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl PollConfig {
    fn default_timeout_ms() -> u64 {
        300_000
    }

    #[must_use]
    pub fn new(policy: PollPolicy, timeout: Duration) -> Self {
        Self {
            policy,
            timeout_ms: duration_ms(timeout),
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` if the policy is invalid.
    pub fn validate(&self) -> CloudResult<()> {
        self.policy.validate()
    }
}
