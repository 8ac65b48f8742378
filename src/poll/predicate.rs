//! Block until a remote resource reaches a target state.

use crate::cloud::traits::{CloudError, CloudResult, PollTarget};
use crate::poll::policy::PollConfig;
use slog::{Logger, debug, o, trace, warn};
use std::time::Instant;

/// Classification of one read of the remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Not there yet, read again later.
    Pending,
    /// The target condition holds.
    Reached,
    /// The resource reports a state it can never leave.
    Failed(String),
}

/// States of one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Pending,
    Reached,
    TimedOut,
    Failed,
}

/// Re-reads a remote state on the calling thread until it matches.
///
/// The read step is an injected closure, so one poller serves every
/// provider and resource type.
#[derive(Debug, Clone)]
pub struct Poller {
    config: PollConfig,
    logger: Logger,
}

impl Poller {
    /// # Errors
    ///
    /// Returns `InvalidInput` if the poll configuration is invalid.
    pub fn new(config: PollConfig, logger: Logger) -> CloudResult<Self> {
        config.validate()?;
        Ok(Self { config, logger })
    }

    #[must_use]
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `target` until `classify` reports [`Check::Reached`] or the
    /// timeout expires.
    ///
    /// The first read happens immediately. A `NotFound` read counts as
    /// pending: the resource may not have propagated yet.
    ///
    /// Returns `Ok(true)` once reached and `Ok(false)` on timeout.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` as soon as `classify` reports [`Check::Failed`],
    /// and any read error other than `NotFound` unchanged.
    pub fn await_condition<T, R, C>(
        &self,
        target: &PollTarget,
        mut read: R,
        classify: C,
    ) -> CloudResult<bool>
    where
        R: FnMut(&PollTarget) -> CloudResult<T>,
        C: Fn(&T) -> Check,
    {
        let logger = self.logger.new(o!("target" => target.to_string()));
        let timeout = self.config.timeout();
        let mut delays = self.config.policy.delays();
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let check = match read(target) {
                Ok(state) => classify(&state),
                Err(error) if error.is_not_found() => {
                    trace!(logger, "Target not visible yet"; "attempt" => attempts);
                    Check::Pending
                }
                Err(error) => return Err(error),
            };

            match check {
                Check::Reached => {
                    debug!(
                        logger, "Target state reached";
                        "state" => ?PollState::Reached,
                        "attempts" => attempts,
                        "elapsed" => ?started.elapsed()
                    );
                    return Ok(true);
                }
                Check::Failed(reason) => {
                    warn!(
                        logger, "Target entered a terminal failure state";
                        "state" => ?PollState::Failed,
                        "reason" => &reason,
                        "attempts" => attempts
                    );
                    return Err(CloudError::illegal_state(format!(
                        "{target} entered a terminal state: {reason}"
                    )));
                }
                Check::Pending => {}
            }

            let elapsed = started.elapsed();
            let Some(remaining) = timeout.checked_sub(elapsed).filter(|left| !left.is_zero()) else {
                warn!(
                    logger, "Gave up waiting for target state";
                    "state" => ?PollState::TimedOut,
                    "attempts" => attempts,
                    "timeout" => ?timeout
                );
                return Ok(false);
            };

            let delay = delays.next().map_or(remaining, |delay| delay.min(remaining));
            trace!(
                logger, "Target still pending";
                "state" => ?PollState::Pending, "attempt" => attempts, "delay" => ?delay
            );
            std::thread::sleep(delay);
        }
    }
}
