//! Ready-made conditions over server status and deployment flags.

use crate::cloud::traits::{CloudResult, ComputeApi, Deployment, PollTarget, ServerStatus};
use crate::poll::predicate::{Check, Poller};

/// Expected deployment flags. `None` means "either value is fine".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagTarget {
    pub started: Option<bool>,
    pub deployed: Option<bool>,
}

impl FlagTarget {
    /// Deployed and started.
    #[must_use]
    pub const fn running() -> Self {
        Self {
            started: Some(true),
            deployed: Some(true),
        }
    }

    /// Deployed, whatever the power state.
    #[must_use]
    pub const fn deployed() -> Self {
        Self {
            started: None,
            deployed: Some(true),
        }
    }

    /// Neither deployed nor started.
    #[must_use]
    pub const fn undeployed() -> Self {
        Self {
            started: Some(false),
            deployed: Some(false),
        }
    }

    #[must_use]
    pub fn matches(&self, deployment: &Deployment) -> bool {
        self.started.is_none_or(|started| started == deployment.started)
            && self.deployed.is_none_or(|deployed| deployed == deployment.deployed)
    }
}

/// Exact match on `expected`; a terminal failure status fails the wait.
#[must_use]
pub fn classify_status(status: ServerStatus, expected: ServerStatus) -> Check {
    if status == expected {
        Check::Reached
    } else if status.is_terminal_failure() {
        Check::Failed(format!("{status:?}"))
    } else {
        Check::Pending
    }
}

impl Poller {
    /// Wait until the status read by `read` equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the server reports [`ServerStatus::Failed`]
    /// while another status is expected, and any non-`NotFound` read error.
    pub fn await_status<R>(
        &self,
        target: &PollTarget,
        read: R,
        expected: ServerStatus,
    ) -> CloudResult<bool>
    where
        R: FnMut(&PollTarget) -> CloudResult<ServerStatus>,
    {
        self.await_condition(target, read, |status| classify_status(*status, expected))
    }

    /// Wait until the deployment flags read by `read` match `flags`.
    ///
    /// # Errors
    ///
    /// Returns any non-`NotFound` read error.
    pub fn await_deployment<R>(
        &self,
        target: &PollTarget,
        read: R,
        flags: FlagTarget,
    ) -> CloudResult<bool>
    where
        R: FnMut(&PollTarget) -> CloudResult<Deployment>,
    {
        self.await_condition(target, read, |deployment| {
            if flags.matches(deployment) {
                Check::Reached
            } else {
                Check::Pending
            }
        })
    }

    /// [`await_status`](Self::await_status) reading through a [`ComputeApi`].
    ///
    /// # Errors
    ///
    /// See [`await_status`](Self::await_status).
    pub fn await_server(
        &self,
        api: &dyn ComputeApi,
        target: &PollTarget,
        expected: ServerStatus,
    ) -> CloudResult<bool> {
        self.await_status(target, |t| api.server_status(t), expected)
    }

    /// [`await_deployment`](Self::await_deployment) reading through a [`ComputeApi`].
    ///
    /// # Errors
    ///
    /// See [`await_deployment`](Self::await_deployment).
    pub fn await_deployed(
        &self,
        api: &dyn ComputeApi,
        target: &PollTarget,
        flags: FlagTarget,
    ) -> CloudResult<bool> {
        self.await_deployment(target, |t| api.deployment(t), flags)
    }
}
