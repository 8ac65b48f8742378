//! Retry-until-state polling.
//!
//! A [`Poller`] blocks the calling thread, re-reading a remote state until it
//! matches, the resource reports a terminal failure, or the configured
//! wall-clock budget runs out.
//!
//! | Outcome           | Result                   |
//! |-------------------|--------------------------|
//! | target reached    | `Ok(true)`               |
//! | timeout           | `Ok(false)`              |
//! | terminal failure  | `Err(IllegalState)`      |
//! | transport failure | `Err(..)`, not retried   |
//!
//! ```
//! use stratus::cloud::{FakeCompute, PollTarget, ServerStatus};
//! use stratus::poll::{PollConfig, PollPolicy, Poller};
//! use std::time::Duration;
//!
//! # fn main() -> stratus::cloud::CloudResult<()> {
//! let compute = FakeCompute::new();
//! let target = PollTarget::from("web-1");
//! compute.script_status(
//!     target.clone(),
//!     vec![Ok(ServerStatus::Building), Ok(ServerStatus::Running)],
//! );
//!
//! let config = PollConfig::new(
//!     PollPolicy::fixed(Duration::from_millis(10)),
//!     Duration::from_secs(1),
//! );
//! let poller = Poller::new(config, stratus::logging::discard())?;
//! assert!(poller.await_server(&compute, &target, ServerStatus::Running)?);
//! # Ok(())
//! # }
//! ```

pub mod policy;
pub mod predicate;
pub mod status;

pub use policy::{Delays, PollConfig, PollPolicy};
pub use predicate::{Check, PollState, Poller};
pub use status::{FlagTarget, classify_status};
