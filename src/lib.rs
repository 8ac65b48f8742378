//! # Stratus
//!
//! Coordination layers for **multi-provider cloud API clients**: the parts of
//! a provider binding that are not mechanical endpoint mapping.
//!
//! ## Key Features
//!
//! - **Fan-out listing** - enumerate racks, machines or templates across every
//!   datacenter at once on a shared, bounded worker pool
//! - **Positional join** - results always come back in scope order, whatever
//!   order the remote calls complete in
//! - **All-or-nothing** - one failing scope fails the listing; no silent partial results
//! - **State polling** - block until a server is running or a VM is deployed,
//!   with fixed or bounded-backoff delays and a hard wall-clock timeout
//! - **Fakes** - in-memory providers with injectable latency and failures
//! - **Request signing** - canonical query-string HMAC-SHA1 and basic auth
//!
//! ## Quick Start
//!
//! ```
//! use stratus::*;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let logger = logging::discard();
//! let executor = Executor::new(4)?;
//! let lister = FanOutLister::new(executor, logger);
//!
//! let inventory = Arc::new(FakeInventory::grid(2, 2, 2));
//! let context = ClientContext::new(
//!     "fake",
//!     "http://localhost",
//!     Arc::new(FakeCredentials::new("user", "secret")),
//! )?;
//!
//! let machines = ListMachines::new(inventory, context, lister).execute()?;
//! assert_eq!(machines.len(), 8);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Scopes
//!
//! A [`Scope`] is the partition a lister fans out over: a datacenter, a rack,
//! an enterprise. One remote call is issued per scope.
//!
//! ### Executor
//!
//! The [`Executor`] wraps one rayon pool. Build it once per process and share
//! it: its width bounds the number of concurrent remote calls across every
//! in-flight listing.
//!
//! ### Bound objects
//!
//! Listings return [`Bound<T>`] values: DTOs tied to the [`ClientContext`]
//! they were fetched with, so follow-up calls reuse the same provider and
//! credentials.
//!
//! ### Poller
//!
//! The [`Poller`] runs on the calling thread. It returns `Ok(true)` once the
//! target state is reached, `Ok(false)` on timeout, and fails immediately when
//! the resource reports a terminal failure.
//!
//! ## Module Overview
//!
//! - [`cloud`] - Provider traits, DTOs, errors and fakes
//! - [`context`] - Shared client context and bound domain objects
//! - [`executor`] - Shared worker pool
//! - [`strategy`] - Fan-out/join listers
//! - [`poll`] - Retry-until-state polling
//! - [`signing`] - Request signing helpers
//! - [`config`] - Configuration loading
//! - [`logging`] - `slog` setup

pub mod cloud;
pub mod config;
pub mod context;
pub mod executor;
pub mod logging;
pub mod poll;
pub mod signing;
pub mod strategy;

// General re-exports
pub use cloud::{
    CatalogApi, CloudCredentials, CloudError, CloudResult, ComputeApi, ErrorKind, FakeCompute,
    FakeCredentials, FakeInventory, InfrastructureApi, PollTarget, Scope,
};
pub use config::Config;
pub use context::{Bound, ClientContext, bind_all};
pub use executor::{Executor, ExecutorConfig};
pub use poll::{Check, FlagTarget, PollConfig, PollPolicy, Poller};
pub use signing::{QuerySigner, basic_auth_header, canonical_query};
pub use strategy::{FanOutLister, ListMachines, ListVirtualMachineTemplates};
