//! Provider-agnostic client abstractions.
//!
//! Each trait covers one category of provider endpoint the coordination layers
//! depend on, and comes with an in-memory fake:
//!
//! - [`InfrastructureApi`] - Datacenters, racks and machines
//! - [`CatalogApi`] - Enterprises and the templates they may deploy
//! - [`ComputeApi`] - Current state of servers and virtual machines
//!
//! ## Synchronous by Design
//!
//! Like the rest of the crate these traits block. Implementations can drive
//! an async HTTP client internally, but expose a blocking interface so that
//! calls can be fanned out on a rayon pool.
//!
//! ## Unit Testing with Fakes
//! ```
//! use stratus::cloud::*;
//!
//! # fn main() -> CloudResult<()> {
//! let inventory = FakeInventory::grid(2, 2, 2);
//! let datacenters = inventory.list_datacenters()?;
//! assert_eq!(datacenters.len(), 2);
//! assert_eq!(inventory.list_racks(&datacenters[0])?.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`CloudResult<T>`] where the error is [`CloudError`],
//! categorized by [`ErrorKind`]. `NotFound` has a special meaning for pollers:
//! a resource that is not visible yet is still pending.

pub mod fake;
pub mod helpers;
pub mod traits;

pub use fake::*;
pub use traits::*;
