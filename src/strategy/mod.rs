//! Fan-out/join listing strategies.
//!
//! A strategy enumerates a dependent collection across every root scope of
//! a provider (racks of all datacenters, templates of all datacenters of an
//! enterprise) using the shared [`Executor`](crate::executor::Executor).
//!
//! - [`FanOutLister`] - Generic one- and two-level fan-out with positional join
//! - [`ListMachines`] - Datacenters → racks → machines
//! - [`ListVirtualMachineTemplates`] - Enterprise datacenters → templates
//!
//! All listings are all-or-nothing: either the full aggregated collection is
//! returned, or the error of one failed scope is.

pub mod lister;
pub mod machines;
pub mod templates;

pub use lister::FanOutLister;
pub use machines::ListMachines;
pub use templates::ListVirtualMachineTemplates;
