//! Core traits and transport types for cloud inventory clients.
//!
//! These traits provide synchronous interfaces over provider APIs,
//! with internal async handling left to the implementation where necessary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Core Error Type
// ============================================================================

/// Generic error type for cloud client operations
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct CloudError {
    pub message: String,
    pub kind: ErrorKind,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    NotFound,
    AlreadyExists,
    InvalidInput,
    Network,
    Timeout,
    ServiceUnavailable,
    RateLimited,
    /// A remote resource reported a state it can never leave.
    IllegalState,
    InternalError,
    Other,
}

impl CloudError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            detail: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalState, message)
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

pub type CloudResult<T> = Result<T, CloudError>;

// ============================================================================
// Credentials
// ============================================================================

/// Trait for cloud service credentials
pub trait CloudCredentials: Send + Sync {
    /// Returns a unique identifier for this credential (e.g., access key ID, user name)
    fn identifier(&self) -> &str;

    /// Returns the shared secret used to sign or authenticate requests
    fn secret(&self) -> &str;

    /// Returns the credential type (e.g., `"access_key"`, `"basic"`)
    fn credential_type(&self) -> &str;

    /// Validates the credentials (returns Ok if valid)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are invalid, expired, or cannot be validated
    fn validate(&self) -> CloudResult<()>;
}

// ============================================================================
// Scopes and Poll Targets
// ============================================================================

/// Anything a lister fans out over: a datacenter, a rack, an enterprise.
pub trait Scope: Sync {
    /// Identifier used in logs and by fakes to key latency and failures.
    fn scope_id(&self) -> String;
}

/// Identifier of a remote resource whose state is re-read on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PollTarget {
    Named(String),
    Numeric(u64),
}

impl fmt::Display for PollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Numeric(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for PollTarget {
    fn from(value: &str) -> Self {
        Self::Named(value.to_string())
    }
}

impl From<String> for PollTarget {
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

impl From<u64> for PollTarget {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

// ============================================================================
// Infrastructure - Datacenters, Racks, Machines
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datacenter {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub id: u64,
    pub name: String,
    pub datacenter_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineState {
    Provisioned,
    NotManaged,
    Managed,
    Halted,
    Disabled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: u64,
    pub name: String,
    pub rack_id: u64,
    pub state: MachineState,
}

impl Scope for Datacenter {
    fn scope_id(&self) -> String {
        format!("datacenter/{}", self.id)
    }
}

impl Scope for Rack {
    fn scope_id(&self) -> String {
        format!("rack/{}", self.id)
    }
}

/// Trait for physical infrastructure listing
pub trait InfrastructureApi: Send + Sync {
    /// List every datacenter visible to the caller
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or permissions are not enough
    fn list_datacenters(&self) -> CloudResult<Vec<Datacenter>>;

    /// List the racks of one datacenter
    ///
    /// # Errors
    ///
    /// Returns an error if the datacenter doesn't exist or the request fails
    fn list_racks(&self, datacenter: &Datacenter) -> CloudResult<Vec<Rack>>;

    /// List the machines of one rack
    ///
    /// # Errors
    ///
    /// Returns an error if the rack doesn't exist or the request fails
    fn list_machines(&self, rack: &Rack) -> CloudResult<Vec<Machine>>;
}

// ============================================================================
// Catalog - Enterprises and Templates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enterprise {
    pub id: u64,
    pub name: String,
}

impl Scope for Enterprise {
    fn scope_id(&self) -> String {
        format!("enterprise/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachineTemplate {
    pub id: u64,
    pub name: String,
    pub datacenter_id: u64,
    pub disk_format: String,
    pub cpu: u32,
    pub ram_mb: u64,
}

/// Trait for template catalog listing
pub trait CatalogApi: Send + Sync {
    /// List the datacenters an enterprise is allowed to use
    ///
    /// # Errors
    ///
    /// Returns an error if the enterprise doesn't exist or the request fails
    fn list_datacenters_for(&self, enterprise: &Enterprise) -> CloudResult<Vec<Datacenter>>;

    /// List the templates an enterprise can deploy in one datacenter
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or permissions are not enough
    fn list_templates(
        &self,
        enterprise: &Enterprise,
        datacenter: &Datacenter,
    ) -> CloudResult<Vec<VirtualMachineTemplate>>;
}

// ============================================================================
// Compute - Server State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    Pending,
    Building,
    Running,
    Stopped,
    Failed,
    #[serde(other)]
    Unrecognized,
}

impl ServerStatus {
    /// Statuses a server can never leave on its own.
    #[must_use]
    pub const fn is_terminal_failure(self) -> bool {
        matches!(self, Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deployment {
    pub started: bool,
    pub deployed: bool,
}

/// Trait for reading the current state of compute resources
pub trait ComputeApi: Send + Sync {
    /// Read the current status of a server
    ///
    /// # Errors
    ///
    /// Returns `NotFound` while the server is not yet visible, or any transport error
    fn server_status(&self, target: &PollTarget) -> CloudResult<ServerStatus>;

    /// Read the deployment flags of a virtual machine
    ///
    /// # Errors
    ///
    /// Returns `NotFound` while the machine is not yet visible, or any transport error
    fn deployment(&self, target: &PollTarget) -> CloudResult<Deployment>;
}
