//! Fake implementations for testing.
//!
//! These implementations use in-memory data structures to simulate provider APIs,
//! making them ideal for unit testing without external dependencies. Latency and
//! failures can be injected per scope to exercise the concurrent listers.

use crate::cloud::helpers::validate_resource_name;
use crate::cloud::traits::{
    CatalogApi, CloudCredentials, CloudError, CloudResult, ComputeApi, Datacenter, Deployment,
    Enterprise, ErrorKind, InfrastructureApi, Machine, MachineState, PollTarget, Rack, Scope,
    ServerStatus, VirtualMachineTemplate,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scope id used for calls that are not bound to any scope.
pub const ROOT_SCOPE: &str = "root";

// ============================================================================
// Fake Credentials
// ============================================================================

#[derive(Debug, Clone)]
pub struct FakeCredentials {
    pub identifier: String,
    pub secret: String,
    pub credential_type: String,
}

impl FakeCredentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            credential_type: "access_key".to_string(),
        }
    }
}

impl CloudCredentials for FakeCredentials {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn secret(&self) -> &str {
        &self.secret
    }

    fn credential_type(&self) -> &str {
        &self.credential_type
    }

    fn validate(&self) -> CloudResult<()> {
        if self.identifier.is_empty() {
            return Err(CloudError::new(
                ErrorKind::Authentication,
                "Empty identifier",
            ));
        }
        if self.secret.is_empty() {
            return Err(CloudError::new(ErrorKind::Authentication, "Empty secret"));
        }
        Ok(())
    }
}

// ============================================================================
// FakeInventory
// ============================================================================

#[derive(Default)]
struct InventoryState {
    datacenters: Vec<Datacenter>,
    racks: HashMap<u64, Vec<Rack>>,
    machines: HashMap<u64, Vec<Machine>>,
    enterprises: HashMap<u64, Vec<u64>>,
    templates: HashMap<(u64, u64), Vec<VirtualMachineTemplate>>,
    latency: HashMap<String, Duration>,
    failures: HashMap<String, ErrorKind>,
}

/// In-memory infrastructure and catalog provider.
#[derive(Clone, Default)]
pub struct FakeInventory {
    state: Arc<Mutex<InventoryState>>,
    calls: Arc<AtomicUsize>,
}

impl FakeInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a regular inventory: `datacenters` × `racks_per_dc` × `machines_per_rack`.
    ///
    /// Datacenter ids run from 1, rack ids are `dc * 100 + n`, machine ids are
    /// `rack * 100 + n`.
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    #[must_use]
    pub fn grid(datacenters: u64, racks_per_dc: u64, machines_per_rack: u64) -> Self {
        let inventory = Self::new();
        {
            let mut state = inventory.state.lock().expect("inventory mutex poisoned");
            for dc in 1..=datacenters {
                state.datacenters.push(Datacenter {
                    id: dc,
                    name: format!("dc-{dc}"),
                    location: None,
                });
                for r in 1..=racks_per_dc {
                    let rack_id = dc * 100 + r;
                    state.racks.entry(dc).or_default().push(Rack {
                        id: rack_id,
                        name: format!("rack-{dc}-{r}"),
                        datacenter_id: dc,
                    });
                    let machines = (1..=machines_per_rack)
                        .map(|m| Machine {
                            id: rack_id * 100 + m,
                            name: format!("machine-{dc}-{r}-{m}"),
                            rack_id,
                            state: MachineState::Managed,
                        })
                        .collect();
                    state.machines.insert(rack_id, machines);
                }
            }
        }
        inventory
    }

    /// Register a datacenter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad name and `AlreadyExists` for a duplicate id
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn add_datacenter(&self, id: u64, name: &str) -> CloudResult<Datacenter> {
        validate_resource_name(name)?;
        let mut state = self.state.lock().expect("inventory mutex poisoned");
        if state.datacenters.iter().any(|dc| dc.id == id) {
            return Err(CloudError::new(
                ErrorKind::AlreadyExists,
                format!("Datacenter {id} already exists"),
            ));
        }
        let datacenter = Datacenter {
            id,
            name: name.to_string(),
            location: None,
        };
        state.datacenters.push(datacenter.clone());
        Ok(datacenter)
    }

    /// Register a rack in an existing datacenter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad name and `NotFound` for an unknown datacenter
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn add_rack(&self, datacenter_id: u64, id: u64, name: &str) -> CloudResult<Rack> {
        validate_resource_name(name)?;
        let mut state = self.state.lock().expect("inventory mutex poisoned");
        if !state.datacenters.iter().any(|dc| dc.id == datacenter_id) {
            return Err(CloudError::not_found(format!(
                "Datacenter {datacenter_id} not found"
            )));
        }
        let rack = Rack {
            id,
            name: name.to_string(),
            datacenter_id,
        };
        state.racks.entry(datacenter_id).or_default().push(rack.clone());
        state.machines.entry(id).or_default();
        Ok(rack)
    }

    /// Register a machine in an existing rack.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad name and `NotFound` for an unknown rack
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn add_machine(
        &self,
        rack_id: u64,
        id: u64,
        name: &str,
        machine_state: MachineState,
    ) -> CloudResult<Machine> {
        validate_resource_name(name)?;
        let mut state = self.state.lock().expect("inventory mutex poisoned");
        let Some(machines) = state.machines.get_mut(&rack_id) else {
            return Err(CloudError::not_found(format!("Rack {rack_id} not found")));
        };
        let machine = Machine {
            id,
            name: name.to_string(),
            rack_id,
            state: machine_state,
        };
        machines.push(machine.clone());
        Ok(machine)
    }

    /// Allow an enterprise to use a datacenter. Registers the enterprise on first use.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown datacenter
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn allow_datacenter(&self, enterprise_id: u64, datacenter_id: u64) -> CloudResult<()> {
        let mut state = self.state.lock().expect("inventory mutex poisoned");
        if !state.datacenters.iter().any(|dc| dc.id == datacenter_id) {
            return Err(CloudError::not_found(format!(
                "Datacenter {datacenter_id} not found"
            )));
        }
        state
            .enterprises
            .entry(enterprise_id)
            .or_default()
            .push(datacenter_id);
        Ok(())
    }

    /// Publish a template for an enterprise in the template's datacenter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a bad name and `Authorization` if the enterprise
    /// may not use the template's datacenter
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn add_template(
        &self,
        enterprise_id: u64,
        template: VirtualMachineTemplate,
    ) -> CloudResult<()> {
        validate_resource_name(&template.name)?;
        let mut state = self.state.lock().expect("inventory mutex poisoned");
        let allowed = state
            .enterprises
            .get(&enterprise_id)
            .is_some_and(|dcs| dcs.contains(&template.datacenter_id));
        if !allowed {
            return Err(CloudError::new(
                ErrorKind::Authorization,
                format!(
                    "Enterprise {enterprise_id} may not use datacenter {}",
                    template.datacenter_id
                ),
            ));
        }
        state
            .templates
            .entry((enterprise_id, template.datacenter_id))
            .or_default()
            .push(template);
        Ok(())
    }

    /// Delay every call made on behalf of `scope_id`.
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn set_latency(&self, scope_id: &str, latency: Duration) {
        self.state
            .lock()
            .expect("inventory mutex poisoned")
            .latency
            .insert(scope_id.to_string(), latency);
    }

    /// Make every call made on behalf of `scope_id` fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the inventory mutex is poisoned.
    pub fn fail_scope(&self, scope_id: &str, kind: ErrorKind) {
        self.state
            .lock()
            .expect("inventory mutex poisoned")
            .failures
            .insert(scope_id.to_string(), kind);
    }

    /// Total number of API calls served, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Account for one call, apply injected latency, then injected failure.
    fn enter(&self, scope_id: &str) -> CloudResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (latency, failure) = {
            let state = self.state.lock().expect("inventory mutex poisoned");
            (
                state.latency.get(scope_id).copied(),
                state.failures.get(scope_id).copied(),
            )
        };
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }
        match failure {
            Some(kind) => Err(CloudError::new(kind, format!("Injected failure for {scope_id}"))),
            None => Ok(()),
        }
    }
}

impl InfrastructureApi for FakeInventory {
    fn list_datacenters(&self) -> CloudResult<Vec<Datacenter>> {
        self.enter(ROOT_SCOPE)?;
        let state = self.state.lock().expect("inventory mutex poisoned");
        Ok(state.datacenters.clone())
    }

    fn list_racks(&self, datacenter: &Datacenter) -> CloudResult<Vec<Rack>> {
        self.enter(&datacenter.scope_id())?;
        let state = self.state.lock().expect("inventory mutex poisoned");
        if !state.datacenters.iter().any(|dc| dc.id == datacenter.id) {
            return Err(CloudError::not_found(format!(
                "Datacenter {} not found",
                datacenter.id
            )));
        }
        Ok(state.racks.get(&datacenter.id).cloned().unwrap_or_default())
    }

    fn list_machines(&self, rack: &Rack) -> CloudResult<Vec<Machine>> {
        self.enter(&rack.scope_id())?;
        let state = self.state.lock().expect("inventory mutex poisoned");
        state
            .machines
            .get(&rack.id)
            .cloned()
            .ok_or_else(|| CloudError::not_found(format!("Rack {} not found", rack.id)))
    }
}

impl CatalogApi for FakeInventory {
    fn list_datacenters_for(&self, enterprise: &Enterprise) -> CloudResult<Vec<Datacenter>> {
        self.enter(&enterprise.scope_id())?;
        let state = self.state.lock().expect("inventory mutex poisoned");
        let allowed = state.enterprises.get(&enterprise.id).ok_or_else(|| {
            CloudError::not_found(format!("Enterprise {} not found", enterprise.id))
        })?;
        Ok(state
            .datacenters
            .iter()
            .filter(|dc| allowed.contains(&dc.id))
            .cloned()
            .collect())
    }

    fn list_templates(
        &self,
        enterprise: &Enterprise,
        datacenter: &Datacenter,
    ) -> CloudResult<Vec<VirtualMachineTemplate>> {
        self.enter(&datacenter.scope_id())?;
        let state = self.state.lock().expect("inventory mutex poisoned");
        Ok(state
            .templates
            .get(&(enterprise.id, datacenter.id))
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// FakeCompute
// ============================================================================

/// Scripted replies for one target. The last reply repeats forever.
struct Script<T> {
    replies: VecDeque<CloudResult<T>>,
}

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Option<CloudResult<T>> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

type ScriptMap<T> = Arc<Mutex<HashMap<PollTarget, Script<T>>>>;

/// Compute API whose state reads follow a per-target script.
///
/// Unscripted targets are reported as `NotFound`.
#[derive(Clone)]
pub struct FakeCompute {
    statuses: ScriptMap<ServerStatus>,
    deployments: ScriptMap<Deployment>,
    polls: Arc<Mutex<HashMap<PollTarget, usize>>>,
}

impl FakeCompute {
    #[must_use]
    pub fn new() -> Self {
        Self {
            statuses: Arc::new(Mutex::new(HashMap::new())),
            deployments: Arc::new(Mutex::new(HashMap::new())),
            polls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Script the replies of `server_status` for one target.
    ///
    /// # Panics
    ///
    /// Panics if the script mutex is poisoned.
    pub fn script_status(&self, target: PollTarget, replies: Vec<CloudResult<ServerStatus>>) {
        self.statuses.lock().expect("script mutex poisoned").insert(
            target,
            Script {
                replies: replies.into(),
            },
        );
    }

    /// Script the replies of `deployment` for one target.
    ///
    /// # Panics
    ///
    /// Panics if the script mutex is poisoned.
    pub fn script_deployment(&self, target: PollTarget, replies: Vec<CloudResult<Deployment>>) {
        self.deployments.lock().expect("script mutex poisoned").insert(
            target,
            Script {
                replies: replies.into(),
            },
        );
    }

    /// Number of state reads served for `target`.
    ///
    /// # Panics
    ///
    /// Panics if the poll counter mutex is poisoned.
    #[must_use]
    pub fn polls(&self, target: &PollTarget) -> usize {
        self.polls
            .lock()
            .expect("poll counter mutex poisoned")
            .get(target)
            .copied()
            .unwrap_or(0)
    }

    fn read<T: Clone>(&self, scripts: &ScriptMap<T>, target: &PollTarget) -> CloudResult<T> {
        *self
            .polls
            .lock()
            .expect("poll counter mutex poisoned")
            .entry(target.clone())
            .or_insert(0) += 1;
        scripts
            .lock()
            .expect("script mutex poisoned")
            .get_mut(target)
            .and_then(Script::next)
            .unwrap_or_else(|| Err(CloudError::not_found(format!("{target} not found"))))
    }
}

impl Default for FakeCompute {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeApi for FakeCompute {
    fn server_status(&self, target: &PollTarget) -> CloudResult<ServerStatus> {
        self.read(&self.statuses, target)
    }

    fn deployment(&self, target: &PollTarget) -> CloudResult<Deployment> {
        self.read(&self.deployments, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_shape() {
        let inventory = FakeInventory::grid(2, 3, 4);
        let dcs = inventory.list_datacenters().unwrap();
        assert_eq!(dcs.len(), 2);
        let racks = inventory.list_racks(&dcs[1]).unwrap();
        assert_eq!(racks.len(), 3);
        assert_eq!(racks[0].id, 201);
        let machines = inventory.list_machines(&racks[2]).unwrap();
        assert_eq!(machines.len(), 4);
        assert_eq!(machines[3].id, 20304);
        assert_eq!(inventory.calls(), 3);
    }

    #[test]
    fn injected_failure_is_scoped() {
        let inventory = FakeInventory::grid(2, 1, 1);
        inventory.fail_scope("datacenter/2", ErrorKind::ServiceUnavailable);
        let dcs = inventory.list_datacenters().unwrap();
        assert!(inventory.list_racks(&dcs[0]).is_ok());
        let err = inventory.list_racks(&dcs[1]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn templates_require_allowed_datacenter() {
        let inventory = FakeInventory::grid(2, 0, 0);
        inventory.allow_datacenter(1, 1).unwrap();
        let template = VirtualMachineTemplate {
            id: 1,
            name: "debian".to_string(),
            datacenter_id: 2,
            disk_format: "qcow2".to_string(),
            cpu: 1,
            ram_mb: 512,
        };
        let err = inventory.add_template(1, template).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[test]
    fn script_repeats_last_reply() {
        let compute = FakeCompute::new();
        let target = PollTarget::from("srv");
        compute.script_status(
            target.clone(),
            vec![Ok(ServerStatus::Building), Ok(ServerStatus::Running)],
        );
        assert_eq!(compute.server_status(&target).unwrap(), ServerStatus::Building);
        assert_eq!(compute.server_status(&target).unwrap(), ServerStatus::Running);
        assert_eq!(compute.server_status(&target).unwrap(), ServerStatus::Running);
        assert_eq!(compute.polls(&target), 3);
    }

    #[test]
    fn unscripted_target_is_not_found() {
        let compute = FakeCompute::new();
        let err = compute.deployment(&PollTarget::from(9u64)).unwrap_err();
        assert!(err.is_not_found());
    }
}
