//! Every machine of every rack of every datacenter.

use crate::cloud::traits::{CloudResult, InfrastructureApi, Machine};
use crate::context::{Bound, ClientContext};
use crate::strategy::lister::FanOutLister;
use slog::{Logger, debug};
use std::sync::Arc;

/// Datacenters (one call), then racks per datacenter and machines per rack,
/// each level fanned out and fully joined before the next one starts.
pub struct ListMachines {
    api: Arc<dyn InfrastructureApi>,
    context: Arc<ClientContext>,
    lister: FanOutLister,
    logger: Logger,
}

impl ListMachines {
    pub fn new(
        api: Arc<dyn InfrastructureApi>,
        context: Arc<ClientContext>,
        lister: FanOutLister,
    ) -> Self {
        let logger = lister.child_logger("list-machines");
        Self {
            api,
            context,
            lister,
            logger,
        }
    }

    /// # Errors
    ///
    /// Returns the first failure of any listing call.
    pub fn execute(&self) -> CloudResult<Vec<Bound<Machine>>> {
        self.execute_matching(|_| true)
    }

    /// List all machines and keep those matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any listing call.
    pub fn execute_matching<P>(&self, filter: P) -> CloudResult<Vec<Bound<Machine>>>
    where
        P: Fn(&Bound<Machine>) -> bool,
    {
        let datacenters = self.api.list_datacenters()?;
        debug!(self.logger, "Listing machines"; "datacenters" => datacenters.len());

        let racks_api = Arc::clone(&self.api);
        let machines_api = Arc::clone(&self.api);
        self.lister.list_chained_bound_matching(
            &self.context,
            datacenters,
            move |datacenter| racks_api.list_racks(datacenter),
            move |rack| machines_api.list_machines(rack),
            filter,
        )
    }
}
