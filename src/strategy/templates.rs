//! Every template an enterprise may deploy, across all its datacenters.

use crate::cloud::traits::{CatalogApi, CloudResult, Enterprise, Scope, VirtualMachineTemplate};
use crate::context::{Bound, ClientContext};
use crate::strategy::lister::FanOutLister;
use slog::{Logger, debug};
use std::sync::Arc;

/// Datacenters available to an enterprise (one call), then the enterprise's
/// templates in each of them, fanned out.
pub struct ListVirtualMachineTemplates {
    api: Arc<dyn CatalogApi>,
    context: Arc<ClientContext>,
    lister: FanOutLister,
    logger: Logger,
}

impl ListVirtualMachineTemplates {
    pub fn new(api: Arc<dyn CatalogApi>, context: Arc<ClientContext>, lister: FanOutLister) -> Self {
        let logger = lister.child_logger("list-templates");
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
    pub fn execute(&self, enterprise: &Enterprise) -> CloudResult<Vec<Bound<VirtualMachineTemplate>>> {
        self.execute_matching(enterprise, |_| true)
    }

    /// List the enterprise's templates in every datacenter it may use and keep
    /// those matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any listing call.
    pub fn execute_matching<P>(
        &self,
        enterprise: &Enterprise,
        filter: P,
    ) -> CloudResult<Vec<Bound<VirtualMachineTemplate>>>
    where
        P: Fn(&Bound<VirtualMachineTemplate>) -> bool,
    {
        let datacenters = self.api.list_datacenters_for(enterprise)?;
        debug!(
            self.logger, "Listing templates";
            "enterprise" => enterprise.scope_id(), "datacenters" => datacenters.len()
        );

        let api = Arc::clone(&self.api);
        let owner = enterprise.clone();
        self.lister.list_bound_matching(
            &self.context,
            datacenters,
            move |datacenter| api.list_templates(&owner, datacenter),
            filter,
        )
    }
}
