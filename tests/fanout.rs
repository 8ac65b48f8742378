// Integration tests for the fan-out/join listers
//
// These run the listing strategies against the in-memory inventory, with
// injected latency and failures standing in for slow or broken datacenters.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stratus::cloud::{
    Datacenter, ErrorKind, FakeCredentials, FakeInventory, MachineState, VirtualMachineTemplate,
};
use stratus::cloud::Enterprise;
use stratus::{
    ClientContext, Executor, FanOutLister, InfrastructureApi, ListMachines,
    ListVirtualMachineTemplates,
};

fn context() -> Result<Arc<ClientContext>> {
    Ok(ClientContext::new(
        "fake",
        "http://localhost:8080/api",
        Arc::new(FakeCredentials::new("admin", "secret")),
    )?)
}

fn lister(threads: usize) -> Result<FanOutLister> {
    Ok(FanOutLister::new(
        Executor::new(threads)?,
        stratus::logging::discard(),
    ))
}

fn template(id: u64, name: &str, datacenter_id: u64) -> VirtualMachineTemplate {
    VirtualMachineTemplate {
        id,
        name: name.to_string(),
        datacenter_id,
        disk_format: "qcow2".to_string(),
        cpu: 2,
        ram_mb: 2048,
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn results_follow_submission_order_not_completion_order() -> Result<()> {
    let inventory = FakeInventory::grid(3, 1, 1);
    inventory.set_latency("datacenter/1", Duration::from_millis(120));
    inventory.set_latency("datacenter/3", Duration::from_millis(60));
    inventory.set_latency("rack/101", Duration::from_millis(80));

    let machines = ListMachines::new(Arc::new(inventory), context()?, lister(4)?).execute()?;

    let ids: Vec<u64> = machines.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![10101, 20101, 30101]);
    Ok(())
}

#[test]
fn generic_lister_keeps_scope_order() -> Result<()> {
    let inventory = FakeInventory::grid(4, 0, 0);
    for (dc, ms) in [(1, 90), (2, 10), (3, 50), (4, 0)] {
        inventory.set_latency(&format!("datacenter/{dc}"), Duration::from_millis(ms));
    }
    let datacenters = vec![
        Datacenter { id: 1, name: "dc-1".into(), location: None },
        Datacenter { id: 2, name: "dc-2".into(), location: None },
        Datacenter { id: 3, name: "dc-3".into(), location: None },
        Datacenter { id: 4, name: "dc-4".into(), location: None },
    ];

    let api = inventory.clone();
    let names = lister(4)?.list_all(datacenters, move |dc| {
        api.list_racks(dc)?;
        Ok(vec![dc.name.clone(), format!("{}-again", dc.name)])
    })?;

    assert_eq!(
        names,
        vec!["dc-1", "dc-1-again", "dc-2", "dc-2-again", "dc-3", "dc-3-again", "dc-4", "dc-4-again"]
    );
    Ok(())
}

#[test]
fn scopes_are_listed_concurrently() -> Result<()> {
    let inventory = FakeInventory::grid(4, 1, 0);
    for dc in 1..=4 {
        inventory.set_latency(&format!("datacenter/{dc}"), Duration::from_millis(300));
    }

    let started = Instant::now();
    let machines = ListMachines::new(Arc::new(inventory), context()?, lister(4)?).execute()?;
    let elapsed = started.elapsed();

    assert!(machines.is_empty());
    // Sequential listing would take at least 1200ms.
    assert!(elapsed < Duration::from_millis(1_000), "took {elapsed:?}");
    Ok(())
}

// ============================================================================
// Failure Propagation
// ============================================================================

#[test]
fn one_failing_rack_fails_the_whole_listing() -> Result<()> {
    let inventory = FakeInventory::grid(3, 2, 2);
    inventory.fail_scope("rack/202", ErrorKind::ServiceUnavailable);

    let result = ListMachines::new(Arc::new(inventory), context()?, lister(4)?).execute();

    let err = result.expect_err("a partial listing must not be returned");
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    Ok(())
}

#[test]
fn failure_is_reported_without_waiting_for_slow_datacenters() -> Result<()> {
    let inventory = FakeInventory::grid(3, 1, 1);
    inventory.set_latency("datacenter/1", Duration::from_secs(3));
    inventory.set_latency("datacenter/3", Duration::from_secs(3));
    inventory.fail_scope("datacenter/2", ErrorKind::Network);

    let started = Instant::now();
    let err = ListMachines::new(Arc::new(inventory), context()?, lister(3)?)
        .execute()
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert!(started.elapsed() < Duration::from_millis(1_500), "took {:?}", started.elapsed());
    Ok(())
}

#[test]
fn first_level_failure_stops_before_second_level() -> Result<()> {
    let inventory = FakeInventory::grid(2, 2, 2);
    inventory.fail_scope("datacenter/2", ErrorKind::Network);
    let shared = Arc::new(inventory);

    let result = ListMachines::new(shared.clone(), context()?, lister(2)?).execute();

    assert_eq!(result.unwrap_err().kind, ErrorKind::Network);
    // One datacenter listing plus at most two rack listings, no machine listing.
    assert!(shared.calls() <= 3, "calls: {}", shared.calls());
    Ok(())
}

#[test]
fn root_listing_failure_propagates_unchanged() -> Result<()> {
    let inventory = FakeInventory::grid(2, 2, 2);
    inventory.fail_scope("root", ErrorKind::Authentication);

    let err = ListMachines::new(Arc::new(inventory), context()?, lister(2)?)
        .execute()
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.message, "Injected failure for root");
    Ok(())
}

// ============================================================================
// Chained Fan-out
// ============================================================================

#[test]
fn two_by_two_by_two_yields_eight_machines() -> Result<()> {
    let inventory = Arc::new(FakeInventory::grid(2, 2, 2));

    let machines = ListMachines::new(inventory.clone(), context()?, lister(3)?).execute()?;

    assert_eq!(machines.len(), 8);
    // 1 datacenter listing, 2 rack listings, 4 machine listings.
    assert_eq!(inventory.calls(), 7);
    let ids: Vec<u64> = machines.iter().map(|m| m.id).collect();
    assert_eq!(
        ids,
        vec![10101, 10102, 10201, 10202, 20101, 20102, 20201, 20202]
    );
    Ok(())
}

#[test]
fn single_worker_still_completes_chain() -> Result<()> {
    let inventory = Arc::new(FakeInventory::grid(3, 3, 3));
    let machines = ListMachines::new(inventory, context()?, lister(1)?).execute()?;
    assert_eq!(machines.len(), 27);
    Ok(())
}

#[test]
fn no_datacenters_means_no_machines() -> Result<()> {
    let inventory = Arc::new(FakeInventory::new());
    let machines = ListMachines::new(inventory.clone(), context()?, lister(2)?).execute()?;
    assert!(machines.is_empty());
    assert_eq!(inventory.calls(), 1);
    Ok(())
}

// ============================================================================
// Filtering and Binding
// ============================================================================

#[test]
fn filter_applies_after_flattening() -> Result<()> {
    let inventory = FakeInventory::grid(2, 1, 0);
    inventory.add_machine(101, 1, "halted-1", MachineState::Halted)?;
    inventory.add_machine(101, 2, "managed-1", MachineState::Managed)?;
    inventory.add_machine(201, 3, "halted-2", MachineState::Halted)?;

    let halted = ListMachines::new(Arc::new(inventory), context()?, lister(2)?)
        .execute_matching(|machine| machine.state == MachineState::Halted)?;

    let names: Vec<&str> = halted.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["halted-1", "halted-2"]);
    Ok(())
}

#[test]
fn listed_machines_share_the_client_context() -> Result<()> {
    let context = context()?;
    let machines = ListMachines::new(
        Arc::new(FakeInventory::grid(1, 2, 1)),
        context.clone(),
        lister(2)?,
    )
    .execute()?;

    assert_eq!(machines.len(), 2);
    for machine in &machines {
        assert!(Arc::ptr_eq(machine.context(), &context));
        assert_eq!(machine.context().endpoint(), "http://localhost:8080/api");
    }
    Ok(())
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn templates_across_enterprise_datacenters() -> Result<()> {
    let inventory = FakeInventory::grid(3, 0, 0);
    inventory.allow_datacenter(7, 1)?;
    inventory.allow_datacenter(7, 3)?;
    inventory.add_template(7, template(1, "debian-12", 1))?;
    inventory.add_template(7, template(2, "ubuntu-24.04", 1))?;
    inventory.add_template(7, template(3, "alpine", 3))?;
    inventory.set_latency("datacenter/1", Duration::from_millis(50));

    let enterprise = Enterprise { id: 7, name: "acme".into() };
    let templates = ListVirtualMachineTemplates::new(Arc::new(inventory), context()?, lister(2)?)
        .execute(&enterprise)?;

    let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["debian-12", "ubuntu-24.04", "alpine"]);
    Ok(())
}

#[test]
fn template_filter_and_failures() -> Result<()> {
    let inventory = FakeInventory::grid(2, 0, 0);
    inventory.allow_datacenter(1, 1)?;
    inventory.allow_datacenter(1, 2)?;
    inventory.add_template(1, template(1, "small", 1))?;
    inventory.add_template(
        1,
        VirtualMachineTemplate { ram_mb: 16384, ..template(2, "large", 2) },
    )?;
    let inventory = Arc::new(inventory);
    let enterprise = Enterprise { id: 1, name: "acme".into() };
    let strategy = ListVirtualMachineTemplates::new(inventory.clone(), context()?, lister(2)?);

    let large = strategy.execute_matching(&enterprise, |t| t.ram_mb > 4096)?;
    assert_eq!(large.len(), 1);
    assert_eq!(large[0].name, "large");

    inventory.fail_scope("datacenter/2", ErrorKind::Timeout);
    assert_eq!(strategy.execute(&enterprise).unwrap_err().kind, ErrorKind::Timeout);
    Ok(())
}

#[test]
fn unknown_enterprise_is_not_found() -> Result<()> {
    let strategy = ListVirtualMachineTemplates::new(
        Arc::new(FakeInventory::grid(1, 0, 0)),
        context()?,
        lister(1)?,
    );
    let err = strategy
        .execute(&Enterprise { id: 404, name: "ghost".into() })
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}
