//! Inventory demo
//!
//! Lists every machine and template of a fake cloud concurrently, then waits
//! for a freshly created server to come up.
//!
//! Configuration is taken from `STRATUS_*` environment variables, e.g.
//! `STRATUS_THREADS=2 STRATUS_LOG_LEVEL=debug cargo run --example inventory_demo`.

use anyhow::Result;
use slog::info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stratus::cloud::{Enterprise, MachineState, ServerStatus, VirtualMachineTemplate};
use stratus::config::ENV_PREFIX;
use stratus::logging;
use stratus::*;

fn main() -> Result<()> {
    let config = Config::default().apply_env(ENV_PREFIX)?;
    let logger = logging::configure(&config.logging);

    let executor = Executor::from_config(&config.executor)?;
    info!(logger, "Worker pool ready"; "threads" => executor.threads());
    let lister = FanOutLister::new(executor, logger.clone());

    // Three datacenters, each slower than the previous one.
    let inventory = FakeInventory::grid(3, 4, 5);
    for dc in 1..=3u64 {
        inventory.set_latency(&format!("datacenter/{dc}"), Duration::from_millis(dc * 50));
    }
    inventory.add_machine(101, 999, "maintenance-node", MachineState::Halted)?;
    inventory.allow_datacenter(1, 1)?;
    inventory.allow_datacenter(1, 2)?;
    for (id, name, dc) in [(1, "debian-12", 1), (2, "alpine-3.20", 1), (3, "rocky-9", 2)] {
        inventory.add_template(
            1,
            VirtualMachineTemplate {
                id,
                name: name.to_string(),
                datacenter_id: dc,
                disk_format: "qcow2".to_string(),
                cpu: 2,
                ram_mb: 2048,
            },
        )?;
    }
    let inventory = Arc::new(inventory);

    let context = ClientContext::new(
        "fake",
        "http://localhost:8080/api",
        Arc::new(FakeCredentials::new("admin", "secret")),
    )?;

    let started = Instant::now();
    let machines = ListMachines::new(inventory.clone(), context.clone(), lister.clone()).execute()?;
    info!(
        logger, "Listed machines";
        "count" => machines.len(), "elapsed" => ?started.elapsed()
    );

    let halted = ListMachines::new(inventory.clone(), context.clone(), lister.clone())
        .execute_matching(|machine| machine.state == MachineState::Halted)?;
    for machine in &halted {
        info!(logger, "Halted machine"; "id" => machine.id, "name" => &machine.name);
    }

    let enterprise = Enterprise {
        id: 1,
        name: "acme".to_string(),
    };
    let templates =
        ListVirtualMachineTemplates::new(inventory, context.clone(), lister).execute(&enterprise)?;
    for template in &templates {
        info!(
            logger, "Template";
            "name" => &template.name, "datacenter" => template.datacenter_id
        );
    }

    let compute = FakeCompute::new();
    let target = PollTarget::from("web-1");
    compute.script_status(
        target.clone(),
        vec![
            Ok(ServerStatus::Pending),
            Ok(ServerStatus::Building),
            Ok(ServerStatus::Running),
        ],
    );
    let poller = Poller::new(
        PollConfig::new(
            PollPolicy::backoff(Duration::from_millis(50), Duration::from_millis(400), 2.0),
            Duration::from_secs(10),
        ),
        logger.clone(),
    )?;
    let running = poller.await_server(&compute, &target, ServerStatus::Running)?;
    info!(logger, "Server wait finished"; "target" => %target, "running" => running);

    let query = QuerySigner::new(context.credentials())
        .signed_query(&[("Action", "DescribeServers"), ("ServerId", "web-1")])?;
    info!(logger, "Signed follow-up request"; "query" => query);

    Ok(())
}
