// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Diagnostic Tool
//!
//! Connects to the hypervisor, performs the version handshake, and lists
//! every domain with its power state. Useful for checking connectivity and
//! credentials before pointing the HTTP layer at a host.
//!
//! Run with: cargo run --bin vmctl --features libvirt
//!
//! Configuration comes from the environment:
//! - `VMAGENT_HYPERVISOR_URI` (default: qemu:///system)

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use vmagent::connector::{HypervisorConnector, LibvirtConnector};
use vmagent::service::{HypervisorVmService, VmService};
use vmagent::VmAgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = VmAgentConfig::from_env();

    let connector = LibvirtConnector::connect(&config.hypervisor_uri)
        .await
        .with_context(|| format!("connecting to {}", config.hypervisor_uri))?;
    let connector: Arc<dyn HypervisorConnector> = Arc::new(connector);

    let version = connector.version().await.context("version handshake")?;
    info!(version, "Hypervisor handshake complete");

    let service = HypervisorVmService::new(connector, config);

    match service.list_vms().await {
        Ok(vms) => {
            println!("{:<30} {:<38} {:<8} {}", "NAME", "UUID", "ACTIVE", "ID");
            for vm in vms {
                println!(
                    "{:<30} {:<38} {:<8} {}",
                    vm.name,
                    vm.uuid,
                    vm.active,
                    vm.id.map(|id| id.to_string()).unwrap_or_default(),
                );
            }
        }
        Err(vmagent::VmServiceError::Enumeration(failure)) => {
            for vm in &failure.completed {
                println!("{:<30} {:<38} {:<8}", vm.name, vm.uuid, vm.active);
            }
            for err in &failure.errors {
                eprintln!("error: {err}");
            }
            anyhow::bail!("enumeration finished with {} error(s)", failure.errors.len());
        }
        Err(e) => return Err(e).context("listing domains"),
    }

    Ok(())
}
