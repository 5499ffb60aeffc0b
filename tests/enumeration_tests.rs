// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for concurrent VM enumeration and its partial-failure
//! aggregation.

mod fixtures;

use std::collections::HashSet;
use std::sync::Arc;

use fixtures::{
    MockHypervisor, UUID_BUILD01, UUID_CACHE01, UUID_DB01, UUID_WEB01, UUID_WEB02,
};
use vmagent::connector::ConnectorError;
use vmagent::service::{HypervisorVmService, VmService};
use vmagent::{VmAgentConfig, VmServiceError};

fn service(hypervisor: Arc<MockHypervisor>) -> HypervisorVmService {
    HypervisorVmService::new(hypervisor, VmAgentConfig::default())
}

/// Standard fixture: 2 defined-but-inactive, 3 active
fn populated() -> Arc<MockHypervisor> {
    let hv = MockHypervisor::new();
    hv.add_domain("web01", UUID_WEB01, true);
    hv.add_domain("web02", UUID_WEB02, true);
    hv.add_domain("db01", UUID_DB01, true);
    hv.add_domain("cache01", UUID_CACHE01, false);
    hv.add_domain("build01", UUID_BUILD01, false);
    hv
}

#[tokio::test]
async fn lists_defined_and_active_domains() {
    let svc = service(populated());

    let vms = svc.list_vms().await.unwrap();
    assert_eq!(vms.len(), 5);

    let names: HashSet<&str> = vms.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names,
        HashSet::from(["web01", "web02", "db01", "cache01", "build01"])
    );

    for vm in &vms {
        match vm.name.as_str() {
            "cache01" | "build01" => {
                assert!(!vm.active);
                assert_eq!(vm.id, None);
            }
            _ => {
                assert!(vm.active);
                assert!(vm.id.is_some());
            }
        }
        assert!(!vm.uuid.is_empty());
    }
}

#[tokio::test]
async fn empty_hypervisor_lists_nothing() {
    let svc = service(MockHypervisor::new());
    assert!(svc.list_vms().await.unwrap().is_empty());
}

#[tokio::test]
async fn one_vanished_domain_keeps_siblings() {
    let hv = populated();
    // db01 got id 3 at registration; vanish it between listing and lookup
    hv.vanish_on_id_lookup(3);
    let svc = service(hv);

    let err = svc.list_vms().await.unwrap_err();
    match err {
        VmServiceError::Enumeration(failure) => {
            assert_eq!(failure.completed.len(), 4);
            assert_eq!(failure.errors.len(), 1);
            assert!(matches!(
                failure.errors[0],
                VmServiceError::DomainNotFound { .. }
            ));
            let names: HashSet<&str> =
                failure.completed.iter().map(|v| v.name.as_str()).collect();
            assert!(!names.contains("db01"));
        }
        other => panic!("expected Enumeration, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_defined_listing_keeps_active_branch() {
    let hv = populated();
    hv.fail_defined_listing(ConnectorError::new(1, "internal error"));
    let svc = service(hv);

    let err = svc.list_vms().await.unwrap_err();
    match err {
        VmServiceError::Enumeration(failure) => {
            // The 3 active domains still resolve
            assert_eq!(failure.completed.len(), 3);
            assert!(failure.completed.iter().all(|v| v.active));
            assert_eq!(failure.errors.len(), 1);
        }
        other => panic!("expected Enumeration, got {other:?}"),
    }
}

#[tokio::test]
async fn both_listings_failing_yields_no_partials() {
    let hv = populated();
    hv.fail_defined_listing(ConnectorError::new(1, "internal error"));
    hv.fail_active_listing(ConnectorError::new(1, "internal error"));
    let svc = service(hv);

    let err = svc.list_vms().await.unwrap_err();
    match err {
        VmServiceError::Enumeration(failure) => {
            assert!(failure.completed.is_empty());
            assert_eq!(failure.errors.len(), 2);
        }
        other => panic!("expected Enumeration, got {other:?}"),
    }
}

#[tokio::test]
async fn summaries_carry_no_duplicates() {
    let svc = service(populated());
    let vms = svc.list_vms().await.unwrap();
    let uuids: HashSet<&str> = vms.iter().map(|v| v.uuid.as_str()).collect();
    assert_eq!(uuids.len(), vms.len());
}
