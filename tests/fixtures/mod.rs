// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for vmagent
//!
//! Provides a deterministic in-memory hypervisor connector. All UUIDs are
//! fixed constants so tests are reproducible; failure injection is explicit
//! per test, never random.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vmagent::connector::{
    codes, ConnectorError, ConnectorResult, DomainHandle, DomainInfo, HypervisorConnector,
};

// Fixed test UUIDs
pub const UUID_WEB01: &str = "11111111-1111-4111-8111-111111111111";
pub const UUID_WEB02: &str = "22222222-2222-4222-8222-222222222222";
pub const UUID_DB01: &str = "33333333-3333-4333-8333-333333333333";
pub const UUID_CACHE01: &str = "44444444-4444-4444-8444-444444444444";
pub const UUID_BUILD01: &str = "55555555-5555-4555-8555-555555555555";

/// Domain XML with exactly one graphics device
pub const XML_ONE_GRAPHICS: &str = "<domain type='kvm'>\
    <devices>\
    <graphics type='vnc' port='-1' autoport='yes' listen='127.0.0.1'/>\
    </devices></domain>";

/// Domain XML with no graphics device
pub const XML_NO_GRAPHICS: &str = "<domain type='kvm'><devices/></domain>";

/// Domain XML with two graphics devices
pub const XML_TWO_GRAPHICS: &str = "<domain type='kvm'><devices>\
    <graphics type='vnc'/><graphics type='spice'/>\
    </devices></domain>";

/// One scripted domain behind the mock connector
pub struct MockDomain {
    pub name: String,
    pub uuid: String,
    pub numeric_id: u32,
    active: AtomicBool,
    /// `destroy` succeeds but the domain keeps running
    lingers_on_destroy: AtomicBool,
    metadata: Mutex<Option<String>>,
    xml: Mutex<String>,
    /// Arguments of every `set_metadata` call, newest last
    pub metadata_writes: Mutex<Vec<(String, String, String)>>,
    /// XML of every `update_device` call, newest last
    pub device_updates: Mutex<Vec<(String, u32)>>,
}

impl MockDomain {
    fn new(name: &str, uuid: &str, numeric_id: u32, active: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            uuid: uuid.to_string(),
            numeric_id,
            active: AtomicBool::new(active),
            lingers_on_destroy: AtomicBool::new(false),
            metadata: Mutex::new(None),
            xml: Mutex::new(XML_ONE_GRAPHICS.to_string()),
            metadata_writes: Mutex::new(Vec::new()),
            device_updates: Mutex::new(Vec::new()),
        })
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Make `destroy` report success without stopping the domain
    pub fn set_lingers_on_destroy(&self) {
        self.lingers_on_destroy.store(true, Ordering::SeqCst);
    }

    /// Seed the metadata slot directly, bypassing the service
    pub fn seed_metadata(&self, xml: &str) {
        *self.metadata.lock().unwrap() = Some(xml.to_string());
    }

    /// Raw metadata slot content, if any write happened
    pub fn raw_metadata(&self) -> Option<String> {
        self.metadata.lock().unwrap().clone()
    }

    /// Replace the domain XML description
    pub fn set_xml(&self, xml: &str) {
        *self.xml.lock().unwrap() = xml.to_string();
    }
}

#[async_trait]
impl DomainHandle for MockDomain {
    async fn name(&self) -> ConnectorResult<String> {
        Ok(self.name.clone())
    }

    async fn uuid(&self) -> ConnectorResult<String> {
        Ok(self.uuid.clone())
    }

    async fn id(&self) -> ConnectorResult<Option<u32>> {
        Ok(self.is_running().then_some(self.numeric_id))
    }

    async fn is_active(&self) -> ConnectorResult<bool> {
        Ok(self.is_running())
    }

    async fn info(&self) -> ConnectorResult<DomainInfo> {
        Ok(DomainInfo {
            max_memory_kib: 4_194_304,
            memory_kib: 2_097_152,
            vcpus: 2,
            cpu_time_ns: 1_000_000_000,
        })
    }

    async fn xml_desc(&self) -> ConnectorResult<String> {
        Ok(self.xml.lock().unwrap().clone())
    }

    async fn metadata(&self, _namespace: &str) -> ConnectorResult<String> {
        self.metadata.lock().unwrap().clone().ok_or_else(|| {
            ConnectorError::new(
                codes::NO_DOMAIN_METADATA,
                "Requested metadata element is not present",
            )
        })
    }

    async fn set_metadata(
        &self,
        xml: &str,
        qualifier: &str,
        namespace: &str,
    ) -> ConnectorResult<()> {
        *self.metadata.lock().unwrap() = Some(xml.to_string());
        self.metadata_writes.lock().unwrap().push((
            xml.to_string(),
            qualifier.to_string(),
            namespace.to_string(),
        ));
        Ok(())
    }

    async fn update_device(&self, xml: &str, flags: u32) -> ConnectorResult<()> {
        self.device_updates
            .lock()
            .unwrap()
            .push((xml.to_string(), flags));
        Ok(())
    }

    async fn start(&self) -> ConnectorResult<()> {
        if self.is_running() {
            return Err(ConnectorError::new(
                codes::OPERATION_INVALID,
                "Requested operation is not valid: domain is already running",
            ));
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn destroy(&self) -> ConnectorResult<()> {
        if !self.is_running() {
            return Err(ConnectorError::new(
                codes::OPERATION_INVALID,
                "Requested operation is not valid: domain is not running",
            ));
        }
        if !self.lingers_on_destroy.load(Ordering::SeqCst) {
            self.active.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Deterministic in-memory hypervisor connector
pub struct MockHypervisor {
    domains: Mutex<Vec<Arc<MockDomain>>>,
    next_id: Mutex<u32>,
    fail_id_lookups: Mutex<HashSet<u32>>,
    defined_listing_error: Mutex<Option<ConnectorError>>,
    active_listing_error: Mutex<Option<ConnectorError>>,
    /// Every lookup dispatched, in call order: `uuid:<key>` / `name:<key>` /
    /// `id:<n>`
    pub lookup_log: Mutex<Vec<String>>,
}

impl MockHypervisor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            domains: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            fail_id_lookups: Mutex::new(HashSet::new()),
            defined_listing_error: Mutex::new(None),
            active_listing_error: Mutex::new(None),
            lookup_log: Mutex::new(Vec::new()),
        })
    }

    /// Register a domain; active domains get the next numeric id
    pub fn add_domain(&self, name: &str, uuid: &str, active: bool) -> Arc<MockDomain> {
        let mut next_id = self.next_id.lock().unwrap();
        let dom = MockDomain::new(name, uuid, *next_id, active);
        *next_id += 1;
        self.domains.lock().unwrap().push(dom.clone());
        dom
    }

    /// Make lookup-by-id fail with "no such domain" for this id, as if the
    /// domain vanished between listing and lookup
    pub fn vanish_on_id_lookup(&self, id: u32) {
        self.fail_id_lookups.lock().unwrap().insert(id);
    }

    pub fn fail_defined_listing(&self, err: ConnectorError) {
        *self.defined_listing_error.lock().unwrap() = Some(err);
    }

    pub fn fail_active_listing(&self, err: ConnectorError) {
        *self.active_listing_error.lock().unwrap() = Some(err);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookup_log.lock().unwrap().clone()
    }

    fn no_domain(detail: &str) -> ConnectorError {
        ConnectorError::new(codes::NO_DOMAIN, format!("Domain not found: {detail}"))
    }

    fn find<F>(&self, pred: F) -> Option<Arc<MockDomain>>
    where
        F: Fn(&MockDomain) -> bool,
    {
        self.domains
            .lock()
            .unwrap()
            .iter()
            .find(|d| pred(d))
            .cloned()
    }
}

#[async_trait]
impl HypervisorConnector for MockHypervisor {
    async fn version(&self) -> ConnectorResult<u64> {
        Ok(8_000_000)
    }

    async fn lookup_domain_by_uuid(&self, uuid: &str) -> ConnectorResult<Arc<dyn DomainHandle>> {
        self.lookup_log.lock().unwrap().push(format!("uuid:{uuid}"));
        self.find(|d| d.uuid == uuid)
            .map(|d| d as Arc<dyn DomainHandle>)
            .ok_or_else(|| Self::no_domain("no domain with matching uuid"))
    }

    async fn lookup_domain_by_name(&self, name: &str) -> ConnectorResult<Arc<dyn DomainHandle>> {
        self.lookup_log.lock().unwrap().push(format!("name:{name}"));
        self.find(|d| d.name == name)
            .map(|d| d as Arc<dyn DomainHandle>)
            .ok_or_else(|| Self::no_domain("no domain with matching name"))
    }

    async fn lookup_domain_by_id(&self, id: u32) -> ConnectorResult<Arc<dyn DomainHandle>> {
        self.lookup_log.lock().unwrap().push(format!("id:{id}"));
        if self.fail_id_lookups.lock().unwrap().contains(&id) {
            return Err(Self::no_domain("no domain with matching id"));
        }
        self.find(|d| d.is_running() && d.numeric_id == id)
            .map(|d| d as Arc<dyn DomainHandle>)
            .ok_or_else(|| Self::no_domain("no domain with matching id"))
    }

    async fn list_defined_domains(&self) -> ConnectorResult<Vec<String>> {
        if let Some(err) = self.defined_listing_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .domains
            .lock()
            .unwrap()
            .iter()
            .filter(|d| !d.is_running())
            .map(|d| d.name.clone())
            .collect())
    }

    async fn list_active_domains(&self) -> ConnectorResult<Vec<u32>> {
        if let Some(err) = self.active_listing_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .domains
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.is_running())
            .map(|d| d.numeric_id)
            .collect())
    }
}
