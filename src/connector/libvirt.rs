// Copyright (c) 2025 - Cowboy AI, Inc.
//! Libvirt Connector Adapter
//!
//! Implements [`HypervisorConnector`] and [`DomainHandle`] over the `virt`
//! crate. Connection establishment happens once, at [`LibvirtConnector::connect`],
//! and includes the library version handshake; the handle is then shared by
//! reference with every service sub-component.
//!
//! Common URIs:
//! - `qemu:///system` - system-wide QEMU/KVM
//! - `qemu:///session` - user session QEMU
//! - `qemu+ssh://user@host/system` - remote via SSH

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use virt::connect::Connect;
use virt::domain::Domain;
use virt::sys;

use super::{ConnectorError, ConnectorResult, DomainHandle, DomainInfo, HypervisorConnector};

fn map_err(e: virt::error::Error) -> ConnectorError {
    ConnectorError::new(e.code() as i32, e.to_string())
}

/// Hypervisor connection backed by libvirt
pub struct LibvirtConnector {
    conn: Connect,
    version: u64,
}

impl LibvirtConnector {
    /// Open the libvirt connection and perform the version handshake.
    ///
    /// Must complete before any service operation is accepted.
    pub async fn connect(uri: &str) -> ConnectorResult<Self> {
        info!(uri = %uri, "Connecting to libvirt hypervisor");

        let conn = Connect::open(uri).map_err(map_err)?;
        let version = conn.get_lib_version().map_err(map_err)? as u64;

        info!(version, "Connected to libvirt");

        Ok(Self { conn, version })
    }

    fn wrap(&self, dom: Domain) -> Arc<dyn DomainHandle> {
        Arc::new(LibvirtDomain { dom })
    }
}

#[async_trait]
impl HypervisorConnector for LibvirtConnector {
    async fn version(&self) -> ConnectorResult<u64> {
        Ok(self.version)
    }

    async fn lookup_domain_by_uuid(&self, uuid: &str) -> ConnectorResult<Arc<dyn DomainHandle>> {
        debug!(uuid = %uuid, "Looking up domain by uuid");
        Domain::lookup_by_uuid_string(&self.conn, uuid)
            .map(|d| self.wrap(d))
            .map_err(map_err)
    }

    async fn lookup_domain_by_name(&self, name: &str) -> ConnectorResult<Arc<dyn DomainHandle>> {
        debug!(name = %name, "Looking up domain by name");
        Domain::lookup_by_name(&self.conn, name)
            .map(|d| self.wrap(d))
            .map_err(map_err)
    }

    async fn lookup_domain_by_id(&self, id: u32) -> ConnectorResult<Arc<dyn DomainHandle>> {
        debug!(id, "Looking up domain by id");
        Domain::lookup_by_id(&self.conn, id)
            .map(|d| self.wrap(d))
            .map_err(map_err)
    }

    async fn list_defined_domains(&self) -> ConnectorResult<Vec<String>> {
        self.conn.list_defined_domains().map_err(map_err)
    }

    async fn list_active_domains(&self) -> ConnectorResult<Vec<u32>> {
        self.conn.list_domains().map_err(map_err)
    }
}

/// Transient libvirt domain reference
struct LibvirtDomain {
    dom: Domain,
}

#[async_trait]
impl DomainHandle for LibvirtDomain {
    async fn name(&self) -> ConnectorResult<String> {
        self.dom.get_name().map_err(map_err)
    }

    async fn uuid(&self) -> ConnectorResult<String> {
        self.dom.get_uuid_string().map_err(map_err)
    }

    async fn id(&self) -> ConnectorResult<Option<u32>> {
        Ok(self.dom.get_id())
    }

    async fn is_active(&self) -> ConnectorResult<bool> {
        self.dom.is_active().map_err(map_err)
    }

    async fn info(&self) -> ConnectorResult<DomainInfo> {
        let info = self.dom.get_info().map_err(map_err)?;
        Ok(DomainInfo {
            max_memory_kib: info.max_mem,
            memory_kib: info.memory,
            vcpus: info.nr_virt_cpu,
            cpu_time_ns: info.cpu_time,
        })
    }

    async fn xml_desc(&self) -> ConnectorResult<String> {
        self.dom.get_xml_desc(0).map_err(map_err)
    }

    async fn metadata(&self, namespace: &str) -> ConnectorResult<String> {
        self.dom
            .get_metadata(
                sys::VIR_DOMAIN_METADATA_ELEMENT as i32,
                Some(namespace),
                0,
            )
            .map_err(map_err)
    }

    async fn set_metadata(
        &self,
        xml: &str,
        qualifier: &str,
        namespace: &str,
    ) -> ConnectorResult<()> {
        self.dom
            .set_metadata(
                sys::VIR_DOMAIN_METADATA_ELEMENT as i32,
                Some(xml),
                Some(qualifier),
                Some(namespace),
                0,
            )
            .map(|_| ())
            .map_err(map_err)
    }

    async fn update_device(&self, xml: &str, flags: u32) -> ConnectorResult<()> {
        self.dom
            .update_device_flags(xml, flags)
            .map(|_| ())
            .map_err(map_err)
    }

    async fn start(&self) -> ConnectorResult<()> {
        self.dom.create().map(|_| ()).map_err(map_err)
    }

    async fn destroy(&self) -> ConnectorResult<()> {
        self.dom.destroy().map_err(map_err)
    }
}
