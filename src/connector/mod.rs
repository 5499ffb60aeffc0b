// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hypervisor Connector Capability
//!
//! The service consumes the hypervisor exclusively through the traits in this
//! module. The connector owns every domain resource; the service only ever
//! holds a transient [`DomainHandle`] for the duration of a single operation.
//!
//! # Architecture
//!
//! ```text
//! Service Operation
//!     ↓
//! HypervisorConnector (lookup / listing)
//!     ↓
//! DomainHandle (per-domain calls: state, metadata, power, devices)
//!     ↓
//! Hypervisor transport (libvirt adapter, or a test double)
//! ```
//!
//! Every call yields a value or a [`ConnectorError`] carrying the connector's
//! numeric error code. The known codes are tabled in [`codes`]; classification
//! into the service taxonomy happens at the service boundary, never here.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "libvirt")]
pub mod libvirt;

#[cfg(feature = "libvirt")]
pub use libvirt::LibvirtConnector;

/// Typed failure from a connector call.
///
/// `code` is the connector's stable numeric error number; `message` is the
/// human-readable text that came with it. Service-level classification keys
/// on `code` first and falls back to message patterns only where the
/// connector reports distinct conditions under one code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("connector error {code}: {message}")]
pub struct ConnectorError {
    /// Connector error number (see [`codes`])
    pub code: i32,
    /// Connector-supplied message text
    pub message: String,
}

impl ConnectorError {
    /// Create a connector error from a code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type for connector calls
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Versioned table of connector error numbers the service classifies on.
///
/// Values are libvirt `virErrorNumber` constants, stable across releases.
/// Adding a classification means adding a constant here and a match arm at
/// the service boundary; ad hoc numeric literals are not used anywhere else.
pub mod codes {
    /// VIR_ERR_NO_DOMAIN: domain not found for the given key
    pub const NO_DOMAIN: i32 = 42;

    /// VIR_ERR_OPERATION_INVALID: operation not valid in the current state
    pub const OPERATION_INVALID: i32 = 55;

    /// VIR_ERR_NO_DOMAIN_METADATA: no metadata stored under the namespace
    pub const NO_DOMAIN_METADATA: i32 = 80;
}

/// Flags for [`DomainHandle::update_device`].
pub mod device_flags {
    /// Apply to the running instance only; the persisted definition keeps
    /// whatever it had, and takes effect again after a restart.
    pub const MODIFY_LIVE: u32 = 1;

    /// Apply to the persisted definition only
    pub const MODIFY_CONFIG: u32 = 2;
}

/// Resource figures reported by the hypervisor for one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    /// Maximum memory in KiB
    pub max_memory_kib: u64,
    /// Memory currently used in KiB
    pub memory_kib: u64,
    /// Number of virtual CPUs
    pub vcpus: u32,
    /// CPU time consumed in nanoseconds
    pub cpu_time_ns: u64,
}

/// Process-wide hypervisor connection.
///
/// Established once at startup via the adapter's connect call (which must
/// complete a version handshake before the service accepts operations).
/// There is no reconnect logic; connector loss is fatal for in-flight
/// operations.
#[async_trait]
pub trait HypervisorConnector: Send + Sync {
    /// Hypervisor version from the connect-time handshake
    async fn version(&self) -> ConnectorResult<u64>;

    /// Look up a domain by its UUID string
    async fn lookup_domain_by_uuid(&self, uuid: &str) -> ConnectorResult<Arc<dyn DomainHandle>>;

    /// Look up a domain by name
    async fn lookup_domain_by_name(&self, name: &str) -> ConnectorResult<Arc<dyn DomainHandle>>;

    /// Look up an active domain by its numeric id
    async fn lookup_domain_by_id(&self, id: u32) -> ConnectorResult<Arc<dyn DomainHandle>>;

    /// Names of domains that are persisted but not running
    async fn list_defined_domains(&self) -> ConnectorResult<Vec<String>>;

    /// Numeric ids of domains that are currently running
    async fn list_active_domains(&self) -> ConnectorResult<Vec<u32>>;
}

/// Transient reference to one domain.
///
/// Never cached across service operations; each operation re-resolves its
/// handle through the connector.
#[async_trait]
pub trait DomainHandle: Send + Sync {
    /// Domain name
    async fn name(&self) -> ConnectorResult<String>;

    /// Domain UUID string
    async fn uuid(&self) -> ConnectorResult<String>;

    /// Numeric id, present only while the domain is active
    async fn id(&self) -> ConnectorResult<Option<u32>>;

    /// Live active flag
    async fn is_active(&self) -> ConnectorResult<bool>;

    /// Resource figures
    async fn info(&self) -> ConnectorResult<DomainInfo>;

    /// Full XML description of the live domain
    async fn xml_desc(&self) -> ConnectorResult<String>;

    /// Metadata fragment stored under `namespace`.
    ///
    /// Fails with [`codes::NO_DOMAIN_METADATA`] when nothing has been stored.
    async fn metadata(&self, namespace: &str) -> ConnectorResult<String>;

    /// Replace the metadata fragment stored under `namespace`.
    ///
    /// `qualifier` is the namespace prefix recorded alongside the fragment.
    /// The write replaces the whole fragment; there is no conditional or
    /// partial form.
    async fn set_metadata(
        &self,
        xml: &str,
        qualifier: &str,
        namespace: &str,
    ) -> ConnectorResult<()>;

    /// Update a single device element (see [`device_flags`])
    async fn update_device(&self, xml: &str, flags: u32) -> ConnectorResult<()>;

    /// Start the domain.
    ///
    /// Fails with [`codes::OPERATION_INVALID`] when already running.
    async fn start(&self) -> ConnectorResult<()>;

    /// Forcefully stop the domain.
    ///
    /// Fails with [`codes::OPERATION_INVALID`] when not running.
    async fn destroy(&self) -> ConnectorResult<()>;
}
