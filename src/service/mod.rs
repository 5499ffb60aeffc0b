// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Service Layer
//!
//! The application service mediating between the HTTP caller layer and the
//! hypervisor connector. One operation per request; each operation resolves
//! its domain handle fresh and delegates to the relevant sub-component.
//!
//! # Architecture
//!
//! ```text
//! Caller (HTTP layer, out of scope)
//!     ↓
//! VmService (this module)
//!     ↓
//! DomainResolver ──→ EnumerationEngine
//!     │               MetadataAclStore
//!     │               PowerController
//!     │               GraphicsPasswordManager
//!     ↓
//! HypervisorConnector (shared, established once at startup)
//! ```
//!
//! # Design Principles
//!
//! 1. **Transient handles**: domain handles live for one operation only
//! 2. **Typed failures**: connector codes classify at this boundary
//! 3. **Partial results**: enumeration never discards completed work
//! 4. **Async by default**: every connector call suspends

pub mod acl_store;
pub mod enumerate;
pub mod graphics;
pub mod power;
pub mod resolve;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

pub use acl_store::{MetadataAclStore, UpsertOutcome};
pub use enumerate::EnumerationEngine;
pub use graphics::GraphicsPasswordManager;
pub use power::{PowerController, PowerCycleOutcome};
pub use resolve::DomainResolver;

use crate::config::VmAgentConfig;
use crate::connector::HypervisorConnector;
use crate::domain::{Assignee, PowerState, VmDetails, VmSummary};
use crate::errors::VmServiceResult;

/// VM lifecycle and access-control operations exposed to the caller layer.
///
/// Every operation takes a domain key — a canonical UUID or a name — plus
/// operation-specific arguments, and returns a value or a typed failure from
/// [`crate::errors::VmServiceError`]. The HTTP layer maps failure kinds to
/// transport status codes.
#[async_trait]
pub trait VmService: Send + Sync {
    /// Full view of one domain
    async fn get_vm(&self, key: &str) -> VmServiceResult<VmDetails>;

    /// Enumerate all domains, defined and active
    async fn list_vms(&self) -> VmServiceResult<Vec<VmSummary>>;

    /// Assignee records for a domain
    async fn get_assignees(&self, key: &str) -> VmServiceResult<Vec<Assignee>>;

    /// Create or update an assignee record
    async fn add_or_update_assignee(
        &self,
        key: &str,
        user: &str,
        assignee_type: &str,
    ) -> VmServiceResult<UpsertOutcome>;

    /// Remove an assignee record; absent assignees are an error
    async fn remove_assignee(&self, key: &str, user: &str) -> VmServiceResult<()>;

    /// Current power state
    async fn get_power_state(&self, key: &str) -> VmServiceResult<PowerState>;

    /// Drive the domain toward a power state
    async fn set_power_state(&self, key: &str, target: PowerState) -> VmServiceResult<()>;

    /// Wait under a bound for the domain to reach a power state
    async fn wait_for_power_state(
        &self,
        key: &str,
        target: PowerState,
        timeout: Duration,
    ) -> VmServiceResult<()>;

    /// Forcefully stop the domain (OFF shorthand of `set_power_state`)
    async fn force_shutdown(&self, key: &str) -> VmServiceResult<()>;

    /// Start the domain (ON shorthand of `set_power_state`)
    async fn start(&self, key: &str) -> VmServiceResult<()>;

    /// Destroy, wait for OFF, then start
    async fn force_power_cycle(&self, key: &str) -> VmServiceResult<PowerCycleOutcome>;

    /// Set a time-limited graphics console password on the live instance
    async fn set_graphics_password(
        &self,
        key: &str,
        password: &str,
        valid_for: Duration,
    ) -> VmServiceResult<()>;
}

/// Connector-backed implementation of [`VmService`].
///
/// All sub-components share one connector handle, established once at
/// startup and passed in by the process bootstrap.
pub struct HypervisorVmService {
    resolver: DomainResolver,
    enumeration: EnumerationEngine,
    acl: MetadataAclStore,
    power: PowerController,
    graphics: GraphicsPasswordManager,
}

impl HypervisorVmService {
    /// Build the service over an initialized connector handle
    pub fn new(connector: Arc<dyn HypervisorConnector>, config: VmAgentConfig) -> Self {
        let resolver = DomainResolver::new(connector.clone());
        Self {
            enumeration: EnumerationEngine::new(connector),
            acl: MetadataAclStore::new(resolver.clone()),
            power: PowerController::new(resolver.clone(), config),
            graphics: GraphicsPasswordManager::new(resolver.clone()),
            resolver,
        }
    }
}

#[async_trait]
impl VmService for HypervisorVmService {
    async fn get_vm(&self, key: &str) -> VmServiceResult<VmDetails> {
        debug!(key = %key, "Fetching VM details");
        let dom = self.resolver.resolve(key).await?;

        let (name, uuid, active, info, xml) = tokio::try_join!(
            dom.name(),
            dom.uuid(),
            dom.is_active(),
            dom.info(),
            dom.xml_desc(),
        )?;
        let id = dom.id().await?;

        Ok(VmDetails {
            name,
            uuid,
            active,
            id,
            info,
            xml,
        })
    }

    async fn list_vms(&self) -> VmServiceResult<Vec<VmSummary>> {
        self.enumeration.list_all().await
    }

    async fn get_assignees(&self, key: &str) -> VmServiceResult<Vec<Assignee>> {
        self.acl.assignees(key).await
    }

    async fn add_or_update_assignee(
        &self,
        key: &str,
        user: &str,
        assignee_type: &str,
    ) -> VmServiceResult<UpsertOutcome> {
        self.acl.add_or_update(key, user, assignee_type).await
    }

    async fn remove_assignee(&self, key: &str, user: &str) -> VmServiceResult<()> {
        self.acl.remove(key, user).await
    }

    async fn get_power_state(&self, key: &str) -> VmServiceResult<PowerState> {
        self.power.power_state(key).await
    }

    async fn set_power_state(&self, key: &str, target: PowerState) -> VmServiceResult<()> {
        self.power.set_power_state(key, target).await
    }

    async fn wait_for_power_state(
        &self,
        key: &str,
        target: PowerState,
        timeout: Duration,
    ) -> VmServiceResult<()> {
        self.power.wait_for_power_state(key, target, timeout).await
    }

    async fn force_shutdown(&self, key: &str) -> VmServiceResult<()> {
        self.power.set_power_state(key, PowerState::Off).await
    }

    async fn start(&self, key: &str) -> VmServiceResult<()> {
        self.power.set_power_state(key, PowerState::On).await
    }

    async fn force_power_cycle(&self, key: &str) -> VmServiceResult<PowerCycleOutcome> {
        self.power.force_power_cycle(key).await
    }

    async fn set_graphics_password(
        &self,
        key: &str,
        password: &str,
        valid_for: Duration,
    ) -> VmServiceResult<()> {
        self.graphics.set_password(key, password, valid_for).await
    }
}
