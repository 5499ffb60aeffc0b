//! VM lifecycle and access-control service over a hypervisor connector
//!
//! This crate mediates between a REST caller layer and a virtualization
//! hypervisor connector: domain key resolution, concurrent multi-source VM
//! enumeration with partial-failure aggregation, an assignee ACL persisted as
//! XML in the per-domain metadata slot, a power-state lifecycle controller,
//! and a live graphics console password mutator.

pub mod acl;
pub mod config;
pub mod connector;
pub mod domain;
pub mod errors;
pub mod service;

// Re-export commonly used types
pub use config::VmAgentConfig;
pub use errors::{EnumerationFailure, VmServiceError, VmServiceResult};
pub use service::{HypervisorVmService, PowerCycleOutcome, UpsertOutcome, VmService};
