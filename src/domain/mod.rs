// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Service Domain Models
//!
//! Value objects and read models for the VM service:
//!
//! - [`DomainKey`] - caller key classified as canonical UUID or name
//! - [`Assignee`] / [`AssigneeType`] - authorization records stored in the
//!   per-domain metadata ACL
//! - [`VmSummary`] / [`VmDetails`] - enumeration and single-domain read models
//! - [`PowerState`] - binary ON/OFF, always derived live

pub mod assignee;
pub mod key;
pub mod vm;

pub use assignee::{Assignee, AssigneeType, UnknownAssigneeType};
pub use key::{DomainKey, LookupMethod};
pub use vm::{PowerState, VmDetails, VmSummary};
