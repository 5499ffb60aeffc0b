// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Read Models
//!
//! Summaries and details are produced fresh on every call from the
//! connector's live view; nothing here is persisted by the service.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::connector::DomainInfo;

/// Binary power state, derived each time from the live active flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PowerState {
    /// Domain is running
    On,
    /// Domain is stopped
    Off,
}

impl PowerState {
    /// Map the connector's active flag
    pub fn from_active(active: bool) -> Self {
        if active {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::On => write!(f, "ON"),
            PowerState::Off => write!(f, "OFF"),
        }
    }
}

/// One domain as seen during enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSummary {
    /// Domain name
    pub name: String,
    /// Domain UUID string
    pub uuid: String,
    /// Whether the domain is currently running
    pub active: bool,
    /// Numeric id, present only while active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

/// Full view of one domain returned by `get_vm`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmDetails {
    /// Domain name
    pub name: String,
    /// Domain UUID string
    pub uuid: String,
    /// Whether the domain is currently running
    pub active: bool,
    /// Numeric id, present only while active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Resource figures from the hypervisor
    pub info: DomainInfo,
    /// Full XML description
    pub xml: String,
}
