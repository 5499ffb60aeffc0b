// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service configuration

use std::time::Duration;

/// Configuration for the VM service
#[derive(Debug, Clone)]
pub struct VmAgentConfig {
    /// Hypervisor connection URI
    pub hypervisor_uri: String,
    /// Fixed interval between power-state polls
    pub poll_interval: Duration,
    /// Bound on the off-wait inside a forced power cycle
    pub power_cycle_timeout: Duration,
}

impl Default for VmAgentConfig {
    fn default() -> Self {
        Self {
            hypervisor_uri: "qemu:///system".to_string(),
            poll_interval: Duration::from_millis(100),
            power_cycle_timeout: Duration::from_secs(30),
        }
    }
}

impl VmAgentConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// - `VMAGENT_HYPERVISOR_URI`: connection URI
    /// - `VMAGENT_POWER_CYCLE_TIMEOUT_MS`: off-wait bound in milliseconds
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let hypervisor_uri =
            std::env::var("VMAGENT_HYPERVISOR_URI").unwrap_or(defaults.hypervisor_uri);

        let power_cycle_timeout = std::env::var("VMAGENT_POWER_CYCLE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.power_cycle_timeout);

        Self {
            hypervisor_uri,
            poll_interval: defaults.poll_interval,
            power_cycle_timeout,
        }
    }
}
