// Copyright (c) 2025 - Cowboy AI, Inc.
//! Power Lifecycle Controller
//!
//! Queries and sets the binary ON/OFF power state, waits for a target state
//! under a bound, and sequences the forced power cycle. The state is derived
//! from the domain's live active flag on every read, never cached.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::VmAgentConfig;
use crate::connector::{codes, ConnectorError};
use crate::domain::PowerState;
use crate::errors::{VmServiceError, VmServiceResult};
use crate::service::resolve::DomainResolver;

/// Result of a forced power cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerCycleOutcome {
    /// The domain was already off when the cycle began; the destroy step was
    /// skipped over rather than treated as a failure
    pub was_already_off: bool,
}

/// Power-state operations against one domain at a time
pub struct PowerController {
    resolver: DomainResolver,
    config: VmAgentConfig,
}

impl PowerController {
    /// Create a controller over the shared resolver
    pub fn new(resolver: DomainResolver, config: VmAgentConfig) -> Self {
        Self { resolver, config }
    }

    /// Current power state from the live active flag
    pub async fn power_state(&self, key: &str) -> VmServiceResult<PowerState> {
        let dom = self.resolver.resolve(key).await?;
        Ok(PowerState::from_active(dom.is_active().await?))
    }

    /// Drive the domain toward `target`: start for ON, destroy for OFF.
    ///
    /// A connector "operation invalid" conflict (already running / not
    /// running) remaps to `WrongPowerState`.
    pub async fn set_power_state(&self, key: &str, target: PowerState) -> VmServiceResult<()> {
        debug!(key = %key, target = %target, "Setting power state");
        let dom = self.resolver.resolve(key).await?;

        let result = match target {
            PowerState::On => dom.start().await,
            PowerState::Off => dom.destroy().await,
        };

        result.map_err(classify_power_failure)
    }

    /// Poll the active flag at the configured fixed interval until it matches
    /// `target`, or fail with `Timeout` once elapsed time (measured from the
    /// call's start, not per poll) exceeds `timeout`.
    pub async fn wait_for_power_state(
        &self,
        key: &str,
        target: PowerState,
        timeout: Duration,
    ) -> VmServiceResult<()> {
        let dom = self.resolver.resolve(key).await?;
        let started = Instant::now();

        loop {
            if PowerState::from_active(dom.is_active().await?) == target {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(VmServiceError::Timeout(timeout));
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Forced power cycle: destroy, wait for OFF, start.
    ///
    /// A `WrongPowerState` on the destroy step means the domain was already
    /// off; that is noted on the outcome and the sequence continues. Any
    /// other failure at any step aborts.
    pub async fn force_power_cycle(&self, key: &str) -> VmServiceResult<PowerCycleOutcome> {
        info!(key = %key, "Forcing power cycle");

        let was_already_off = match self.set_power_state(key, PowerState::Off).await {
            Ok(()) => false,
            Err(e) if e.is_wrong_power_state() => {
                debug!(key = %key, "Domain already off, continuing cycle");
                true
            }
            Err(e) => return Err(e),
        };

        self.wait_for_power_state(key, PowerState::Off, self.config.power_cycle_timeout)
            .await?;
        self.set_power_state(key, PowerState::On).await?;

        Ok(PowerCycleOutcome { was_already_off })
    }
}

/// Translate a connector power-operation failure.
///
/// The "operation invalid" code is authoritative. The message patterns are a
/// fallback for connector builds that report the conflict under a generic
/// code; wording can drift between connector versions, so the code match
/// always runs first.
fn classify_power_failure(err: ConnectorError) -> VmServiceError {
    if err.code == codes::OPERATION_INVALID {
        return VmServiceError::WrongPowerState(err.message);
    }

    let lowered = err.message.to_ascii_lowercase();
    if lowered.contains("already running") || lowered.contains("not running") {
        return VmServiceError::WrongPowerState(err.message);
    }

    err.into()
}
