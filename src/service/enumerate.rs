// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Enumeration
//!
//! Lists both persisted-but-inactive and currently-active domains and
//! resolves each into a uniform [`VmSummary`]. The two top-level listing
//! calls run concurrently, as do all per-domain resolutions; everything joins
//! through one `FuturesUnordered` collector that is drained to completion, so
//! finalization runs exactly once regardless of completion order.
//!
//! Partial failure never discards completed work: each failed sub-operation
//! contributes one error to the aggregate while sibling domains still
//! resolve. Duplicates cannot occur because defined names and active ids are
//! disjoint namespaces.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tracing::{debug, warn};

use crate::connector::HypervisorConnector;
use crate::domain::VmSummary;
use crate::errors::{EnumerationFailure, VmServiceError, VmServiceResult};
use crate::service::resolve::DomainResolver;

/// Concurrent multi-source VM enumeration
pub struct EnumerationEngine {
    connector: Arc<dyn HypervisorConnector>,
    resolver: DomainResolver,
}

impl EnumerationEngine {
    /// Create an engine over the shared connector handle
    pub fn new(connector: Arc<dyn HypervisorConnector>) -> Self {
        let resolver = DomainResolver::new(connector.clone());
        Self {
            connector,
            resolver,
        }
    }

    /// Enumerate every domain, defined and active, in no particular order.
    ///
    /// On any sub-operation failure the whole call fails with
    /// [`VmServiceError::Enumeration`], carrying both the full error set and
    /// every summary that did complete. When both top-level listings fail
    /// there is nothing in flight and the aggregate holds no summaries.
    pub async fn list_all(&self) -> VmServiceResult<Vec<VmSummary>> {
        let (defined, active) = tokio::join!(
            self.connector.list_defined_domains(),
            self.connector.list_active_domains(),
        );

        let mut errors: Vec<VmServiceError> = Vec::new();
        let mut lookups: FuturesUnordered<BoxFuture<'_, VmServiceResult<VmSummary>>> =
            FuturesUnordered::new();

        match defined {
            Ok(names) => {
                debug!(count = names.len(), "Resolving defined domains");
                for name in names {
                    lookups.push(self.inactive_summary(name).boxed());
                }
            }
            Err(e) => {
                warn!(error = %e, "Defined-domain listing failed");
                errors.push(e.into());
            }
        }

        match active {
            Ok(ids) => {
                debug!(count = ids.len(), "Resolving active domains");
                for id in ids {
                    lookups.push(self.active_summary(id).boxed());
                }
            }
            Err(e) => {
                warn!(error = %e, "Active-domain listing failed");
                errors.push(e.into());
            }
        }

        let mut completed = Vec::new();
        while let Some(result) = lookups.next().await {
            match result {
                Ok(summary) => completed.push(summary),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(completed)
        } else {
            Err(VmServiceError::Enumeration(EnumerationFailure {
                completed,
                errors,
            }))
        }
    }

    /// Summary for one defined-but-inactive domain.
    ///
    /// The listing only yields the name; the uuid comes from an additional
    /// lookup, which can fail when the domain vanished in between.
    async fn inactive_summary(&self, name: String) -> VmServiceResult<VmSummary> {
        let dom = self.resolver.resolve_by_name(&name).await?;
        let uuid = dom.uuid().await?;
        Ok(VmSummary {
            name,
            uuid,
            active: false,
            id: None,
        })
    }

    /// Summary for one active domain; name and uuid fetch concurrently
    async fn active_summary(&self, id: u32) -> VmServiceResult<VmSummary> {
        let dom = self.resolver.resolve_by_id(id).await?;
        let (name, uuid) = tokio::try_join!(dom.name(), dom.uuid())?;
        Ok(VmSummary {
            name,
            uuid,
            active: true,
            id: Some(id),
        })
    }
}
