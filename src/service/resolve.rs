// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Resolution
//!
//! Classifies a caller-supplied key as UUID or name and dispatches the
//! matching connector lookup. Resolution failures are reported immediately;
//! there are no retries, and handles are never cached across operations.

use std::sync::Arc;

use tracing::debug;

use crate::connector::{codes, ConnectorError, DomainHandle, HypervisorConnector};
use crate::domain::{DomainKey, LookupMethod};
use crate::errors::{VmServiceError, VmServiceResult};

/// Resolves domain keys into transient connector handles
#[derive(Clone)]
pub struct DomainResolver {
    connector: Arc<dyn HypervisorConnector>,
}

impl DomainResolver {
    /// Create a resolver over the shared connector handle
    pub fn new(connector: Arc<dyn HypervisorConnector>) -> Self {
        Self { connector }
    }

    /// Resolve a caller-supplied key.
    ///
    /// A key matching the canonical 8-4-4-4-12 pattern resolves by UUID;
    /// anything else resolves by name.
    pub async fn resolve(&self, key: &str) -> VmServiceResult<Arc<dyn DomainHandle>> {
        let classified = DomainKey::classify(key);
        debug!(key = %key, method = %classified.method(), "Resolving domain");

        let result = match &classified {
            DomainKey::Uuid(uuid) => {
                self.connector
                    .lookup_domain_by_uuid(&uuid.to_string())
                    .await
            }
            DomainKey::Name(name) => self.connector.lookup_domain_by_name(name).await,
        };

        result.map_err(|e| classify_lookup_failure(key, classified.method(), e))
    }

    /// Resolve a name from the defined-domain listing.
    ///
    /// Listing output is always a name, so no classification happens here
    /// even when the name happens to look like a UUID.
    pub async fn resolve_by_name(&self, name: &str) -> VmServiceResult<Arc<dyn DomainHandle>> {
        self.connector
            .lookup_domain_by_name(name)
            .await
            .map_err(|e| classify_lookup_failure(name, LookupMethod::Name, e))
    }

    /// Resolve a numeric id from the active-domain listing
    pub async fn resolve_by_id(&self, id: u32) -> VmServiceResult<Arc<dyn DomainHandle>> {
        self.connector
            .lookup_domain_by_id(id)
            .await
            .map_err(|e| classify_lookup_failure(&id.to_string(), LookupMethod::Id, e))
    }
}

/// Translate a connector lookup failure at the service boundary.
///
/// Only the "no such domain" code remaps; everything else passes through
/// unchanged.
fn classify_lookup_failure(key: &str, method: LookupMethod, err: ConnectorError) -> VmServiceError {
    if err.code == codes::NO_DOMAIN {
        VmServiceError::DomainNotFound {
            key: key.to_string(),
            method,
        }
    } else {
        err.into()
    }
}
