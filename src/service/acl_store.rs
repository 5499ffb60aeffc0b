// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metadata ACL Store
//!
//! Persists the ordered assignee list as an XML document embedded in the
//! domain's metadata slot (see [`crate::acl`]). Every operation resolves the
//! domain, fetches-or-synthesizes the document, and parses it once; writers
//! always resend the complete document.
//!
//! # Concurrency limitation
//!
//! The metadata channel offers no conditional write, so two callers editing
//! the same domain race and the later write wins with no detection of the
//! lost update. This is documented behavior, not handled here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acl::{AclDocument, ACL_METADATA_NAMESPACE, ACL_METADATA_QUALIFIER};
use crate::connector::{codes, DomainHandle};
use crate::domain::{Assignee, AssigneeType};
use crate::errors::{VmServiceError, VmServiceResult};
use crate::service::resolve::DomainResolver;

/// Outcome of an assignee upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    /// `true` when no record existed for the user (create),
    /// `false` when an existing record was replaced (update)
    pub created: bool,
}

/// ACL operations against one domain's metadata slot
pub struct MetadataAclStore {
    resolver: DomainResolver,
}

impl MetadataAclStore {
    /// Create a store over the shared resolver
    pub fn new(resolver: DomainResolver) -> Self {
        Self { resolver }
    }

    /// Assignee records for a domain, in document order.
    ///
    /// A domain with no prior write reads as an empty list.
    pub async fn assignees(&self, key: &str) -> VmServiceResult<Vec<Assignee>> {
        let (_dom, doc) = self.load(key).await?;
        Ok(doc.into_records())
    }

    /// Create or update the record for `user`.
    ///
    /// `assignee_type` must spell `administrator` or `user`; anything else
    /// fails with `InvalidArgument` before the domain is touched.
    pub async fn add_or_update(
        &self,
        key: &str,
        user: &str,
        assignee_type: &str,
    ) -> VmServiceResult<UpsertOutcome> {
        let assignee_type: AssigneeType = assignee_type.parse()?;

        let (dom, mut doc) = self.load(key).await?;
        let created = doc.upsert(user, assignee_type);
        self.store(dom.as_ref(), &doc).await?;

        debug!(key = %key, user = %user, created, "Assignee upserted");
        Ok(UpsertOutcome { created })
    }

    /// Remove the record for `user`.
    ///
    /// Removing an absent assignee fails with `AssigneeNotFound` even though
    /// the resulting state would be unchanged; delete is deliberately not
    /// idempotent here.
    pub async fn remove(&self, key: &str, user: &str) -> VmServiceResult<()> {
        let (dom, mut doc) = self.load(key).await?;

        if !doc.remove(user) {
            return Err(VmServiceError::AssigneeNotFound(user.to_string()));
        }
        self.store(dom.as_ref(), &doc).await?;

        debug!(key = %key, user = %user, "Assignee removed");
        Ok(())
    }

    /// Resolve the domain and fetch-or-synthesize its ACL document.
    ///
    /// The connector's "no domain metadata" code reads as an empty document,
    /// not an error; the document only exists after the first write.
    async fn load(&self, key: &str) -> VmServiceResult<(Arc<dyn DomainHandle>, AclDocument)> {
        let dom = self.resolver.resolve(key).await?;

        let doc = match dom.metadata(ACL_METADATA_NAMESPACE).await {
            Ok(xml) => AclDocument::parse(&xml)?,
            Err(e) if e.code == codes::NO_DOMAIN_METADATA => AclDocument::empty(),
            Err(e) => return Err(e.into()),
        };

        Ok((dom, doc))
    }

    /// Write the whole document back in one call
    async fn store(&self, dom: &dyn DomainHandle, doc: &AclDocument) -> VmServiceResult<()> {
        dom.set_metadata(
            &doc.to_xml(),
            ACL_METADATA_QUALIFIER,
            ACL_METADATA_NAMESPACE,
        )
        .await?;
        Ok(())
    }
}
