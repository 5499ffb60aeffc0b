//! Error taxonomy for VM service operations

use std::time::Duration;

use thiserror::Error;

use crate::connector::ConnectorError;
use crate::domain::{LookupMethod, VmSummary};

/// Errors that can occur in VM service operations
#[derive(Debug, Error)]
pub enum VmServiceError {
    /// No domain exists for the supplied key
    #[error("no domain found for {method} lookup of \"{key}\"")]
    DomainNotFound {
        /// The caller-supplied domain key
        key: String,
        /// How the key was classified and looked up
        method: LookupMethod,
    },

    /// The domain is not in the power state the operation requires
    #[error("wrong power state: {0}")]
    WrongPowerState(String),

    /// An operation argument failed validation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An assignee with this user already exists on the domain
    #[error("assignee \"{0}\" already exists")]
    AssigneeAlreadyExists(String),

    /// No assignee with this user exists on the domain
    #[error("assignee \"{0}\" does not exist")]
    AssigneeNotFound(String),

    /// The metadata document could not be parsed
    #[error("metadata parse failure: {0}")]
    MetadataParse(String),

    /// The domain does not carry exactly one graphics device
    #[error("expected exactly one graphics device, found {0}")]
    GraphicsDeviceConflict(usize),

    /// A bounded wait elapsed without reaching the target state
    #[error("timed out after {0:?} waiting for target power state")]
    Timeout(Duration),

    /// Enumeration finished with one or more failed sub-operations
    #[error("enumeration finished with {} error(s), {} summaries completed",
        .0.errors.len(), .0.completed.len())]
    Enumeration(EnumerationFailure),

    /// Unmapped connector failure, propagated unchanged
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

/// Result type for VM service operations
pub type VmServiceResult<T> = Result<T, VmServiceError>;

impl From<crate::acl::AclParseError> for VmServiceError {
    fn from(err: crate::acl::AclParseError) -> Self {
        VmServiceError::MetadataParse(err.to_string())
    }
}

impl From<crate::domain::UnknownAssigneeType> for VmServiceError {
    fn from(err: crate::domain::UnknownAssigneeType) -> Self {
        VmServiceError::InvalidArgument(err.to_string())
    }
}

/// Aggregate outcome of a partially failed enumeration.
///
/// A failure in one domain's resolution never discards results for sibling
/// domains; whatever completed rides along with the full error set.
#[derive(Debug)]
pub struct EnumerationFailure {
    /// Summaries that resolved successfully
    pub completed: Vec<VmSummary>,
    /// One error per failed sub-operation
    pub errors: Vec<VmServiceError>,
}

impl VmServiceError {
    /// Whether this error is a power-state conflict.
    ///
    /// The forced power cycle uses this to tell a tolerable "already off"
    /// destroy apart from failures that must abort the sequence.
    pub fn is_wrong_power_state(&self) -> bool {
        matches!(self, VmServiceError::WrongPowerState(_))
    }
}
