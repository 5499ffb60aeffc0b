// Copyright (c) 2025 - Cowboy AI, Inc.
//! Assignee Value Objects
//!
//! An assignee associates a user with a domain for authorization purposes,
//! carrying one of two role types. At most one record exists per
//! (domain, user) pair; the store enforces this by remove-then-insert on
//! update, never by a storage-level uniqueness constraint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A role type string that is neither `administrator` nor `user`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown assignee type \"{0}\", expected \"administrator\" or \"user\"")]
pub struct UnknownAssigneeType(pub String);

/// Role type of an assignee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeType {
    /// Full administrative access to the domain
    Administrator,
    /// Regular user access
    User,
}

impl AssigneeType {
    /// The wire/storage spelling of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            AssigneeType::Administrator => "administrator",
            AssigneeType::User => "user",
        }
    }
}

impl FromStr for AssigneeType {
    type Err = UnknownAssigneeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(AssigneeType::Administrator),
            "user" => Ok(AssigneeType::User),
            other => Err(UnknownAssigneeType(other.to_string())),
        }
    }
}

impl fmt::Display for AssigneeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user-to-domain authorization record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    /// User the record applies to
    pub user: String,
    /// Role type granted
    #[serde(rename = "type")]
    pub assignee_type: AssigneeType,
}

impl Assignee {
    /// Create an assignee record
    pub fn new(user: impl Into<String>, assignee_type: AssigneeType) -> Self {
        Self {
            user: user.into(),
            assignee_type,
        }
    }
}
