//! Access-control vocabulary
//!
//! Shared between the rule-capture path (save time) and the resolver
//! (evaluation time). The rule rows themselves live in the backend; these
//! are the enums and result types both sides speak.

use crate::types::DocPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the cascade a rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccessScope {
    /// Site-wide rules, read from the site preferences document
    Root = 0,
    /// Per-container rules, read from the container preferences document
    Container = 1,
    /// Per-document rules, read from the document itself
    Document = 2,
}

impl fmt::Display for AccessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessScope::Root => "root",
            AccessScope::Container => "container",
            AccessScope::Document => "document",
        };
        write!(f, "{}", s)
    }
}

/// What a rule row grants or withholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Permission {
    /// Explicit deny for the rule's principal
    Deny = 0,
    /// Explicit allow for the rule's principal
    Allow = 1,
    /// Synthesized deny for everyone not named by a broader-scope allow
    /// list. Never written by the host directly.
    DenyRemainder = 2,
}

/// What an access check is asked about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTarget {
    /// The site as a whole
    Root,
    /// A container by name
    Container(String),
    /// A single document
    Document(DocPath),
}

/// Outcome of an access check
///
/// Denials always carry a human-readable reason; permits never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the principal may proceed
    pub permitted: bool,
    /// Why not, when `permitted` is false
    pub reason: Option<String>,
}

impl AccessDecision {
    /// A permit
    pub fn permit() -> Self {
        Self {
            permitted: true,
            reason: None,
        }
    }

    /// A denial with its reason
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            permitted: false,
            reason: Some(reason.into()),
        }
    }
}
