//! # Core Type Definitions
//!
//! This module contains all core types for the molasm assembly engine:
//! - Entities and the modification vocabulary (`Entity`, `ModSite`, `ModificationType`)
//! - Assertions (`Assertion`, `Modification`, `Complex`, `ActivityModification`)
//! - Dispatch coordinates (`AssertionKind`, `Phase`, `Policy`)
//! - Error and warning types (`AssemblyError`, `AssemblyWarning`)
//!
//! ## Determinism Guarantees
//!
//! All keyed types implement `Ord` so they can live in `BTreeMap`/`BTreeSet`.

mod assertion;
mod entity;

pub use assertion::{
    ActivityModification, Assertion, AssertionKind, Complex, Modification,
};
pub use entity::{
    BoundCondition, Entity, ModSite, ModificationType, binding_site_name, site_name,
};

use crate::primitives::DEFAULT_POLICY;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// DISPATCH COORDINATES
// =============================================================================

/// The two phases every assembly runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Handlers record entity shape information into the registry.
    Registration,
    /// Handlers append model or graph elements to the target aggregate.
    Emission,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration => f.write_str("registration"),
            Self::Emission => f.write_str("emission"),
        }
    }
}

/// Name of an assembly strategy for one assertion kind.
///
/// Policies are open: any name can be registered in a policy table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policy(pub String);

impl Policy {
    /// Create a policy from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The `"default"` policy.
    #[must_use]
    pub fn default_policy() -> Self {
        Self::new(DEFAULT_POLICY)
    }

    /// True for the `"default"` policy.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_POLICY
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::default_policy()
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while assembling.
///
/// - No silent failures
/// - Use `Result<T, AssemblyError>` for fallible operations
/// - The core never panics; malformed input surfaces here
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// No handler for the requested (kind, phase, policy) and no usable default.
    #[error("No {phase} handler for {kind} under policy '{policy}'")]
    UnknownPolicy {
        kind: AssertionKind,
        phase: Phase,
        policy: Policy,
    },

    /// A modification type outside the recognized vocabulary.
    #[error("Unknown modification type: {0}")]
    UnknownModificationType(String),

    /// The assertion kind has no product derivation or emission rule.
    #[error("Unsupported assertion type: {0}")]
    UnsupportedAssertionType(AssertionKind),

    /// The assertion is structurally unusable (e.g. an empty complex).
    #[error("Invalid assertion: {0}")]
    InvalidAssertion(String),

    /// A rule pattern references a monomer that was never declared.
    #[error("Unknown monomer: {0}")]
    UnknownMonomer(String),

    /// A rule pattern references a site the monomer does not declare.
    #[error("Monomer {monomer} has no site '{site}'")]
    UnknownSite { monomer: String, site: String },

    /// A graph handler referenced an entity with no node.
    #[error("No graph node for entity: {0}")]
    MissingNode(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// WARNINGS
// =============================================================================

/// Non-fatal conditions recorded on an assembled aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyWarning {
    /// A rule with this name already existed; the new one was skipped.
    DuplicateRule(String),
    /// An assertion contributed nothing to the output.
    SkippedAssertion { kind: AssertionKind, reason: String },
    /// No product could be derived for an assertion.
    SkippedProduct { kind: AssertionKind, reason: String },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRule(name) => write!(f, "Rule {} already in model, skipped", name),
            Self::SkippedAssertion { kind, reason } => {
                write!(f, "Skipped {} assertion: {}", kind, reason)
            }
            Self::SkippedProduct { kind, reason } => {
                write!(f, "No product for {} assertion: {}", kind, reason)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_policy_message_names_triple() {
        let err = AssemblyError::UnknownPolicy {
            kind: AssertionKind::Complex,
            phase: Phase::Emission,
            policy: Policy::new("two_step"),
        };
        assert_eq!(
            err.to_string(),
            "No emission handler for Complex under policy 'two_step'"
        );
    }

    #[test]
    fn default_policy_is_default() {
        assert!(Policy::default().is_default());
        assert!(!Policy::new("two_step").is_default());
    }

    #[test]
    fn policy_serializes_as_plain_string() {
        let json = serde_json::to_string(&Policy::new("two_step")).expect("serialize");
        assert_eq!(json, "\"two_step\"");
    }
}
