//! Typed relational assertions over entities.

use super::entity::{Entity, ModSite, ModificationType, default_true, site_name};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ASSERTION KIND
// =============================================================================

/// The tag of an [`Assertion`] variant.
///
/// Used as the first component of every policy-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssertionKind {
    Modification,
    Complex,
    ActivityModification,
}

impl AssertionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modification => "Modification",
            Self::Complex => "Complex",
            Self::ActivityModification => "ActivityModification",
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ASSERTION VARIANTS
// =============================================================================

/// "enzyme modifies substrate at (type, position)".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub enzyme: Entity,
    pub substrate: Entity,
    #[serde(rename = "modification")]
    pub kind: ModificationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl Modification {
    #[must_use]
    pub fn new(
        enzyme: Entity,
        substrate: Entity,
        kind: ModificationType,
        position: Option<&str>,
    ) -> Self {
        Self {
            enzyme,
            substrate,
            kind,
            position: position.map(str::to_string),
        }
    }

    /// The modification site this assertion adds to the substrate.
    #[must_use]
    pub fn site(&self) -> ModSite {
        ModSite {
            kind: self.kind,
            position: self.position.clone(),
        }
    }

    /// Name of the substrate site being modified.
    #[must_use]
    pub fn site_name(&self) -> String {
        site_name(self.kind, self.position.as_deref())
    }
}

/// "members form a complex".
///
/// Member order only matters for product derivation: the first member is the
/// scaffold the others bind to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub members: Vec<Entity>,
}

impl Complex {
    #[must_use]
    pub fn new(members: Vec<Entity>) -> Self {
        Self { members }
    }
}

/// "modifications on monomer change its activity".
///
/// Accepted as input and registered, but no product derivation or emission
/// rule exists for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityModification {
    pub monomer: Entity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<ModSite>,
    pub activity: String,
    #[serde(default = "default_true")]
    pub increases: bool,
}

// =============================================================================
// ASSERTION
// =============================================================================

/// A typed relational fact over one or more entities.
///
/// Assertions are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Assertion {
    Modification(Modification),
    Complex(Complex),
    ActivityModification(ActivityModification),
}

impl Assertion {
    /// The variant tag.
    #[must_use]
    pub const fn kind(&self) -> AssertionKind {
        match self {
            Self::Modification(_) => AssertionKind::Modification,
            Self::Complex(_) => AssertionKind::Complex,
            Self::ActivityModification(_) => AssertionKind::ActivityModification,
        }
    }

    /// Argument entities, in argument order.
    #[must_use]
    pub fn entities(&self) -> Vec<&Entity> {
        match self {
            Self::Modification(m) => vec![&m.enzyme, &m.substrate],
            Self::Complex(c) => c.members.iter().collect(),
            Self::ActivityModification(a) => vec![&a.monomer],
        }
    }
}

impl From<Modification> for Assertion {
    fn from(m: Modification) -> Self {
        Self::Modification(m)
    }
}

impl From<Complex> for Assertion {
    fn from(c: Complex) -> Self {
        Self::Complex(c)
    }
}

impl From<ActivityModification> for Assertion {
    fn from(a: ActivityModification) -> Self {
        Self::ActivityModification(a)
    }
}

// =============================================================================
// TESTS
// =============================================================================
