//! # Identity Module
//!
//! Canonical, order-independent identity keys for entities and assertions.
//!
//! Two entities with equal keys are interchangeable for node and monomer
//! identity even when they are distinct values. Keys are pure functions of
//! their input; nothing here holds state.

use crate::types::{Assertion, Entity, ModSite};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// ENTITY KEY
// =============================================================================

/// Canonical identity of an [`Entity`].
///
/// Built from the name, the modification set and the binding set. Sets are
/// `BTreeSet`s, so insertion order never changes the key; bound partners are
/// keyed recursively. Cross-references do not take part in identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    name: String,
    modifications: BTreeSet<ModSite>,
    bindings: BTreeSet<(EntityKey, bool)>,
}

impl EntityKey {
    /// The entity name this key was built from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Compute the canonical key of an entity.
#[must_use]
pub fn key(entity: &Entity) -> EntityKey {
    EntityKey {
        name: entity.name.clone(),
        modifications: entity.modifications.iter().cloned().collect(),
        bindings: entity
            .bound_conditions
            .iter()
            .map(|bc| (key(&bc.partner), bc.is_bound))
            .collect(),
    }
}

impl Entity {
    /// Canonical key of this entity. See [`key`].
    #[must_use]
    pub fn key(&self) -> EntityKey {
        key(self)
    }
}

impl fmt::Display for EntityKey {
    /// Renders as `NAME[site,...]{+bound,-unbound}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.modifications.is_empty() {
            let sites: Vec<String> = self.modifications.iter().map(ModSite::site_name).collect();
            write!(f, "[{}]", sites.join(","))?;
        }
        if !self.bindings.is_empty() {
            f.write_str("{")?;
            for (i, (partner, bound)) in self.bindings.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}{}", if *bound { '+' } else { '-' }, partner)?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

// =============================================================================
// ASSERTION KEY
// =============================================================================

/// Structural identity of an [`Assertion`].
///
/// Same variant, argument keys equal pairwise in argument order, and equal
/// non-entity arguments (modification site, activity).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssertionKey {
    Modification {
        enzyme: EntityKey,
        substrate: EntityKey,
        site: ModSite,
    },
    Complex {
        members: Vec<EntityKey>,
    },
    ActivityModification {
        monomer: EntityKey,
        modifications: BTreeSet<ModSite>,
        activity: String,
        increases: bool,
    },
}

impl Assertion {
    /// Structural key of this assertion.
    #[must_use]
    pub fn key(&self) -> AssertionKey {
        match self {
            Self::Modification(m) => AssertionKey::Modification {
                enzyme: m.enzyme.key(),
                substrate: m.substrate.key(),
                site: m.site(),
            },
            Self::Complex(c) => AssertionKey::Complex {
                members: c.members.iter().map(Entity::key).collect(),
            },
            Self::ActivityModification(a) => AssertionKey::ActivityModification {
                monomer: a.monomer.key(),
                modifications: a.modifications.iter().cloned().collect(),
                activity: a.activity.clone(),
                increases: a.increases,
            },
        }
    }

    /// True if both assertions are structurally equal.
    #[must_use]
    pub fn matches(&self, other: &Assertion) -> bool {
        self.key() == other.key()
    }
}

// =============================================================================
// TESTS
// =============================================================================
