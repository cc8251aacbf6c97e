//! Entity representation and the modification vocabulary.
//!
//! An [`Entity`] is a molecular species in one particular variant: a stable
//! `name` shared by every variant, the modification sites it carries, and the
//! partners it is (or is explicitly not) bound to.

use super::AssemblyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// MODIFICATION VOCABULARY
// =============================================================================

/// A recognized post-translational modification type.
///
/// The vocabulary is closed: anything else is rejected with
/// [`AssemblyError::UnknownModificationType`] when parsed, so an unknown type
/// can never reach keying or assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModificationType {
    PhosphorylationSerine,
    PhosphorylationThreonine,
    PhosphorylationTyrosine,
    Phosphorylation,
    Ubiquitination,
    Farnesylation,
    Hydroxylation,
    Acetylation,
    Sumoylation,
    Glycosylation,
    Methylation,
    Modification,
}

impl ModificationType {
    /// Every recognized type, in vocabulary order.
    pub const ALL: [Self; 12] = [
        Self::PhosphorylationSerine,
        Self::PhosphorylationThreonine,
        Self::PhosphorylationTyrosine,
        Self::Phosphorylation,
        Self::Ubiquitination,
        Self::Farnesylation,
        Self::Hydroxylation,
        Self::Acetylation,
        Self::Sumoylation,
        Self::Glycosylation,
        Self::Methylation,
        Self::Modification,
    ];

    /// The canonical type name, as accepted by `FromStr`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PhosphorylationSerine => "PhosphorylationSerine",
            Self::PhosphorylationThreonine => "PhosphorylationThreonine",
            Self::PhosphorylationTyrosine => "PhosphorylationTyrosine",
            Self::Phosphorylation => "Phosphorylation",
            Self::Ubiquitination => "Ubiquitination",
            Self::Farnesylation => "Farnesylation",
            Self::Hydroxylation => "Hydroxylation",
            Self::Acetylation => "Acetylation",
            Self::Sumoylation => "Sumoylation",
            Self::Glycosylation => "Glycosylation",
            Self::Methylation => "Methylation",
            Self::Modification => "Modification",
        }
    }

    /// Short prefix used to build site names.
    #[must_use]
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::PhosphorylationSerine => "S",
            Self::PhosphorylationThreonine => "T",
            Self::PhosphorylationTyrosine => "Y",
            Self::Phosphorylation => "phospho",
            Self::Ubiquitination => "ub",
            Self::Farnesylation => "farnesyl",
            Self::Hydroxylation => "hydroxyl",
            Self::Acetylation => "acetyl",
            Self::Sumoylation => "sumo",
            Self::Glycosylation => "glycosyl",
            Self::Methylation => "methyl",
            Self::Modification => "mod",
        }
    }

    /// The `(unmodified, modified)` state pair of a site of this type.
    #[must_use]
    pub const fn states(self) -> (&'static str, &'static str) {
        match self {
            Self::PhosphorylationSerine
            | Self::PhosphorylationThreonine
            | Self::PhosphorylationTyrosine
            | Self::Phosphorylation => ("u", "p"),
            _ => ("n", "y"),
        }
    }

    /// The unmodified state value.
    #[must_use]
    pub const fn unmodified(self) -> &'static str {
        self.states().0
    }

    /// The modified state value.
    #[must_use]
    pub const fn modified(self) -> &'static str {
        self.states().1
    }
}

impl fmt::Display for ModificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModificationType {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| AssemblyError::UnknownModificationType(s.to_string()))
    }
}

impl TryFrom<String> for ModificationType {
    type Error = AssemblyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModificationType> for String {
    fn from(kind: ModificationType) -> Self {
        kind.name().to_string()
    }
}

// =============================================================================
// MODIFICATION SITE
// =============================================================================

/// A (modification type, position) pair carried by an entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModSite {
    /// The modification type.
    #[serde(rename = "modification")]
    pub kind: ModificationType,
    /// Residue position, if known (e.g. "218").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl ModSite {
    /// A modification at a known position.
    #[must_use]
    pub fn at(kind: ModificationType, position: impl Into<String>) -> Self {
        Self {
            kind,
            position: Some(position.into()),
        }
    }

    /// A modification with no known position.
    #[must_use]
    pub const fn unpositioned(kind: ModificationType) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    /// Site name: abbreviation followed by the position, if any.
    #[must_use]
    pub fn site_name(&self) -> String {
        site_name(self.kind, self.position.as_deref())
    }
}

/// Build a site name from a modification type and optional position.
#[must_use]
pub fn site_name(kind: ModificationType, position: Option<&str>) -> String {
    format!("{}{}", kind.abbrev(), position.unwrap_or(""))
}

/// Name of the site an entity uses to bind `partner_name`.
///
/// Binding sites are named after the partner, lower-cased.
#[must_use]
pub fn binding_site_name(partner_name: &str) -> String {
    partner_name.to_lowercase()
}

// =============================================================================
// BOUND CONDITION
// =============================================================================

/// A binding condition on an entity: bound (or explicitly not bound) to a partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundCondition {
    /// The binding partner.
    pub partner: Entity,
    /// True if the partner is bound, false if the entity is known to be free of it.
    #[serde(default = "default_true")]
    pub is_bound: bool,
}

pub(crate) const fn default_true() -> bool {
    true
}

// =============================================================================
// ENTITY
// =============================================================================

/// A molecular species in a specific modification/binding variant.
///
/// Entities are values: deriving a variant always builds a new `Entity`
/// and never touches the one it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable name shared by every variant of the base species.
    pub name: String,
    /// Modification sites carried by this variant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifications: Vec<ModSite>,
    /// Binding conditions of this variant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_conditions: Vec<BoundCondition>,
    /// External database name -> identifier.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub db_refs: BTreeMap<String, String>,
}

impl Entity {
    /// Create a bare entity with no modifications, partners or references.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifications: Vec::new(),
            bound_conditions: Vec::new(),
            db_refs: BTreeMap::new(),
        }
    }

    /// Builder: add a modification site.
    #[must_use]
    pub fn with_site(mut self, site: ModSite) -> Self {
        self.modifications.push(site);
        self
    }

    /// Builder: add a bound partner.
    #[must_use]
    pub fn bound_to(mut self, partner: Entity) -> Self {
        self.bound_conditions.push(BoundCondition {
            partner,
            is_bound: true,
        });
        self
    }

    /// Builder: add a partner this entity is known not to be bound to.
    #[must_use]
    pub fn not_bound_to(mut self, partner: Entity) -> Self {
        self.bound_conditions.push(BoundCondition {
            partner,
            is_bound: false,
        });
        self
    }

    /// Builder: add a cross-reference.
    #[must_use]
    pub fn with_db_ref(mut self, db: impl Into<String>, id: impl Into<String>) -> Self {
        self.db_refs.insert(db.into(), id.into());
        self
    }

    /// True if at least one partner is actually bound.
    #[must_use]
    pub fn has_bound_partners(&self) -> bool {
        self.bound_conditions.iter().any(|bc| bc.is_bound)
    }

    /// The partners that are actually bound, in declaration order.
    pub fn bound_partners(&self) -> impl Iterator<Item = &Entity> {
        self.bound_conditions
            .iter()
            .filter(|bc| bc.is_bound)
            .map(|bc| &bc.partner)
    }

    /// A copy of this entity with every binding condition removed.
    #[must_use]
    pub fn without_bindings(&self) -> Self {
        Self {
            name: self.name.clone(),
            modifications: self.modifications.clone(),
            bound_conditions: Vec::new(),
            db_refs: self.db_refs.clone(),
        }
    }

    /// Identifier used in rule names: name, site names, then partners.
    ///
    /// Partners that are explicitly unbound get an `n` prefix.
    #[must_use]
    pub fn rule_str(&self) -> String {
        let mut parts = vec![self.name.clone()];
        parts.extend(self.modifications.iter().map(ModSite::site_name));
        for bc in &self.bound_conditions {
            if bc.is_bound {
                parts.push(bc.partner.name.clone());
            } else {
                parts.push(format!("n{}", bc.partner.name));
            }
        }
        parts.join("_")
    }
}

// =============================================================================
// TESTS
// =============================================================================
