//! # Entity Registry
//!
//! Accumulates, per entity name, the union of every site, allowed state and
//! cross-reference seen across all assertions.
//!
//! - Purely additive: sites, states and references are only ever unioned in
//! - Entries are created lazily on first mention and never removed
//! - Iteration is first-seen order, independent of map ordering

use crate::types::{AssemblyError, Assertion, Entity, binding_site_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// REGISTRY ENTRY
// =============================================================================

/// Everything known about one named entity across all its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistryEntry {
    /// The entity name.
    pub name: String,
    /// Site names in first-seen order.
    pub sites: Vec<String>,
    /// Allowed states per stated site. Binding sites have no entry.
    pub site_states: BTreeMap<String, Vec<String>>,
    /// External database name -> identifier.
    pub db_refs: BTreeMap<String, String>,
}

impl EntityRegistryEntry {
    /// Create an entry with no sites.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sites: Vec::new(),
            site_states: BTreeMap::new(),
            db_refs: BTreeMap::new(),
        }
    }

    /// Declare a site, unioning any states into what is already known.
    ///
    /// An empty `states` slice declares a binding site. A name already used
    /// by the other kind of site is rejected.
    pub fn create_site(&mut self, site: &str, states: &[&str]) -> Result<(), AssemblyError> {
        if self.has_site(site) {
            let stated = self.site_states.contains_key(site);
            if stated == states.is_empty() {
                return Err(AssemblyError::InvalidAssertion(format!(
                    "site '{}' on {} is used both as a binding site and a modification site",
                    site, self.name
                )));
            }
        } else {
            self.sites.push(site.to_string());
        }
        if states.is_empty() {
            return Ok(());
        }
        let known = self.site_states.entry(site.to_string()).or_default();
        for state in states {
            if !known.iter().any(|s| s == state) {
                known.push((*state).to_string());
            }
        }
        Ok(())
    }

    /// Check whether a site has been declared.
    #[must_use]
    pub fn has_site(&self, site: &str) -> bool {
        self.sites.iter().any(|s| s == site)
    }

    /// Allowed states of a site, if it is a stated site.
    #[must_use]
    pub fn states(&self, site: &str) -> Option<&[String]> {
        self.site_states.get(site).map(Vec::as_slice)
    }

    /// Union cross-references in. Existing identifiers are kept.
    pub fn merge_db_refs(&mut self, refs: &BTreeMap<String, String>) {
        for (db, id) in refs {
            self.db_refs.entry(db.clone()).or_insert_with(|| id.clone());
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Registry of every distinct entity name seen during registration.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: Vec<EntityRegistryEntry>,
    index: BTreeMap<String, usize>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `name`, creating it if absent.
    pub fn entry_mut(&mut self, name: &str) -> &mut EntityRegistryEntry {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                tracing::debug!(entity = name, "registering new entity");
                self.entries.push(EntityRegistryEntry::new(name));
                let idx = self.entries.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx]
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityRegistryEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    /// Merge an entity's vocabulary into its entry.
    ///
    /// Records every modification site with its states, a binding site per
    /// binding condition, and cross-references. Partners are registered
    /// recursively.
    pub fn register(&mut self, entity: &Entity) -> Result<(), AssemblyError> {
        let entry = self.entry_mut(&entity.name);
        for site in &entity.modifications {
            let (unmodified, modified) = site.kind.states();
            entry.create_site(&site.site_name(), &[unmodified, modified])?;
        }
        for bc in &entity.bound_conditions {
            entry.create_site(&binding_site_name(&bc.partner.name), &[])?;
        }
        entry.merge_db_refs(&entity.db_refs);

        for bc in &entity.bound_conditions {
            self.register(&bc.partner)?;
        }
        Ok(())
    }

    /// Declare reciprocal binding sites on two entities.
    pub fn register_binding(&mut self, a: &Entity, b: &Entity) -> Result<(), AssemblyError> {
        self.entry_mut(&a.name)
            .create_site(&binding_site_name(&b.name), &[])?;
        self.entry_mut(&b.name)
            .create_site(&binding_site_name(&a.name), &[])
    }

    /// All entries in first-seen order.
    pub fn declared_entities(&self) -> impl Iterator<Item = &EntityRegistryEntry> {
        self.entries.iter()
    }

    /// Number of distinct entity names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// BUILT-IN REGISTRATION HANDLERS
// =============================================================================

/// Registration for one-step modification: enzyme, substrate, and the
/// modified site on the substrate.
pub fn register_modification(
    assertion: &Assertion,
    registry: &mut EntityRegistry,
) -> Result<(), AssemblyError> {
    let Assertion::Modification(m) = assertion else {
        return Err(AssemblyError::UnsupportedAssertionType(assertion.kind()));
    };
    registry.register(&m.enzyme)?;
    registry.register(&m.substrate)?;
    let (unmodified, modified) = m.kind.states();
    registry
        .entry_mut(&m.substrate.name)
        .create_site(&m.site_name(), &[unmodified, modified])
}

/// Registration for modification policies that bind enzyme to substrate.
pub fn register_modification_binding(
    assertion: &Assertion,
    registry: &mut EntityRegistry,
) -> Result<(), AssemblyError> {
    register_modification(assertion, registry)?;
    if let Assertion::Modification(m) = assertion {
        registry.register_binding(&m.enzyme, &m.substrate)?;
    }
    Ok(())
}

/// Registration for modifications modeled as binding only. The modified site
/// is not declared.
pub fn register_enzyme_substrate_binding(
    assertion: &Assertion,
    registry: &mut EntityRegistry,
) -> Result<(), AssemblyError> {
    let Assertion::Modification(m) = assertion else {
        return Err(AssemblyError::UnsupportedAssertionType(assertion.kind()));
    };
    registry.register(&m.enzyme)?;
    registry.register(&m.substrate)?;
    registry.register_binding(&m.enzyme, &m.substrate)
}

/// Registration for complex formation: every member, and a binding site on
/// each member for every other member.
pub fn register_complex(
    assertion: &Assertion,
    registry: &mut EntityRegistry,
) -> Result<(), AssemblyError> {
    let Assertion::Complex(c) = assertion else {
        return Err(AssemblyError::UnsupportedAssertionType(assertion.kind()));
    };
    for member in &c.members {
        registry.register(member)?;
    }
    for (i, a) in c.members.iter().enumerate() {
        for b in c.members.iter().skip(i + 1) {
            registry.register_binding(a, b)?;
        }
    }
    Ok(())
}

/// Registration for activity modification: the monomer and its listed sites.
pub fn register_activity_modification(
    assertion: &Assertion,
    registry: &mut EntityRegistry,
) -> Result<(), AssemblyError> {
    let Assertion::ActivityModification(a) = assertion else {
        return Err(AssemblyError::UnsupportedAssertionType(assertion.kind()));
    };
    registry.register(&a.monomer)?;
    let entry = registry.entry_mut(&a.monomer.name);
    for site in &a.modifications {
        let (unmodified, modified) = site.kind.states();
        entry.create_site(&site.site_name(), &[unmodified, modified])?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complex, ModSite, Modification, ModificationType};

    #[test]
    fn register_creates_entry_lazily() {
        let mut registry = EntityRegistry::new();
        assert!(registry.is_empty());
        registry.register(&Entity::new("BRAF")).expect("register");
        registry.register(&Entity::new("BRAF")).expect("register");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn narrower_view_does_not_erase_sites() {
        let mut registry = EntityRegistry::new();
        let wide = Entity::new("MAP2K1")
            .with_site(ModSite::at(ModificationType::PhosphorylationSerine, "218"));
        registry.register(&wide).expect("register");
        registry.register(&Entity::new("MAP2K1")).expect("register");

        let entry = registry.get("MAP2K1").expect("entry");
        assert!(entry.has_site("S218"));
        assert_eq!(
            entry.states("S218"),
            Some(&["u".to_string(), "p".to_string()][..])
        );
    }

    #[test]
    fn db_refs_are_unioned_not_overwritten() {
        let mut registry = EntityRegistry::new();
        registry
            .register(&Entity::new("BRAF").with_db_ref("HGNC", "1097"))
            .expect("register");
        registry
            .register(
                &Entity::new("BRAF")
                    .with_db_ref("HGNC", "9999")
                    .with_db_ref("UP", "P15056"),
            )
            .expect("register");
        let entry = registry.get("BRAF").expect("entry");
        assert_eq!(entry.db_refs.get("HGNC").map(String::as_str), Some("1097"));
        assert_eq!(entry.db_refs.get("UP").map(String::as_str), Some("P15056"));
    }

    #[test]
    fn bound_partners_register_recursively() {
        let mut registry = EntityRegistry::new();
        registry
            .register(&Entity::new("A").bound_to(Entity::new("B").bound_to(Entity::new("C"))))
            .expect("register");
        assert!(registry.get("A").expect("A").has_site("b"));
        assert!(registry.get("B").expect("B").has_site("c"));
        assert!(registry.get("C").is_some());
    }

    #[test]
    fn binding_site_cannot_shadow_modification_site() {
        let mut registry = EntityRegistry::new();
        let modified = Entity::new("MAP2K1")
            .with_site(ModSite::unpositioned(ModificationType::Phosphorylation));
        registry.register(&modified).expect("register");

        let bound = Entity::new("MAP2K1").bound_to(Entity::new("PHOSPHO"));
        assert!(matches!(
            registry.register(&bound),
            Err(AssemblyError::InvalidAssertion(_))
        ));

        let mut reversed = EntityRegistry::new();
        reversed.register(&bound).expect("register");
        assert!(matches!(
            reversed.register(&modified),
            Err(AssemblyError::InvalidAssertion(_))
        ));
    }

    #[test]
    fn declared_entities_keep_first_seen_order() {
        let mut registry = EntityRegistry::new();
        for name in ["ZAP70", "ABL1", "MAPK1"] {
            registry.register(&Entity::new(name)).expect("register");
        }
        let names: Vec<_> = registry.declared_entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ZAP70", "ABL1", "MAPK1"]);
    }

    #[test]
    fn modification_handler_adds_substrate_site() {
        let mut registry = EntityRegistry::new();
        let a: Assertion = Modification::new(
            Entity::new("BRAF"),
            Entity::new("MAP2K1"),
            ModificationType::Ubiquitination,
            None,
        )
        .into();
        register_modification(&a, &mut registry).expect("register");
        let entry = registry.get("MAP2K1").expect("entry");
        assert_eq!(entry.sites, vec!["ub".to_string()]);
        assert_eq!(entry.states("ub"), Some(&["n".to_string(), "y".to_string()][..]));
        assert!(registry.get("BRAF").expect("entry").sites.is_empty());
    }

    #[test]
    fn binding_handler_adds_reciprocal_sites() {
        let mut registry = EntityRegistry::new();
        let a: Assertion = Modification::new(
            Entity::new("BRAF"),
            Entity::new("MAP2K1"),
            ModificationType::Phosphorylation,
            None,
        )
        .into();
        register_modification_binding(&a, &mut registry).expect("register");
        assert!(registry.get("BRAF").expect("BRAF").has_site("map2k1"));
        assert!(registry.get("MAP2K1").expect("MAP2K1").has_site("braf"));
    }

    #[test]
    fn interaction_handler_skips_modified_site() {
        let mut registry = EntityRegistry::new();
        let a: Assertion = Modification::new(
            Entity::new("BRAF"),
            Entity::new("MAP2K1"),
            ModificationType::PhosphorylationSerine,
            Some("218"),
        )
        .into();
        register_enzyme_substrate_binding(&a, &mut registry).expect("register");
        assert_eq!(
            registry.get("MAP2K1").expect("MAP2K1").sites,
            vec!["braf".to_string()]
        );
    }

    #[test]
    fn complex_handler_adds_pairwise_sites() {
        let mut registry = EntityRegistry::new();
        let a: Assertion =
            Complex::new(vec![Entity::new("A"), Entity::new("B"), Entity::new("C")]).into();
        register_complex(&a, &mut registry).expect("register");
        let entry = registry.get("A").expect("A");
        assert_eq!(entry.sites, vec!["b".to_string(), "c".to_string()]);
        assert!(registry.get("C").expect("C").has_site("b"));
    }

    #[test]
    fn handler_rejects_wrong_variant() {
        let mut registry = EntityRegistry::new();
        let a: Assertion = Complex::new(vec![Entity::new("A")]).into();
        let result = register_modification(&a, &mut registry);
        assert!(matches!(
            result,
            Err(AssemblyError::UnsupportedAssertionType(_))
        ));
    }
}
