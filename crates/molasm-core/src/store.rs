//! # Assertion Store
//!
//! The deduplicated working set of assertions for one assembly.
//!
//! - Insertion order is preserved
//! - Structural duplicates (equal [`AssertionKey`]) are dropped on insert
//! - Stored assertions are never mutated

use crate::identity::AssertionKey;
use crate::types::Assertion;
use std::collections::BTreeSet;

/// Deduplicated, insertion-ordered assertion set.
#[derive(Debug, Clone, Default)]
pub struct AssertionStore {
    assertions: Vec<Assertion>,
    keys: BTreeSet<AssertionKey>,
}

impl AssertionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every assertion not already present. Returns how many were added.
    pub fn add<I>(&mut self, assertions: I) -> usize
    where
        I: IntoIterator<Item = Assertion>,
    {
        let mut added = 0;
        for assertion in assertions {
            if self.keys.insert(assertion.key()) {
                self.assertions.push(assertion);
                added += 1;
            } else {
                tracing::debug!(kind = %assertion.kind(), "dropping duplicate assertion");
            }
        }
        added
    }

    /// Check whether a structurally equal assertion is stored.
    #[must_use]
    pub fn exists(&self, assertion: &Assertion) -> bool {
        self.keys.contains(&assertion.key())
    }

    /// Stored assertions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Assertion> {
        self.assertions.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Assertion] {
        &self.assertions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complex, Entity, ModSite, Modification, ModificationType};

    fn phospho(enz: Entity, sub: Entity) -> Assertion {
        Modification::new(enz, sub, ModificationType::Phosphorylation, None).into()
    }

    #[test]
    fn add_skips_structural_duplicates() {
        let mut store = AssertionStore::new();
        let first = phospho(Entity::new("BRAF"), Entity::new("MAP2K1"));
        let again = phospho(Entity::new("BRAF"), Entity::new("MAP2K1"));

        assert_eq!(store.add([first]), 1);
        assert_eq!(store.add([again]), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_dedups_under_reordered_sites() {
        let s = |a: &str, b: &str| {
            Entity::new("MAP2K1")
                .with_site(ModSite::at(ModificationType::PhosphorylationSerine, a))
                .with_site(ModSite::at(ModificationType::PhosphorylationSerine, b))
        };
        let mut store = AssertionStore::new();
        let added = store.add([
            phospho(Entity::new("BRAF"), s("218", "222")),
            phospho(Entity::new("BRAF"), s("222", "218")),
        ]);
        assert_eq!(added, 1);
    }

    #[test]
    fn exists_uses_structural_equality() {
        let mut store = AssertionStore::new();
        store.add([Assertion::from(Complex::new(vec![
            Entity::new("A"),
            Entity::new("B"),
        ]))]);

        let probe: Assertion = Complex::new(vec![Entity::new("A"), Entity::new("B")]).into();
        assert!(store.exists(&probe));
        let swapped: Assertion = Complex::new(vec![Entity::new("B"), Entity::new("A")]).into();
        assert!(!store.exists(&swapped));
    }

    #[test]
    fn iteration_keeps_insertion_order() {
        let mut store = AssertionStore::new();
        store.add([
            phospho(Entity::new("K2"), Entity::new("S")),
            phospho(Entity::new("K1"), Entity::new("S")),
        ]);
        let enzymes: Vec<_> = store
            .iter()
            .map(|a| a.entities()[0].name.clone())
            .collect();
        assert_eq!(enzymes, vec!["K2", "K1"]);
    }
}
