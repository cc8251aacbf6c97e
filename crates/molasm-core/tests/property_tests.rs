//! # Property-Based Tests
//!
//! Determinism and identity invariants of the assembly engine, checked with
//! proptest.

use molasm_core::{
    Assertion, AssertionStore, Complex, Entity, EntityRegistry, GraphAssembler, GraphBuilder,
    ModSite, Modification, ModificationType, PolicyConfig, RuleAssembler, product,
};
use molasm_core::process::complex_components;
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// STRATEGIES
// =============================================================================

const NAMES: [&str; 6] = ["BRAF", "MAP2K1", "MAPK1", "RAF1", "KRAS", "EGFR"];

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(str::to_string)
}

fn mod_site() -> impl Strategy<Value = ModSite> {
    (
        prop::sample::select(ModificationType::ALL.to_vec()),
        prop::option::of(1u32..800),
    )
        .prop_map(|(kind, position)| ModSite {
            kind,
            position: position.map(|p| p.to_string()),
        })
}

fn plain_entity() -> impl Strategy<Value = Entity> {
    (name(), vec(mod_site(), 0..4)).prop_map(|(name, sites)| {
        sites
            .into_iter()
            .fold(Entity::new(name), |e, site| e.with_site(site))
    })
}

/// An entity bound to up to two partners, each with up to one partner of its own.
fn entity() -> impl Strategy<Value = Entity> {
    let partner = (plain_entity(), vec(plain_entity(), 0..2))
        .prop_map(|(base, inner)| inner.into_iter().fold(base, Entity::bound_to));
    (plain_entity(), vec(partner, 0..3))
        .prop_map(|(base, partners)| partners.into_iter().fold(base, Entity::bound_to))
}

fn modification() -> impl Strategy<Value = Assertion> {
    (entity(), entity(), mod_site()).prop_map(|(enz, sub, site)| {
        Modification::new(enz, sub, site.kind, site.position.as_deref()).into()
    })
}

fn complex() -> impl Strategy<Value = Assertion> {
    vec(entity(), 2..4).prop_map(|members| Complex::new(members).into())
}

fn assertion() -> impl Strategy<Value = Assertion> {
    prop_oneof![modification(), complex()]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Reordering sites and partners never changes an entity's key.
    #[test]
    fn key_is_order_independent(
        base in name(),
        sites in vec(mod_site(), 0..6),
        partners in vec(entity(), 0..4)
    ) {
        let build = |sites: &[ModSite], partners: &[Entity]| {
            let with_sites = sites
                .iter()
                .cloned()
                .fold(Entity::new(base.clone()), |e, s| e.with_site(s));
            partners
                .iter()
                .cloned()
                .fold(with_sites, |e, p| e.bound_to(p))
        };
        let forward = build(&sites, &partners);

        let mut rev_sites = sites.clone();
        rev_sites.reverse();
        let mut rev_partners = partners.clone();
        rev_partners.reverse();
        let reversed = build(&rev_sites, &rev_partners);

        prop_assert_eq!(forward.key(), reversed.key());
    }

    /// Adding the same batch twice stores it once.
    #[test]
    fn store_add_is_idempotent(batch in vec(assertion(), 1..20)) {
        let mut once = AssertionStore::new();
        once.add(batch.clone());

        let mut twice = AssertionStore::new();
        twice.add(batch.clone());
        let added_again = twice.add(batch);

        prop_assert_eq!(added_again, 0);
        prop_assert_eq!(once.as_slice(), twice.as_slice());
    }

    /// The product gains exactly the asserted site; the input is untouched.
    #[test]
    fn product_does_not_alias_substrate(
        enz in plain_entity(),
        sub in plain_entity(),
        site in mod_site()
    ) {
        let before = sub.clone();
        let assertion: Assertion =
            Modification::new(enz, sub, site.kind, site.position.as_deref()).into();
        let p = product(&assertion).expect("product");

        prop_assert_eq!(p.modifications.len(), before.modifications.len() + 1);
        prop_assert_eq!(p.modifications.last(), Some(&site));
        if let Assertion::Modification(m) = &assertion {
            prop_assert_eq!(&m.substrate, &before);
        }
    }

    /// Registering entities never loses a site seen earlier.
    #[test]
    fn registry_only_grows(entities in vec(plain_entity(), 1..20)) {
        let mut registry = EntityRegistry::new();
        let mut seen: Vec<(String, String)> = Vec::new();
        for entity in &entities {
            registry.register(entity).expect("register");
            seen.extend(entity.modifications.iter().map(|s| (entity.name.clone(), s.site_name())));
            for (name, site) in &seen {
                prop_assert!(registry.get(name).expect("entry").has_site(site));
            }
        }
    }

    /// Every glyph and arc id in a graph is distinct.
    #[test]
    fn graph_ids_are_unique(batch in vec(assertion(), 1..15)) {
        let mut assembler = GraphAssembler::new(PolicyConfig::default());
        assembler.add_assertions(batch);
        let graph = assembler.make_model().expect("graph");

        let ids = graph.all_ids();
        let distinct: BTreeSet<_> = ids.iter().collect();
        prop_assert_eq!(ids.len(), distinct.len());
    }

    /// A composite glyph holds one macromolecule per member of its binding tree.
    #[test]
    fn composite_glyph_covers_binding_tree(e in entity()) {
        let mut builder = GraphBuilder::new();
        builder.add_entity(&e);
        let graph = builder.finish();
        let glyph = &graph.glyphs()[0];

        if e.has_bound_partners() {
            let labels: Vec<_> = glyph.children.iter().filter_map(|c| c.label.clone()).collect();
            let names: Vec<_> = complex_components(&e).into_iter().map(|c| c.name).collect();
            prop_assert_eq!(labels, names);
        } else {
            prop_assert_eq!(glyph.label.as_deref(), Some(e.name.as_str()));
        }
    }

    /// Rule assembly is deterministic and rule names are unique.
    #[test]
    fn rule_model_is_deterministic(batch in vec(assertion(), 1..15)) {
        let mut a = RuleAssembler::new(PolicyConfig::default());
        a.add_assertions(batch.clone());
        let mut b = RuleAssembler::new(PolicyConfig::default());
        b.add_assertions(batch);

        let first = a.make_model(true).expect("model").clone();
        let second = b.make_model(true).expect("model").clone();
        prop_assert_eq!(&first, &second);

        let names: BTreeSet<_> = first.rules().iter().map(|r| r.name.as_str()).collect();
        prop_assert_eq!(names.len(), first.rules().len());
    }
}
