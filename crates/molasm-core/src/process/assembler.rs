//! # Graph Assembler
//!
//! Builds a [`ProcessGraph`] from stored assertions:
//!
//! 1. Registration phase over every assertion (failures are fatal).
//! 2. One glyph per distinct entity: every argument entity in assertion
//!    order, then every derivable product. Unsupported products are skipped
//!    with a warning.
//! 3. Emission phase: one process per assertion. Failures other than an
//!    unresolvable policy are recorded as warnings and the assertion
//!    contributes nothing further.

use super::{GraphBuilder, ProcessGraph, builtin_table};
use crate::policy::{PolicyConfig, PolicyTable};
use crate::product::product;
use crate::registry::EntityRegistry;
use crate::store::AssertionStore;
use crate::types::{AssemblyError, AssemblyWarning, Assertion};

/// Assembles stored assertions into a process-description graph.
#[derive(Debug)]
pub struct GraphAssembler {
    store: AssertionStore,
    config: PolicyConfig,
    table: PolicyTable<GraphBuilder>,
}

impl GraphAssembler {
    /// Create an assembler with the built-in handler table.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_table(config, builtin_table())
    }

    #[must_use]
    pub fn with_table(config: PolicyConfig, table: PolicyTable<GraphBuilder>) -> Self {
        Self {
            store: AssertionStore::new(),
            config,
            table,
        }
    }

    /// Add assertions, dropping structural duplicates.
    pub fn add_assertions<I>(&mut self, assertions: I) -> usize
    where
        I: IntoIterator<Item = Assertion>,
    {
        self.store.add(assertions)
    }

    #[must_use]
    pub fn assertions(&self) -> &AssertionStore {
        &self.store
    }

    /// Assemble a fresh graph from the stored assertions.
    pub fn make_model(&self) -> Result<ProcessGraph, AssemblyError> {
        let mut registry = EntityRegistry::new();
        for assertion in self.store.iter() {
            self.table.register(assertion, &mut registry, &self.config)?;
        }

        let mut builder = GraphBuilder::new();
        for assertion in self.store.iter() {
            for entity in assertion.entities() {
                builder.add_entity(entity);
            }
        }
        for assertion in self.store.iter() {
            match product(assertion) {
                Ok(entity) => {
                    builder.add_entity(&entity);
                }
                Err(e) => builder.warn(AssemblyWarning::SkippedProduct {
                    kind: assertion.kind(),
                    reason: e.to_string(),
                }),
            }
        }

        for assertion in self.store.iter() {
            match self
                .table
                .emit(assertion, &mut builder, &registry, &self.config)
            {
                Ok(()) => {}
                Err(e @ AssemblyError::UnknownPolicy { .. }) => return Err(e),
                Err(e) => builder.warn(AssemblyWarning::SkippedAssertion {
                    kind: assertion.kind(),
                    reason: e.to_string(),
                }),
            }
        }

        let graph = builder.finish();
        tracing::info!(
            glyphs = graph.glyphs().len(),
            arcs = graph.arcs().len(),
            warnings = graph.warnings().len(),
            "process graph assembled"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ArcClass, GlyphClass};
    use crate::types::{
        ActivityModification, AssertionKind, Complex, Entity, Modification, ModificationType,
        Policy,
    };

    fn phospho() -> Assertion {
        Modification::new(
            Entity::new("K"),
            Entity::new("S"),
            ModificationType::Phosphorylation,
            None,
        )
        .into()
    }

    #[test]
    fn unsupported_assertion_leaves_partial_graph() {
        let mut assembler = GraphAssembler::new(PolicyConfig::default());
        assembler.add_assertions([
            phospho(),
            Assertion::from(ActivityModification {
                monomer: Entity::new("K"),
                modifications: Vec::new(),
                activity: "kinase".to_string(),
                increases: true,
            }),
        ]);
        let graph = assembler.make_model().expect("graph");
        assert_eq!(graph.glyphs_of(GlyphClass::Process).count(), 1);
        assert_eq!(graph.warnings().len(), 2);
        assert!(matches!(
            &graph.warnings()[0],
            AssemblyWarning::SkippedProduct { kind: AssertionKind::ActivityModification, .. }
        ));
        assert!(matches!(
            &graph.warnings()[1],
            AssemblyWarning::SkippedAssertion { kind: AssertionKind::ActivityModification, .. }
        ));
    }

    #[test]
    fn explicit_unknown_policy_is_fatal() {
        let config =
            PolicyConfig::default().with_override(AssertionKind::Complex, Policy::new("exotic"));
        let mut assembler = GraphAssembler::new(config);
        assembler.add_assertions([Assertion::from(Complex::new(vec![
            Entity::new("A"),
            Entity::new("B"),
        ]))]);
        assert!(matches!(
            assembler.make_model(),
            Err(AssemblyError::UnknownPolicy { .. })
        ));
    }

    #[test]
    fn shared_entities_are_drawn_once() {
        let mut assembler = GraphAssembler::new(PolicyConfig::default());
        assembler.add_assertions([
            phospho(),
            Modification::new(
                Entity::new("K"),
                Entity::new("T"),
                ModificationType::Phosphorylation,
                None,
            )
            .into(),
        ]);
        let graph = assembler.make_model().expect("graph");
        // K, S, T, S-p, T-p
        assert_eq!(graph.glyphs_of(GlyphClass::Macromolecule).count(), 5);
        assert_eq!(graph.arcs_of(ArcClass::Catalysis).count(), 2);
        let sources: Vec<_> = graph
            .arcs_of(ArcClass::Catalysis)
            .map(|a| a.source)
            .collect();
        assert_eq!(sources[0], sources[1]);
    }

    #[test]
    fn make_model_is_repeatable() {
        let mut assembler = GraphAssembler::new(PolicyConfig::default());
        assembler.add_assertions([phospho()]);
        let first = assembler.make_model().expect("first");
        let second = assembler.make_model().expect("second");
        assert_eq!(first, second);
    }
}
