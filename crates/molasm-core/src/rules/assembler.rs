//! # Rule Assembler
//!
//! Drives a [`RuleModel`] through its stages:
//!
//! | Stage | Reached by | Contents |
//! |-------|------------|----------|
//! | Empty | construction, new assertions | nothing assembled |
//! | Registered | [`RuleAssembler::register`] | monomers + annotations |
//! | Assembled | [`RuleAssembler::assemble`] | rules + rate parameters |
//!
//! Every assembly starts from a fresh registry and model, so re-running is
//! idempotent.

use super::{Monomer, RuleModel, annotation_for, builtin_table};
use crate::policy::{PolicyConfig, PolicyTable};
use crate::primitives::DEFAULT_INITIAL_AMOUNT;
use crate::registry::EntityRegistry;
use crate::store::AssertionStore;
use crate::types::{AssemblyError, Assertion};
use serde::{Deserialize, Serialize};

/// Where a [`RuleAssembler`] is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssemblyStage {
    Empty,
    Registered,
    Assembled,
}

/// Assembles stored assertions into a rule-based model.
#[derive(Debug)]
pub struct RuleAssembler {
    store: AssertionStore,
    config: PolicyConfig,
    table: PolicyTable<RuleModel>,
    registry: EntityRegistry,
    model: RuleModel,
    stage: AssemblyStage,
}

impl RuleAssembler {
    /// Create an assembler with the built-in handler table.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_table(config, builtin_table())
    }

    /// Create an assembler with a caller-built handler table.
    #[must_use]
    pub fn with_table(config: PolicyConfig, table: PolicyTable<RuleModel>) -> Self {
        Self {
            store: AssertionStore::new(),
            config,
            table,
            registry: EntityRegistry::new(),
            model: RuleModel::new(),
            stage: AssemblyStage::Empty,
        }
    }

    /// Add assertions, dropping structural duplicates.
    ///
    /// Any new assertion resets the assembler to [`AssemblyStage::Empty`].
    pub fn add_assertions<I>(&mut self, assertions: I) -> usize
    where
        I: IntoIterator<Item = Assertion>,
    {
        let added = self.store.add(assertions);
        if added > 0 {
            self.stage = AssemblyStage::Empty;
        }
        added
    }

    #[must_use]
    pub fn assertions(&self) -> &AssertionStore {
        &self.store
    }

    #[must_use]
    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The model as of the current stage.
    #[must_use]
    pub fn model(&self) -> &RuleModel {
        &self.model
    }

    #[must_use]
    pub fn into_model(self) -> RuleModel {
        self.model
    }

    /// Registration phase: build the registry, then declare one monomer per
    /// registry entry and annotate recognized cross-references.
    ///
    /// Registration failures are fatal and leave the assembler `Empty`.
    pub fn register(&mut self) -> Result<(), AssemblyError> {
        self.stage = AssemblyStage::Empty;
        let mut registry = EntityRegistry::new();
        for assertion in self.store.iter() {
            self.table.register(assertion, &mut registry, &self.config)?;
        }

        let mut model = RuleModel::new();
        for entry in registry.declared_entities() {
            model.add_monomer(Monomer::from(entry));
            for (db_name, db_ref) in &entry.db_refs {
                match annotation_for(&entry.name, db_name, db_ref) {
                    Some(annotation) => model.add_annotation(annotation),
                    None => tracing::debug!(
                        entity = %entry.name,
                        db = %db_name,
                        "no annotation for unrecognized database"
                    ),
                }
            }
        }

        tracing::debug!(monomers = model.monomers().len(), "registration complete");
        self.registry = registry;
        self.model = model;
        self.stage = AssemblyStage::Registered;
        Ok(())
    }

    /// Emission phase: append rules for every stored assertion.
    ///
    /// Runs registration first unless the assembler is freshly `Registered`.
    /// Emission failures are fatal; the assembler drops back to `Empty`.
    pub fn assemble(&mut self) -> Result<(), AssemblyError> {
        if self.stage != AssemblyStage::Registered {
            self.register()?;
        }
        for assertion in self.store.iter() {
            if let Err(e) = self
                .table
                .emit(assertion, &mut self.model, &self.registry, &self.config)
            {
                self.stage = AssemblyStage::Empty;
                return Err(e);
            }
        }
        tracing::info!(
            monomers = self.model.monomers().len(),
            rules = self.model.rules().len(),
            warnings = self.model.warnings().len(),
            "rule model assembled"
        );
        self.stage = AssemblyStage::Assembled;
        Ok(())
    }

    /// Seed every monomer with `amount`. Requires an assembled model.
    pub fn add_default_initial_conditions(&mut self, amount: f64) -> Result<(), AssemblyError> {
        if self.stage != AssemblyStage::Assembled {
            self.assemble()?;
        }
        self.model.add_default_initial_conditions(amount)
    }

    /// Assemble from scratch and return the model.
    ///
    /// With `initial_conditions`, every monomer is seeded with
    /// [`DEFAULT_INITIAL_AMOUNT`].
    pub fn make_model(&mut self, initial_conditions: bool) -> Result<&RuleModel, AssemblyError> {
        self.register()?;
        self.assemble()?;
        if initial_conditions {
            self.model
                .add_default_initial_conditions(DEFAULT_INITIAL_AMOUNT)?;
        }
        Ok(&self.model)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ActivityModification, AssertionKind, Complex, Entity, ModSite, Modification,
        ModificationType, Policy,
    };

    fn phospho(position: &str) -> Assertion {
        Modification::new(
            Entity::new("BRAF").with_db_ref("HGNC", "1097"),
            Entity::new("MAP2K1").with_db_ref("TEXT", "MEK1"),
            ModificationType::PhosphorylationSerine,
            Some(position),
        )
        .into()
    }

    #[test]
    fn stages_advance_in_order() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assert_eq!(assembler.stage(), AssemblyStage::Empty);
        assembler.add_assertions([phospho("218")]);
        assembler.register().expect("register");
        assert_eq!(assembler.stage(), AssemblyStage::Registered);
        assert!(assembler.model().rules().is_empty());
        assembler.assemble().expect("assemble");
        assert_eq!(assembler.stage(), AssemblyStage::Assembled);
        assert_eq!(assembler.model().rules().len(), 1);
    }

    #[test]
    fn new_assertions_reset_stage() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([phospho("218")]);
        assembler.assemble().expect("assemble");
        assert_eq!(assembler.add_assertions([phospho("218")]), 0);
        assert_eq!(assembler.stage(), AssemblyStage::Assembled);
        assert_eq!(assembler.add_assertions([phospho("222")]), 1);
        assert_eq!(assembler.stage(), AssemblyStage::Empty);
    }

    #[test]
    fn monomer_vocabulary_is_union() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([phospho("218"), phospho("222")]);
        let model = assembler.make_model(false).expect("model");
        let map2k1 = model.monomer("MAP2K1").expect("monomer");
        assert_eq!(map2k1.sites, vec!["S218".to_string(), "S222".to_string()]);
        assert_eq!(model.monomers().len(), 2);
    }

    #[test]
    fn only_recognized_databases_are_annotated() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([phospho("218")]);
        let model = assembler.make_model(false).expect("model");
        assert_eq!(model.annotations().len(), 1);
        assert_eq!(model.annotations()[0].subject, "BRAF");
    }

    #[test]
    fn make_model_is_repeatable() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([
            phospho("218"),
            Complex::new(vec![Entity::new("BRAF"), Entity::new("RAF1")]).into(),
        ]);
        let first = assembler.make_model(true).expect("first").clone();
        let second = assembler.make_model(true).expect("second").clone();
        assert_eq!(first, second);
        assert_eq!(first.initials().len(), 3);
    }

    #[test]
    fn initials_use_default_states() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([phospho("218")]);
        assembler.add_default_initial_conditions(50.0).expect("initials");
        assert_eq!(assembler.stage(), AssemblyStage::Assembled);
        assert_eq!(
            assembler.model().parameter("MAP2K1_0").map(|p| p.value),
            Some(50.0)
        );
    }

    #[test]
    fn unknown_explicit_policy_is_fatal() {
        let config = PolicyConfig::default()
            .with_override(AssertionKind::Modification, Policy::new("three_step"));
        let mut assembler = RuleAssembler::new(config);
        assembler.add_assertions([phospho("218")]);
        let result = assembler.make_model(false);
        assert!(matches!(result, Err(AssemblyError::UnknownPolicy { .. })));
        assert_eq!(assembler.stage(), AssemblyStage::Empty);
    }

    #[test]
    fn activity_modification_emission_is_fatal() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([Assertion::from(ActivityModification {
            monomer: Entity::new("MAPK1"),
            modifications: vec![ModSite::at(ModificationType::PhosphorylationThreonine, "185")],
            activity: "kinase".to_string(),
            increases: true,
        })]);
        assert!(matches!(
            assembler.assemble(),
            Err(AssemblyError::UnsupportedAssertionType(_))
        ));
        assert!(assembler.registry().get("MAPK1").is_some());
    }
}
