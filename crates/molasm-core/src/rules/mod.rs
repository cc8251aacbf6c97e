//! # Rule Model
//!
//! The rule-based reaction-network aggregate: monomers, parameters, rules,
//! initial conditions and cross-reference annotations.
//!
//! The aggregate enforces its own consistency:
//! - every pattern must reference declared monomers, sites and states
//! - rule names are unique; a second rule with the same name is skipped and
//!   recorded as a warning
//! - parameter requests either reuse or mint a suffixed fresh name

mod assembler;
mod export;
mod handlers;

pub use assembler::{AssemblyStage, RuleAssembler};
pub use export::export_bngl;
pub use handlers::builtin_table;

use crate::registry::EntityRegistryEntry;
use crate::types::{AssemblyError, AssemblyWarning, Entity, binding_site_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// DECLARATIONS
// =============================================================================

/// A monomer declaration: name plus full site/state vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monomer {
    pub name: String,
    /// Sites in declaration order.
    pub sites: Vec<String>,
    /// Allowed states of stated sites; the first state is the default.
    pub site_states: BTreeMap<String, Vec<String>>,
}

impl Monomer {
    #[must_use]
    pub fn has_site(&self, site: &str) -> bool {
        self.sites.iter().any(|s| s == site)
    }

    /// True if `state` is an allowed value of `site`.
    #[must_use]
    pub fn allows(&self, site: &str, state: &str) -> bool {
        self.site_states
            .get(site)
            .is_some_and(|states| states.iter().any(|s| s == state))
    }
}

impl From<&EntityRegistryEntry> for Monomer {
    fn from(entry: &EntityRegistryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            sites: entry.sites.clone(),
            site_states: entry.site_states.clone(),
        }
    }
}

/// A named numeric quantity (rate constant or initial amount).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
}

// =============================================================================
// PATTERNS
// =============================================================================

/// Condition on one site of a monomer pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteValue {
    /// The site is in this state.
    State(String),
    /// The site is free.
    Unbound,
    /// The site holds numbered bond `n` within the same complex pattern.
    Bond(u32),
    /// The site is bound to something, partner unspecified.
    AnyBond,
}

/// A monomer with conditions on some of its sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonomerPattern {
    pub monomer: String,
    pub sites: BTreeMap<String, SiteValue>,
}

impl MonomerPattern {
    /// A pattern with no site conditions.
    #[must_use]
    pub fn new(monomer: impl Into<String>) -> Self {
        Self {
            monomer: monomer.into(),
            sites: BTreeMap::new(),
        }
    }

    /// Builder: set (or replace) a site condition.
    #[must_use]
    pub fn with(mut self, site: impl Into<String>, value: SiteValue) -> Self {
        self.sites.insert(site.into(), value);
        self
    }
}

/// One or more monomer patterns joined into a single species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplexPattern(pub Vec<MonomerPattern>);

impl From<MonomerPattern> for ComplexPattern {
    fn from(pattern: MonomerPattern) -> Self {
        Self(vec![pattern])
    }
}

// =============================================================================
// RULES, INITIALS, ANNOTATIONS
// =============================================================================

/// A named reaction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub reactants: Vec<ComplexPattern>,
    pub products: Vec<ComplexPattern>,
    /// Name of the forward rate parameter.
    pub forward_rate: String,
    /// Name of the reverse rate parameter, for reversible rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_rate: Option<String>,
}

impl Rule {
    #[must_use]
    pub fn irreversible(
        name: impl Into<String>,
        reactants: Vec<ComplexPattern>,
        products: Vec<ComplexPattern>,
        forward_rate: String,
    ) -> Self {
        Self {
            name: name.into(),
            reactants,
            products,
            forward_rate,
            reverse_rate: None,
        }
    }

    #[must_use]
    pub fn reversible(
        name: impl Into<String>,
        reactants: Vec<ComplexPattern>,
        products: Vec<ComplexPattern>,
        forward_rate: String,
        reverse_rate: String,
    ) -> Self {
        Self {
            name: name.into(),
            reactants,
            products,
            forward_rate,
            reverse_rate: Some(reverse_rate),
        }
    }

    fn patterns(&self) -> impl Iterator<Item = &MonomerPattern> {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .flat_map(|cp| cp.0.iter())
    }
}

/// A seed species bound to the parameter holding its amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initial {
    pub pattern: ComplexPattern,
    pub parameter: String,
}

/// A cross-reference annotation on a monomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub subject: String,
    pub object: String,
    pub predicate: String,
}

/// Build an identifiers.org annotation for a recognized database.
///
/// Unrecognized databases yield `None`.
#[must_use]
pub fn annotation_for(subject: &str, db_name: &str, db_ref: &str) -> Option<Annotation> {
    const BASE: &str = "http://identifiers.org/";
    let object = match db_name {
        "UP" => format!("{BASE}uniprot/{db_ref}"),
        "HGNC" => format!("{BASE}hgnc/HGNC:{db_ref}"),
        "XFAM" if db_ref.starts_with("PF") => format!("{BASE}pfam/{db_ref}"),
        "IP" => format!("{BASE}interpro/{db_ref}"),
        "CHEBI" => format!("{BASE}chebi/CHEBI:{db_ref}"),
        _ => return None,
    };
    Some(Annotation {
        subject: subject.to_string(),
        object,
        predicate: "is".to_string(),
    })
}

// =============================================================================
// RULE MODEL
// =============================================================================

/// The assembled rule-based model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleModel {
    monomers: Vec<Monomer>,
    parameters: Vec<Parameter>,
    rules: Vec<Rule>,
    initials: Vec<Initial>,
    annotations: Vec<Annotation>,
    warnings: Vec<AssemblyWarning>,
}

impl RuleModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn monomers(&self) -> &[Monomer] {
        &self.monomers
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn initials(&self) -> &[Initial] {
        &self.initials
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Non-fatal conditions recorded during assembly.
    #[must_use]
    pub fn warnings(&self) -> &[AssemblyWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn monomer(&self, name: &str) -> Option<&Monomer> {
        self.monomers.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.rule(name).is_some()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Declare a monomer. A monomer with the same name is replaced.
    pub fn add_monomer(&mut self, monomer: Monomer) {
        match self.monomers.iter_mut().find(|m| m.name == monomer.name) {
            Some(existing) => *existing = monomer,
            None => self.monomers.push(monomer),
        }
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Return a parameter name for `name`, creating the parameter if needed.
    ///
    /// With `unique == false` an existing parameter is reused unchanged.
    /// With `unique == true` a fresh parameter is always created, named
    /// `<name>_<n>` with the smallest free `n >= 1`.
    pub fn get_create_parameter(&mut self, name: &str, value: f64, unique: bool) -> String {
        if !unique {
            if self.parameter(name).is_some() {
                tracing::debug!(parameter = name, "reusing existing parameter");
                return name.to_string();
            }
            self.parameters.push(Parameter {
                name: name.to_string(),
                value,
            });
            return name.to_string();
        }

        let mut n: u32 = 1;
        let fresh = loop {
            let candidate = format!("{}_{}", name, n);
            if self.parameter(&candidate).is_none() {
                break candidate;
            }
            n += 1;
        };
        self.parameters.push(Parameter {
            name: fresh.clone(),
            value,
        });
        fresh
    }

    /// Record that a rule name is already taken.
    ///
    /// Returns true if `name` is present (and a warning was recorded).
    pub fn skip_if_duplicate(&mut self, name: &str) -> bool {
        if !self.has_rule(name) {
            return false;
        }
        tracing::warn!(rule = name, "rule already in model, skipping");
        self.warnings
            .push(AssemblyWarning::DuplicateRule(name.to_string()));
        true
    }

    /// Add a rule after validating its patterns.
    ///
    /// Returns `Ok(false)` when a rule with the same name already exists:
    /// the new rule is skipped and a warning recorded.
    pub fn add_rule(&mut self, rule: Rule) -> Result<bool, AssemblyError> {
        if self.skip_if_duplicate(&rule.name) {
            return Ok(false);
        }
        for pattern in rule.patterns() {
            self.check_pattern(pattern)?;
        }
        if self.parameter(&rule.forward_rate).is_none() {
            return Err(AssemblyError::InvalidAssertion(format!(
                "rule {} references undeclared parameter {}",
                rule.name, rule.forward_rate
            )));
        }
        tracing::debug!(rule = %rule.name, "adding rule");
        self.rules.push(rule);
        Ok(true)
    }

    /// Validate a pattern against the declared monomers.
    pub fn check_pattern(&self, pattern: &MonomerPattern) -> Result<(), AssemblyError> {
        let monomer = self
            .monomer(&pattern.monomer)
            .ok_or_else(|| AssemblyError::UnknownMonomer(pattern.monomer.clone()))?;
        for (site, value) in &pattern.sites {
            if !monomer.has_site(site) {
                return Err(AssemblyError::UnknownSite {
                    monomer: monomer.name.clone(),
                    site: site.clone(),
                });
            }
            if let SiteValue::State(state) = value {
                if !monomer.allows(site, state) {
                    return Err(AssemblyError::InvalidAssertion(format!(
                        "state '{}' is not allowed on {}.{}",
                        state, monomer.name, site
                    )));
                }
            }
        }
        Ok(())
    }

    /// The pattern describing `entity` in its current variant.
    ///
    /// Modified sites are in their modified state; binding conditions become
    /// `AnyBond` or `Unbound` on the partner's binding site.
    pub fn pattern_for(&self, entity: &Entity) -> Result<MonomerPattern, AssemblyError> {
        let mut pattern = MonomerPattern::new(&entity.name);
        for bc in &entity.bound_conditions {
            let value = if bc.is_bound {
                SiteValue::AnyBond
            } else {
                SiteValue::Unbound
            };
            pattern.sites.insert(binding_site_name(&bc.partner.name), value);
        }
        for site in &entity.modifications {
            pattern.sites.insert(
                site.site_name(),
                SiteValue::State(site.kind.modified().to_string()),
            );
        }
        self.check_pattern(&pattern)?;
        Ok(pattern)
    }

    /// Give `monomer` a seed species in its default configuration.
    ///
    /// Every stated site takes its first state and every binding site is free.
    /// An existing `<monomer>_0` parameter only has its value updated.
    pub fn set_base_initial_condition(
        &mut self,
        monomer: &str,
        value: f64,
    ) -> Result<(), AssemblyError> {
        let declared = self
            .monomer(monomer)
            .ok_or_else(|| AssemblyError::UnknownMonomer(monomer.to_string()))?;

        let mut pattern = MonomerPattern::new(monomer);
        for site in &declared.sites {
            let condition = match declared.site_states.get(site).and_then(|s| s.first()) {
                Some(state) => SiteValue::State(state.clone()),
                None => SiteValue::Unbound,
            };
            pattern.sites.insert(site.clone(), condition);
        }

        let pname = format!("{}_0", monomer);
        if let Some(existing) = self.parameters.iter_mut().find(|p| p.name == pname) {
            existing.value = value;
            return Ok(());
        }
        self.parameters.push(Parameter {
            name: pname.clone(),
            value,
        });
        self.initials.push(Initial {
            pattern: pattern.into(),
            parameter: pname,
        });
        Ok(())
    }

    /// Seed every declared monomer with `value`.
    pub fn add_default_initial_conditions(&mut self, value: f64) -> Result<(), AssemblyError> {
        let names: Vec<String> = self.monomers.iter().map(|m| m.name.clone()).collect();
        for name in names {
            self.set_base_initial_condition(&name, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
