//! Built-in rule-model emission handlers.

use super::{ComplexPattern, MonomerPattern, Rule, RuleModel, SiteValue};
use crate::policy::PolicyTable;
use crate::primitives::{
    DEFAULT_POLICY, INTERACTIONS_ONLY_POLICY, KC_CATALYSIS, KF_BIND, KF_MODIFICATION, KR_BIND,
    TWO_STEP_POLICY,
};
use crate::registry::{
    EntityRegistry, register_activity_modification, register_complex,
    register_enzyme_substrate_binding, register_modification, register_modification_binding,
};
use crate::types::{
    AssemblyError, Assertion, AssertionKind, Complex, Entity, Modification, Policy,
    binding_site_name,
};

/// The handler table used by [`super::RuleAssembler::new`].
#[must_use]
pub fn builtin_table() -> PolicyTable<RuleModel> {
    let mut table = PolicyTable::new();
    table
        .on_registration(
            AssertionKind::Modification,
            Policy::new(DEFAULT_POLICY),
            register_modification,
        )
        .on_emission(
            AssertionKind::Modification,
            Policy::new(DEFAULT_POLICY),
            modification_one_step,
        )
        .on_registration(
            AssertionKind::Modification,
            Policy::new(TWO_STEP_POLICY),
            register_modification_binding,
        )
        .on_emission(
            AssertionKind::Modification,
            Policy::new(TWO_STEP_POLICY),
            modification_two_step,
        )
        .on_registration(
            AssertionKind::Modification,
            Policy::new(INTERACTIONS_ONLY_POLICY),
            register_enzyme_substrate_binding,
        )
        .on_emission(
            AssertionKind::Modification,
            Policy::new(INTERACTIONS_ONLY_POLICY),
            modification_interactions_only,
        );

    for policy in [DEFAULT_POLICY, INTERACTIONS_ONLY_POLICY] {
        table
            .on_registration(AssertionKind::Complex, Policy::new(policy), register_complex)
            .on_emission(AssertionKind::Complex, Policy::new(policy), complex_binding);
    }

    table
        .on_registration(
            AssertionKind::ActivityModification,
            Policy::new(DEFAULT_POLICY),
            register_activity_modification,
        )
        .on_emission(
            AssertionKind::ActivityModification,
            Policy::new(DEFAULT_POLICY),
            unsupported,
        );
    table
}

// =============================================================================
// HELPERS
// =============================================================================

fn as_modification(assertion: &Assertion) -> Result<&Modification, AssemblyError> {
    match assertion {
        Assertion::Modification(m) => Ok(m),
        _ => Err(AssemblyError::UnsupportedAssertionType(assertion.kind())),
    }
}

fn as_complex(assertion: &Assertion) -> Result<&Complex, AssemblyError> {
    match assertion {
        Assertion::Complex(c) => Ok(c),
        _ => Err(AssemblyError::UnsupportedAssertionType(assertion.kind())),
    }
}

/// Lowercased first character of each name, concatenated.
fn initials<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> String {
    entities
        .into_iter()
        .filter_map(|e| e.name.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}

fn modification_rule_name(m: &Modification) -> String {
    format!(
        "{}_{}_{}_{}",
        m.enzyme.rule_str(),
        m.kind.abbrev(),
        m.substrate.rule_str(),
        m.site_name()
    )
}

/// Enzyme and substrate patterns carrying the reciprocal binding sites.
fn enzyme_substrate_patterns(
    m: &Modification,
    model: &RuleModel,
) -> Result<(MonomerPattern, MonomerPattern, String, String), AssemblyError> {
    let enz = model.pattern_for(&m.enzyme)?;
    let sub = model.pattern_for(&m.substrate)?;
    Ok((
        enz,
        sub,
        binding_site_name(&m.substrate.name),
        binding_site_name(&m.enzyme.name),
    ))
}

// =============================================================================
// MODIFICATION
// =============================================================================

/// `E + S(site~u) -> E + S(site~p)`
fn modification_one_step(
    assertion: &Assertion,
    model: &mut RuleModel,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    let m = as_modification(assertion)?;
    let name = modification_rule_name(m);
    if model.skip_if_duplicate(&name) {
        return Ok(());
    }

    let site = m.site_name();
    let enz = model.pattern_for(&m.enzyme)?;
    let sub = model.pattern_for(&m.substrate)?;
    let sub_before = sub
        .clone()
        .with(&site, SiteValue::State(m.kind.unmodified().to_string()));
    let sub_after = sub.with(&site, SiteValue::State(m.kind.modified().to_string()));

    let kf = model.get_create_parameter(
        &format!("kf_{}_{}", initials([&m.enzyme, &m.substrate]), m.kind.abbrev()),
        KF_MODIFICATION,
        true,
    );
    model.add_rule(Rule::irreversible(
        name,
        vec![enz.clone().into(), sub_before.into()],
        vec![enz.into(), sub_after.into()],
        kf,
    ))?;
    Ok(())
}

/// `E(s) + S(e, site~u) <-> E(s!1).S(e!1, site~u)` then
/// `E(s!1).S(e!1, site~u) -> E(s) + S(e, site~p)`
fn modification_two_step(
    assertion: &Assertion,
    model: &mut RuleModel,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    let m = as_modification(assertion)?;
    let name = modification_rule_name(m);
    let bind_name = format!("{}_bind", name);
    if model.skip_if_duplicate(&bind_name) || model.skip_if_duplicate(&name) {
        return Ok(());
    }

    let site = m.site_name();
    let unmodified = SiteValue::State(m.kind.unmodified().to_string());
    let modified = SiteValue::State(m.kind.modified().to_string());
    let (enz, sub, enz_site, sub_site) = enzyme_substrate_patterns(m, model)?;

    let enz_free = enz.clone().with(&enz_site, SiteValue::Unbound);
    let sub_free = sub
        .clone()
        .with(&sub_site, SiteValue::Unbound)
        .with(&site, unmodified.clone());
    let bound = ComplexPattern(vec![
        enz.with(&enz_site, SiteValue::Bond(1)),
        sub.clone()
            .with(&sub_site, SiteValue::Bond(1))
            .with(&site, unmodified),
    ]);
    let released = sub.with(&sub_site, SiteValue::Unbound).with(&site, modified);

    let prefix = initials([&m.enzyme, &m.substrate]);
    let kf = model.get_create_parameter(&format!("kf_{}_bind", prefix), KF_BIND, true);
    let kr = model.get_create_parameter(&format!("kr_{}_bind", prefix), KR_BIND, true);
    let kc = model.get_create_parameter(
        &format!("kc_{}_{}", prefix, m.kind.abbrev()),
        KC_CATALYSIS,
        true,
    );

    model.add_rule(Rule::reversible(
        bind_name,
        vec![enz_free.clone().into(), sub_free.into()],
        vec![bound.clone()],
        kf,
        kr,
    ))?;
    model.add_rule(Rule::irreversible(
        name,
        vec![bound],
        vec![enz_free.into(), released.into()],
        kc,
    ))?;
    Ok(())
}

/// `E(s) + S(e) <-> E(s!1).S(e!1)`, substrate state unconstrained.
fn modification_interactions_only(
    assertion: &Assertion,
    model: &mut RuleModel,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    let m = as_modification(assertion)?;
    let name = format!("{}_bind", modification_rule_name(m));
    if model.skip_if_duplicate(&name) {
        return Ok(());
    }

    let enz = MonomerPattern::new(&m.enzyme.name);
    let sub = MonomerPattern::new(&m.substrate.name);
    let enz_site = binding_site_name(&m.substrate.name);
    let sub_site = binding_site_name(&m.enzyme.name);

    let prefix = initials([&m.enzyme, &m.substrate]);
    let kf = model.get_create_parameter(&format!("kf_{}_bind", prefix), KF_BIND, true);
    let kr = model.get_create_parameter(&format!("kr_{}_bind", prefix), KR_BIND, true);

    model.add_rule(Rule::reversible(
        name,
        vec![
            enz.clone().with(&enz_site, SiteValue::Unbound).into(),
            sub.clone().with(&sub_site, SiteValue::Unbound).into(),
        ],
        vec![ComplexPattern(vec![
            enz.with(&enz_site, SiteValue::Bond(1)),
            sub.with(&sub_site, SiteValue::Bond(1)),
        ])],
        kf,
        kr,
    ))?;
    Ok(())
}

// =============================================================================
// COMPLEX
// =============================================================================

/// All members free on each other's sites, reversibly joined pairwise.
fn complex_binding(
    assertion: &Assertion,
    model: &mut RuleModel,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    let c = as_complex(assertion)?;
    if c.members.len() < 2 {
        return Err(AssemblyError::InvalidAssertion(format!(
            "complex needs at least two members, got {}",
            c.members.len()
        )));
    }

    let name = format!(
        "{}_bind",
        c.members
            .iter()
            .map(Entity::rule_str)
            .collect::<Vec<_>>()
            .join("_")
    );
    if model.skip_if_duplicate(&name) {
        return Ok(());
    }

    let mut free = Vec::with_capacity(c.members.len());
    for (i, member) in c.members.iter().enumerate() {
        let mut pattern = model.pattern_for(member)?;
        for (j, other) in c.members.iter().enumerate() {
            if i != j {
                pattern = pattern.with(binding_site_name(&other.name), SiteValue::Unbound);
            }
        }
        free.push(pattern);
    }

    let mut joined = free.clone();
    let mut bond: u32 = 0;
    for i in 0..c.members.len() {
        for j in (i + 1)..c.members.len() {
            bond += 1;
            let site_on_i = binding_site_name(&c.members[j].name);
            let site_on_j = binding_site_name(&c.members[i].name);
            joined[i].sites.insert(site_on_i, SiteValue::Bond(bond));
            joined[j].sites.insert(site_on_j, SiteValue::Bond(bond));
        }
    }

    let prefix = initials(c.members.iter());
    let kf = model.get_create_parameter(&format!("kf_{}_bind", prefix), KF_BIND, true);
    let kr = model.get_create_parameter(&format!("kr_{}_bind", prefix), KR_BIND, true);

    model.add_rule(Rule::reversible(
        name,
        free.into_iter().map(ComplexPattern::from).collect(),
        vec![ComplexPattern(joined)],
        kf,
        kr,
    ))?;
    Ok(())
}

// =============================================================================
// UNSUPPORTED
// =============================================================================

fn unsupported(
    assertion: &Assertion,
    _model: &mut RuleModel,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    Err(AssemblyError::UnsupportedAssertionType(assertion.kind()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyConfig;
    use crate::rules::Monomer;
    use crate::types::ModificationType;

    fn prepared(assertion: &Assertion, config: &PolicyConfig) -> (RuleModel, EntityRegistry) {
        let table = builtin_table();
        let mut registry = EntityRegistry::new();
        table
            .register(assertion, &mut registry, config)
            .expect("register");
        let mut model = RuleModel::new();
        for entry in registry.declared_entities() {
            model.add_monomer(Monomer::from(entry));
        }
        (model, registry)
    }

    fn phospho() -> Assertion {
        Modification::new(
            Entity::new("BRAF"),
            Entity::new("MAP2K1"),
            ModificationType::PhosphorylationSerine,
            Some("218"),
        )
        .into()
    }

    #[test]
    fn initials_lowercase_first_chars() {
        let a = Entity::new("BRAF");
        let b = Entity::new("MAP2K1");
        assert_eq!(initials([&a, &b]), "bm");
    }

    #[test]
    fn one_step_emits_single_rule() {
        let config = PolicyConfig::default();
        let assertion = phospho();
        let (mut model, registry) = prepared(&assertion, &config);
        builtin_table()
            .emit(&assertion, &mut model, &registry, &config)
            .expect("emit");

        assert_eq!(model.rules().len(), 1);
        let rule = &model.rules()[0];
        assert_eq!(rule.name, "BRAF_S_MAP2K1_S218");
        assert_eq!(rule.forward_rate, "kf_bm_S_1");
        assert!(rule.reverse_rate.is_none());
        let after = &rule.products[1].0[0];
        assert_eq!(after.sites.get("S218"), Some(&SiteValue::State("p".to_string())));
    }

    #[test]
    fn two_step_emits_binding_and_catalysis() {
        let config = PolicyConfig::uniform(Policy::new(TWO_STEP_POLICY));
        let assertion = phospho();
        let (mut model, registry) = prepared(&assertion, &config);
        builtin_table()
            .emit(&assertion, &mut model, &registry, &config)
            .expect("emit");

        let names: Vec<_> = model.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["BRAF_S_MAP2K1_S218_bind", "BRAF_S_MAP2K1_S218"]
        );
        assert_eq!(model.rules()[0].reverse_rate.as_deref(), Some("kr_bm_bind_1"));
        assert_eq!(model.rules()[1].forward_rate, "kc_bm_S_1");
    }

    #[test]
    fn interactions_only_has_no_state_change() {
        let config = PolicyConfig::uniform(Policy::new(INTERACTIONS_ONLY_POLICY));
        let assertion = phospho();
        let (mut model, registry) = prepared(&assertion, &config);
        builtin_table()
            .emit(&assertion, &mut model, &registry, &config)
            .expect("emit");

        assert_eq!(model.rules().len(), 1);
        assert!(
            model.rules()[0]
                .products
                .iter()
                .flat_map(|cp| cp.0.iter())
                .all(|p| !p.sites.contains_key("S218"))
        );
    }

    #[test]
    fn complex_binds_all_pairs() {
        let config = PolicyConfig::default();
        let assertion: Assertion =
            Complex::new(vec![Entity::new("A"), Entity::new("B"), Entity::new("C")]).into();
        let (mut model, registry) = prepared(&assertion, &config);
        builtin_table()
            .emit(&assertion, &mut model, &registry, &config)
            .expect("emit");

        let rule = &model.rules()[0];
        assert_eq!(rule.name, "A_B_C_bind");
        assert_eq!(rule.reactants.len(), 3);
        assert_eq!(rule.products.len(), 1);
        let a = &rule.products[0].0[0];
        assert_eq!(a.sites.get("b"), Some(&SiteValue::Bond(1)));
        assert_eq!(a.sites.get("c"), Some(&SiteValue::Bond(2)));
        let c = &rule.products[0].0[2];
        assert_eq!(c.sites.get("b"), Some(&SiteValue::Bond(3)));
    }

    #[test]
    fn second_identical_emission_is_warned_not_added() {
        let config = PolicyConfig::default();
        let assertion = phospho();
        let (mut model, registry) = prepared(&assertion, &config);
        let table = builtin_table();
        table
            .emit(&assertion, &mut model, &registry, &config)
            .expect("first");
        table
            .emit(&assertion, &mut model, &registry, &config)
            .expect("second");
        assert_eq!(model.rules().len(), 1);
        assert_eq!(model.parameters().len(), 1);
        assert_eq!(model.warnings().len(), 1);
    }

    #[test]
    fn activity_modification_emission_is_rejected() {
        let config = PolicyConfig::default();
        let assertion: Assertion = crate::types::ActivityModification {
            monomer: Entity::new("MAPK1"),
            modifications: Vec::new(),
            activity: "kinase".to_string(),
            increases: true,
        }
        .into();
        let (mut model, registry) = prepared(&assertion, &config);
        let result = builtin_table().emit(&assertion, &mut model, &registry, &config);
        assert!(matches!(
            result,
            Err(AssemblyError::UnsupportedAssertionType(
                AssertionKind::ActivityModification
            ))
        ));
    }
}
