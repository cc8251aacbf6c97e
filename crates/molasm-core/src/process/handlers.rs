//! Built-in process-graph handlers.
//!
//! The graph is independent of kinetic detail, so every modification policy
//! draws the same process.

use super::{ArcClass, GlyphClass, GraphBuilder};
use crate::policy::PolicyTable;
use crate::primitives::{DEFAULT_POLICY, INTERACTIONS_ONLY_POLICY, TWO_STEP_POLICY};
use crate::product::product;
use crate::registry::{
    EntityRegistry, register_activity_modification, register_complex, register_modification,
};
use crate::types::{AssemblyError, Assertion, AssertionKind, Policy};

/// The handler table used by [`super::GraphAssembler::new`].
#[must_use]
pub fn builtin_table() -> PolicyTable<GraphBuilder> {
    let mut table = PolicyTable::new();
    for policy in [DEFAULT_POLICY, TWO_STEP_POLICY, INTERACTIONS_ONLY_POLICY] {
        table
            .on_registration(
                AssertionKind::Modification,
                Policy::new(policy),
                register_modification,
            )
            .on_emission(
                AssertionKind::Modification,
                Policy::new(policy),
                modification_process,
            );
    }
    for policy in [DEFAULT_POLICY, INTERACTIONS_ONLY_POLICY] {
        table
            .on_registration(AssertionKind::Complex, Policy::new(policy), register_complex)
            .on_emission(AssertionKind::Complex, Policy::new(policy), association_process);
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

/// substrate -consumption-> process -production-> product; enzyme -catalysis-> process
fn modification_process(
    assertion: &Assertion,
    builder: &mut GraphBuilder,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    let Assertion::Modification(m) = assertion else {
        return Err(AssemblyError::UnsupportedAssertionType(assertion.kind()));
    };
    let substrate = builder.node_for(&m.substrate)?;
    let enzyme = builder.node_for(&m.enzyme)?;
    let target = builder.node_for(&product(assertion)?)?;

    let process = builder.add_process(GlyphClass::Process);
    builder.add_arc(ArcClass::Consumption, substrate, process);
    builder.add_arc(ArcClass::Production, process, target);
    builder.add_arc(ArcClass::Catalysis, enzyme, process);
    Ok(())
}

/// every member -consumption-> association -production-> complex
fn association_process(
    assertion: &Assertion,
    builder: &mut GraphBuilder,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    let Assertion::Complex(c) = assertion else {
        return Err(AssemblyError::UnsupportedAssertionType(assertion.kind()));
    };
    let members = c
        .members
        .iter()
        .map(|member| builder.node_for(member))
        .collect::<Result<Vec<_>, _>>()?;
    let target = builder.node_for(&product(assertion)?)?;

    let process = builder.add_process(GlyphClass::Association);
    for member in members {
        builder.add_arc(ArcClass::Consumption, member, process);
    }
    builder.add_arc(ArcClass::Production, process, target);
    Ok(())
}

fn unsupported(
    assertion: &Assertion,
    _builder: &mut GraphBuilder,
    _registry: &EntityRegistry,
) -> Result<(), AssemblyError> {
    Err(AssemblyError::UnsupportedAssertionType(assertion.kind()))
}
