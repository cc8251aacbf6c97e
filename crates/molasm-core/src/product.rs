//! # Product Derivation
//!
//! Computes the entity an assertion produces once its effect is applied.
//!
//! The product is always a fresh value built from a copy of the input entity
//! plus a delta; input entities are never touched.

use crate::types::{AssemblyError, Assertion, BoundCondition, Entity};

/// The entity produced by `assertion`.
///
/// - `Modification`: the substrate with the assertion's site appended.
/// - `Complex`: the first member with every other member bound to it.
/// - Anything else: [`AssemblyError::UnsupportedAssertionType`].
pub fn product(assertion: &Assertion) -> Result<Entity, AssemblyError> {
    match assertion {
        Assertion::Modification(m) => Ok(m.substrate.clone().with_site(m.site())),
        Assertion::Complex(c) => {
            let (scaffold, rest) = c.members.split_first().ok_or_else(|| {
                AssemblyError::InvalidAssertion("complex has no members".to_string())
            })?;
            let mut product = scaffold.clone();
            product
                .bound_conditions
                .extend(rest.iter().map(|member| BoundCondition {
                    partner: member.clone(),
                    is_bound: true,
                }));
            Ok(product)
        }
        Assertion::ActivityModification(_) => {
            Err(AssemblyError::UnsupportedAssertionType(assertion.kind()))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
