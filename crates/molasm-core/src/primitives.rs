//! # Assembly Primitives
//!
//! Hardcoded constants for the molasm core.
//!
//! These values are compiled in and immutable at runtime. Callers that need
//! different numbers register their own policy handlers.

// =============================================================================
// POLICY NAMES
// =============================================================================

/// Policy used when nothing else is configured.
pub const DEFAULT_POLICY: &str = "default";

/// Modification as reversible enzyme-substrate binding followed by catalysis.
pub const TWO_STEP_POLICY: &str = "two_step";

/// Binding only; no state change is modelled.
pub const INTERACTIONS_ONLY_POLICY: &str = "interactions_only";

// =============================================================================
// RATE CONSTANTS
// =============================================================================

/// Forward rate of a one-step modification rule.
pub const KF_MODIFICATION: f64 = 1.0e-6;

/// Forward rate of a binding rule.
pub const KF_BIND: f64 = 1.0e-6;

/// Reverse (dissociation) rate of a binding rule.
pub const KR_BIND: f64 = 1.0e-1;

/// Catalytic rate of the second step of a two-step modification.
pub const KC_CATALYSIS: f64 = 100.0;

/// Quantity given to every monomer by the default initial conditions.
pub const DEFAULT_INITIAL_AMOUNT: f64 = 100.0;

// =============================================================================
// GRAPH DOCUMENT
// =============================================================================

/// XML namespace of the process-description document.
pub const SBGN_NAMESPACE: &str = "http://sbgn.org/libsbgn/pd/0.1";

/// Prefix of every glyph and arc identifier.
pub const ID_PREFIX: &str = "id_";

/// Bounding box (x, y, w, h) of an entity glyph.
pub const ENTITY_BBOX: (u32, u32, u32, u32) = (0, 0, 120, 60);

/// Bounding box (x, y, w, h) of a state-variable glyph.
pub const STATE_BBOX: (u32, u32, u32, u32) = (1, 1, 70, 30);

/// Bounding box (x, y, w, h) of a process or association glyph.
pub const PROCESS_BBOX: (u32, u32, u32, u32) = (0, 0, 20, 20);

// =============================================================================
// SESSION BRIDGE
// =============================================================================

/// Pause between file events pushed to a collaborative session.
///
/// The remote session processes file events asynchronously.
pub const LOAD_STEP_DELAY_MS: u64 = 2000;

/// Prefix that marks a chat message as an assembly command.
pub const DEFAULT_COMMAND_PREFIX: &str = "model:";

/// Maximum number of assertions accepted from one extraction.
pub const MAX_ASSERTIONS: usize = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_are_distinct() {
        assert_ne!(DEFAULT_POLICY, TWO_STEP_POLICY);
        assert_ne!(TWO_STEP_POLICY, INTERACTIONS_ONLY_POLICY);
    }

    #[test]
    fn state_box_fits_inside_entity_box() {
        assert!(STATE_BBOX.2 < ENTITY_BBOX.2);
        assert!(STATE_BBOX.3 < ENTITY_BBOX.3);
    }
}
