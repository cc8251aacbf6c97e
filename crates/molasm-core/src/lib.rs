//! # molasm-core
//!
//! The deterministic assembly engine for molasm - THE LOGIC.
//!
//! Turns typed molecular assertions (modifications, complex formation) into
//! two target representations:
//! - a rule-based reaction model ([`RuleModel`], exported as BNGL text)
//! - a process-description graph ([`ProcessGraph`], exported as SBGN-ML)
//!
//! ## Pipeline
//!
//! ```text
//! assertions -> AssertionStore (dedup by canonical key)
//!            -> registration phase -> EntityRegistry (site/state union)
//!            -> emission phase     -> RuleModel | ProcessGraph
//! ```
//!
//! Both phases dispatch through a [`PolicyTable`] keyed by
//! `(AssertionKind, Phase, Policy)`. New assertion kinds or alternate
//! strategies are supported by registering handlers.
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous; no async, no network, no I/O
//! - Deterministic: BTreeMap/BTreeSet only, first-seen ordering everywhere
//! - Input entities are never mutated; derived entities are fresh values

// =============================================================================
// MODULES
// =============================================================================

pub mod bridge;
pub mod identity;
pub mod policy;
pub mod primitives;
pub mod process;
pub mod product;
pub mod registry;
pub mod rules;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    ActivityModification, AssemblyError, AssemblyWarning, Assertion, AssertionKind,
    BoundCondition, Complex, Entity, ModSite, Modification, ModificationType, Phase, Policy,
};

// =============================================================================
// RE-EXPORTS: Assembly Engine
// =============================================================================

pub use identity::{AssertionKey, EntityKey};
pub use policy::{Handler, PolicyConfig, PolicyTable};
pub use product::product;
pub use registry::{EntityRegistry, EntityRegistryEntry};
pub use store::AssertionStore;

// =============================================================================
// RE-EXPORTS: Targets
// =============================================================================

pub use process::{GraphAssembler, GraphBuilder, ProcessGraph, to_sbgn_xml};
pub use rules::{AssemblyStage, RuleAssembler, RuleModel, export_bngl};

// =============================================================================
// RE-EXPORTS: Session Bridge
// =============================================================================

pub use bridge::{AssertionExtractor, ChatMessage, CommandBridge, ScheduledEvent, SessionEvent};
