//! # Policy Dispatch
//!
//! The extension seam of the assembly engine.
//!
//! A [`PolicyTable`] maps `(AssertionKind, Phase, Policy)` to a handler
//! function. Assemblers never match on assertion kinds themselves: they ask
//! the table. Supporting a new strategy means registering new handlers.
//!
//! The table is an ordinary value built once per assembler configuration;
//! there is no global registration state.

use crate::registry::EntityRegistry;
use crate::types::{AssemblyError, Assertion, AssertionKind, Phase, Policy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// HANDLER TYPES
// =============================================================================

/// Phase-one handler: records entity shape information.
pub type RegistrationFn = fn(&Assertion, &mut EntityRegistry) -> Result<(), AssemblyError>;

/// Phase-two handler: appends elements to a target aggregate `M`.
pub type EmissionFn<M> = fn(&Assertion, &mut M, &EntityRegistry) -> Result<(), AssemblyError>;

/// A registered handler.
pub enum Handler<M> {
    Registration(RegistrationFn),
    Emission(EmissionFn<M>),
}

impl<M> Handler<M> {
    /// The phase this handler serves.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Registration(_) => Phase::Registration,
            Self::Emission(_) => Phase::Emission,
        }
    }
}

/// Key of a handler in the table.
pub type HandlerKey = (AssertionKind, Phase, Policy);

// =============================================================================
// POLICY CONFIGURATION
// =============================================================================

/// Which policy to use for which assertion kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Explicit per-kind choices.
    #[serde(default)]
    pub overrides: BTreeMap<AssertionKind, Policy>,
    /// Policy for every kind without an override.
    #[serde(default)]
    pub fallback: Policy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            overrides: BTreeMap::new(),
            fallback: Policy::default_policy(),
        }
    }
}

/// The policy picked for one assertion kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySelection {
    pub policy: Policy,
    /// True if the policy came from an explicit override.
    pub explicit: bool,
}

impl PolicyConfig {
    /// Use `policy` for every kind.
    #[must_use]
    pub fn uniform(policy: Policy) -> Self {
        Self {
            overrides: BTreeMap::new(),
            fallback: policy,
        }
    }

    /// Builder: set an explicit policy for one kind.
    #[must_use]
    pub fn with_override(mut self, kind: AssertionKind, policy: Policy) -> Self {
        self.overrides.insert(kind, policy);
        self
    }

    /// The policy to use for `kind`.
    #[must_use]
    pub fn select(&self, kind: AssertionKind) -> PolicySelection {
        match self.overrides.get(&kind) {
            Some(policy) => PolicySelection {
                policy: policy.clone(),
                explicit: true,
            },
            None => PolicySelection {
                policy: self.fallback.clone(),
                explicit: false,
            },
        }
    }
}

// =============================================================================
// POLICY TABLE
// =============================================================================

/// Handler table for one emission target `M`.
pub struct PolicyTable<M> {
    handlers: BTreeMap<HandlerKey, Handler<M>>,
}

impl<M> Default for PolicyTable<M> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<M> fmt::Debug for PolicyTable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyTable")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<M> PolicyTable<M> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a registration handler.
    pub fn on_registration(
        &mut self,
        kind: AssertionKind,
        policy: Policy,
        handler: RegistrationFn,
    ) -> &mut Self {
        self.handlers.insert(
            (kind, Phase::Registration, policy),
            Handler::Registration(handler),
        );
        self
    }

    /// Register (or replace) an emission handler.
    pub fn on_emission(
        &mut self,
        kind: AssertionKind,
        policy: Policy,
        handler: EmissionFn<M>,
    ) -> &mut Self {
        self.handlers
            .insert((kind, Phase::Emission, policy), Handler::Emission(handler));
        self
    }

    /// Check whether a handler exists for the exact key.
    #[must_use]
    pub fn contains(&self, kind: AssertionKind, phase: Phase, policy: &Policy) -> bool {
        self.handlers.contains_key(&(kind, phase, policy.clone()))
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Find the handler for `kind` in `phase` under `config`.
    ///
    /// Resolution order:
    /// 1. `(kind, phase, selected)`
    /// 2. `(kind, phase, "default")`, only when the selected policy was the
    ///    fallback rather than an explicit override for `kind`
    ///
    /// Anything else is [`AssemblyError::UnknownPolicy`] naming the selected
    /// policy.
    pub fn resolve(
        &self,
        kind: AssertionKind,
        phase: Phase,
        config: &PolicyConfig,
    ) -> Result<&Handler<M>, AssemblyError> {
        let selection = config.select(kind);
        if let Some(handler) = self
            .handlers
            .get(&(kind, phase, selection.policy.clone()))
        {
            return Ok(handler);
        }
        if !selection.explicit && !selection.policy.is_default() {
            if let Some(handler) = self
                .handlers
                .get(&(kind, phase, Policy::default_policy()))
            {
                tracing::debug!(
                    %kind,
                    %phase,
                    policy = %selection.policy,
                    "falling back to default handler"
                );
                return Ok(handler);
            }
        }
        Err(AssemblyError::UnknownPolicy {
            kind,
            phase,
            policy: selection.policy,
        })
    }

    /// Run the registration phase for one assertion.
    pub fn register(
        &self,
        assertion: &Assertion,
        registry: &mut EntityRegistry,
        config: &PolicyConfig,
    ) -> Result<(), AssemblyError> {
        let kind = assertion.kind();
        match self.resolve(kind, Phase::Registration, config)? {
            Handler::Registration(handler) => handler(assertion, registry),
            Handler::Emission(_) => Err(AssemblyError::UnknownPolicy {
                kind,
                phase: Phase::Registration,
                policy: config.select(kind).policy,
            }),
        }
    }

    /// Run the emission phase for one assertion.
    pub fn emit(
        &self,
        assertion: &Assertion,
        target: &mut M,
        registry: &EntityRegistry,
        config: &PolicyConfig,
    ) -> Result<(), AssemblyError> {
        let kind = assertion.kind();
        match self.resolve(kind, Phase::Emission, config)? {
            Handler::Emission(handler) => handler(assertion, target, registry),
            Handler::Registration(_) => Err(AssemblyError::UnknownPolicy {
                kind,
                phase: Phase::Emission,
                policy: config.select(kind).policy,
            }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complex, Entity};

    #[derive(Default)]
    struct Log(Vec<&'static str>);

    fn reg_ok(_: &Assertion, registry: &mut EntityRegistry) -> Result<(), AssemblyError> {
        registry.entry_mut("seen");
        Ok(())
    }

    fn emit_default(_: &Assertion, log: &mut Log, _: &EntityRegistry) -> Result<(), AssemblyError> {
        log.0.push("default");
        Ok(())
    }

    fn emit_custom(_: &Assertion, log: &mut Log, _: &EntityRegistry) -> Result<(), AssemblyError> {
        log.0.push("custom");
        Ok(())
    }

    fn complex() -> Assertion {
        Complex::new(vec![Entity::new("A"), Entity::new("B")]).into()
    }

    fn table() -> PolicyTable<Log> {
        let mut table = PolicyTable::new();
        table
            .on_registration(AssertionKind::Complex, Policy::default_policy(), reg_ok)
            .on_emission(AssertionKind::Complex, Policy::default_policy(), emit_default)
            .on_emission(AssertionKind::Complex, Policy::new("custom"), emit_custom);
        table
    }

    #[test]
    fn exact_policy_wins() {
        let config = PolicyConfig::default().with_override(AssertionKind::Complex, Policy::new("custom"));
        let mut log = Log::default();
        table()
            .emit(&complex(), &mut log, &EntityRegistry::new(), &config)
            .expect("emit");
        assert_eq!(log.0, vec!["custom"]);
    }

    #[test]
    fn fallback_policy_falls_back_to_default() {
        let config = PolicyConfig::uniform(Policy::new("exotic"));
        let mut log = Log::default();
        table()
            .emit(&complex(), &mut log, &EntityRegistry::new(), &config)
            .expect("emit");
        assert_eq!(log.0, vec!["default"]);
    }

    #[test]
    fn explicit_override_never_falls_back() {
        let config =
            PolicyConfig::default().with_override(AssertionKind::Complex, Policy::new("exotic"));
        let mut log = Log::default();
        let err = table()
            .emit(&complex(), &mut log, &EntityRegistry::new(), &config)
            .expect_err("no handler");
        assert!(matches!(
            err,
            AssemblyError::UnknownPolicy { kind: AssertionKind::Complex, phase: Phase::Emission, ref policy }
                if policy.as_str() == "exotic"
        ));
        assert!(log.0.is_empty());
    }

    #[test]
    fn missing_kind_is_unknown_policy() {
        let t: PolicyTable<Log> = PolicyTable::new();
        let err = t
            .resolve(AssertionKind::Modification, Phase::Registration, &PolicyConfig::default())
            .err()
            .expect("no handler");
        assert_eq!(
            err.to_string(),
            "No registration handler for Modification under policy 'default'"
        );
    }

    #[test]
    fn registration_dispatches_to_registry() {
        let mut registry = EntityRegistry::new();
        table()
            .register(&complex(), &mut registry, &PolicyConfig::default())
            .expect("register");
        assert!(registry.get("seen").is_some());
    }

    #[test]
    fn handler_reports_its_phase() {
        let t = table();
        let handler = t
            .resolve(AssertionKind::Complex, Phase::Registration, &PolicyConfig::default())
            .expect("resolve");
        assert_eq!(handler.phase(), Phase::Registration);
        assert!(t.contains(AssertionKind::Complex, Phase::Emission, &Policy::new("custom")));
        assert_eq!(t.len(), 3);
    }
}
