//! # Assembly Configuration
//!
//! Optional TOML file read with `--config`. Every key has a default, so an
//! empty file (or no file) is a valid configuration.
//!
//! ```toml
//! fallback_policy = "default"
//! initial_conditions = true
//! initial_amount = 100.0
//! command_prefix = "model:"
//! client_name = "molasm"
//!
//! [policies]
//! Modification = "two_step"
//! ```

use molasm_core::bridge::BridgeSettings;
use molasm_core::primitives::{DEFAULT_COMMAND_PREFIX, DEFAULT_INITIAL_AMOUNT, DEFAULT_POLICY};
use molasm_core::{AssemblyError, AssertionKind, Policy, PolicyConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name the bridge answers to when none is configured.
pub const DEFAULT_CLIENT_NAME: &str = "molasm";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
    /// Policy for assertion kinds without an entry in `policies`.
    pub fallback_policy: String,
    /// Seed every monomer when building a rule model.
    pub initial_conditions: bool,
    /// Amount used for seeded monomers.
    pub initial_amount: f64,
    /// Prefix marking a chat message as a command.
    pub command_prefix: String,
    /// Name the session bridge answers to.
    pub client_name: String,
    /// Explicit per-kind policies.
    pub policies: BTreeMap<AssertionKind, String>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            fallback_policy: DEFAULT_POLICY.to_string(),
            initial_conditions: true,
            initial_amount: DEFAULT_INITIAL_AMOUNT,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            policies: BTreeMap::new(),
        }
    }
}

impl AssemblyConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, AssemblyError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            AssemblyError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(AssemblyError::IoError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssemblyError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, AssemblyError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AssemblyError::SerializationError(format!("TOML parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no assembly could use.
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.fallback_policy.trim().is_empty() {
            return Err(AssemblyError::SerializationError(
                "fallback_policy must not be empty".to_string(),
            ));
        }
        if !self.initial_amount.is_finite() || self.initial_amount < 0.0 {
            return Err(AssemblyError::SerializationError(format!(
                "initial_amount must be a non-negative number, got {}",
                self.initial_amount
            )));
        }
        if self.command_prefix.is_empty() {
            return Err(AssemblyError::SerializationError(
                "command_prefix must not be empty".to_string(),
            ));
        }
        if self.client_name.trim().is_empty() {
            return Err(AssemblyError::SerializationError(
                "client_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Dispatch configuration for the core assemblers.
    #[must_use]
    pub fn policy_config(&self) -> PolicyConfig {
        self.policies.iter().fold(
            PolicyConfig::uniform(Policy::new(self.fallback_policy.as_str())),
            |config, (kind, policy)| config.with_override(*kind, Policy::new(policy.as_str())),
        )
    }

    /// Settings for the session bridge.
    #[must_use]
    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            client_name: self.client_name.clone(),
            command_prefix: self.command_prefix.clone(),
            policies: self.policy_config(),
        }
    }
}
