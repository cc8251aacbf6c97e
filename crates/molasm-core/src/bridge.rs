//! # Session Bridge
//!
//! Boundary between a collaborative chat session and the assembly engine.
//!
//! A message addressed to this client that starts with the command prefix
//! is turned into assertions by an [`AssertionExtractor`], assembled into a
//! process graph and answered with a plan of file events for the session.
//! Transport is the caller's concern: this module performs no I/O and never
//! sleeps; delays are part of the returned plan.

use crate::policy::PolicyConfig;
use crate::primitives::{DEFAULT_COMMAND_PREFIX, LOAD_STEP_DELAY_MS, MAX_ASSERTIONS};
use crate::process::{GraphAssembler, to_sbgn_xml};
use crate::types::{AssemblyError, Assertion};
use serde::{Deserialize, Serialize};

// =============================================================================
// EXTRACTION SEAM
// =============================================================================

/// Turns free text into assertions.
pub trait AssertionExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Assertion>, AssemblyError>;
}

// =============================================================================
// MESSAGES AND EVENTS
// =============================================================================

/// A chat message as seen by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender name.
    pub from: String,
    /// Explicit addressee, if the session supports direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub text: String,
}

/// A request sent back into the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    NewFile,
    LoadFile { content: String },
    RunLayout,
}

/// A session event with the pause to observe before sending it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub delay_ms: u64,
    pub event: SessionEvent,
}

/// The file-load sequence for a rendered document.
#[must_use]
pub fn load_plan(content: String) -> Vec<ScheduledEvent> {
    vec![
        ScheduledEvent {
            delay_ms: 0,
            event: SessionEvent::NewFile,
        },
        ScheduledEvent {
            delay_ms: LOAD_STEP_DELAY_MS,
            event: SessionEvent::LoadFile { content },
        },
        ScheduledEvent {
            delay_ms: LOAD_STEP_DELAY_MS,
            event: SessionEvent::RunLayout,
        },
    ]
}

// =============================================================================
// BRIDGE
// =============================================================================

/// Settings for a [`CommandBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Name this client uses in the session.
    pub client_name: String,
    pub command_prefix: String,
    pub policies: PolicyConfig,
}

impl BridgeSettings {
    #[must_use]
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            policies: PolicyConfig::default(),
        }
    }
}

/// Routes chat commands through extraction and graph assembly.
#[derive(Debug)]
pub struct CommandBridge<E> {
    extractor: E,
    settings: BridgeSettings,
}

impl<E: AssertionExtractor> CommandBridge<E> {
    #[must_use]
    pub fn new(extractor: E, settings: BridgeSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// The message text with any leading mention stripped, if the message
    /// is addressed to this client and was not sent by it.
    #[must_use]
    pub fn directed_text<'m>(&self, message: &'m ChatMessage) -> Option<&'m str> {
        let me = self.settings.client_name.as_str();
        if message.from == me {
            return None;
        }
        let text = message.text.trim_start();
        if let Some(rest) = text
            .strip_prefix('@')
            .and_then(|t| t.strip_prefix(me))
            .filter(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
        {
            return Some(rest.trim_start_matches([':', ',']).trim_start());
        }
        (message.to.as_deref() == Some(me)).then_some(text)
    }

    /// Handle one message.
    ///
    /// Returns `Ok(None)` when the message is not a command for this client,
    /// otherwise the event plan that loads the assembled document.
    pub fn handle(
        &self,
        message: &ChatMessage,
    ) -> Result<Option<Vec<ScheduledEvent>>, AssemblyError> {
        let Some(text) = self.directed_text(message) else {
            return Ok(None);
        };
        let Some(command) = text.strip_prefix(self.settings.command_prefix.as_str()) else {
            tracing::debug!(from = %message.from, "directed message is not a command");
            return Ok(None);
        };

        let assertions = self.extractor.extract(command.trim())?;
        if assertions.len() > MAX_ASSERTIONS {
            return Err(AssemblyError::InvalidAssertion(format!(
                "{} assertions exceed the limit of {}",
                assertions.len(),
                MAX_ASSERTIONS
            )));
        }
        tracing::info!(
            from = %message.from,
            assertions = assertions.len(),
            "assembling model from chat command"
        );

        let mut assembler = GraphAssembler::new(self.settings.policies.clone());
        assembler.add_assertions(assertions);
        let graph = assembler.make_model()?;
        Ok(Some(load_plan(to_sbgn_xml(&graph))))
    }
}

// =============================================================================
// TESTS
// =============================================================================
