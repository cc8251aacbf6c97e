//! # CLI Command Implementations
//!
//! Input is a JSON array of tagged assertions:
//!
//! ```json
//! [{"type":"Modification","enzyme":{"name":"BRAF"},"substrate":{"name":"MAP2K1"},
//!   "modification":"PhosphorylationSerine","position":"218"}]
//! ```

use crate::config::AssemblyConfig;
use molasm_core::primitives::MAX_ASSERTIONS;
use molasm_core::{
    AssemblyError, Assertion, AssertionExtractor, ChatMessage, CommandBridge, GraphAssembler,
    RuleAssembler, ScheduledEvent, export_bngl, to_sbgn_xml,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum assertion file size (16 MB).
pub const MAX_INPUT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AssemblyError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AssemblyError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(AssemblyError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path and require a regular file.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, AssemblyError> {
    let canonical = path.canonicalize().map_err(|e| {
        AssemblyError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(AssemblyError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path against an existing parent directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, AssemblyError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        AssemblyError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(AssemblyError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| AssemblyError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// INPUT
// =============================================================================

/// Parse assertion JSON: an array, or a single assertion object.
pub fn parse_assertions(text: &str) -> Result<Vec<Assertion>, AssemblyError> {
    let trimmed = text.trim();
    let assertions = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<Assertion>>(trimmed)
    } else {
        serde_json::from_str::<Assertion>(trimmed).map(|a| vec![a])
    }
    .map_err(|e| AssemblyError::SerializationError(format!("Invalid assertion JSON: {}", e)))?;

    if assertions.len() > MAX_ASSERTIONS {
        return Err(AssemblyError::InvalidAssertion(format!(
            "{} assertions exceed the limit of {}",
            assertions.len(),
            MAX_ASSERTIONS
        )));
    }
    Ok(assertions)
}

/// Read and parse an assertion file.
pub fn load_assertions(path: &Path) -> Result<Vec<Assertion>, AssemblyError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| AssemblyError::IoError(format!("Cannot read file: {}", e)))?;
    let assertions = parse_assertions(&content)?;
    tracing::debug!(path = %path.display(), count = assertions.len(), "loaded assertions");
    Ok(assertions)
}

/// Extractor reading assertion JSON straight from the command text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl AssertionExtractor for JsonExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Assertion>, AssemblyError> {
        parse_assertions(text)
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Assemble a rule model and render it as `bngl` or `json`.
pub fn render_rules(
    config: &AssemblyConfig,
    assertions: Vec<Assertion>,
    format: &str,
    initial_conditions: bool,
) -> Result<String, AssemblyError> {
    let mut assembler = RuleAssembler::new(config.policy_config());
    assembler.add_assertions(assertions);
    assembler.make_model(false)?;
    if initial_conditions {
        assembler.add_default_initial_conditions(config.initial_amount)?;
    }
    let model = assembler.model();

    for warning in model.warnings() {
        tracing::warn!(%warning, "rule assembly warning");
    }

    match format {
        "bngl" => Ok(export_bngl(model)),
        "json" => serde_json::to_string_pretty(model)
            .map_err(|e| AssemblyError::SerializationError(e.to_string())),
        other => Err(AssemblyError::SerializationError(format!(
            "Unknown rules format '{}'. Use: bngl, json",
            other
        ))),
    }
}

/// Assemble a process graph and render it as `sbgn` or `json`.
pub fn render_graph(
    config: &AssemblyConfig,
    assertions: Vec<Assertion>,
    format: &str,
) -> Result<String, AssemblyError> {
    let mut assembler = GraphAssembler::new(config.policy_config());
    assembler.add_assertions(assertions);
    let graph = assembler.make_model()?;

    for warning in graph.warnings() {
        tracing::warn!(%warning, "graph assembly warning");
    }

    match format {
        "sbgn" => Ok(to_sbgn_xml(&graph)),
        "json" => serde_json::to_string_pretty(&graph)
            .map_err(|e| AssemblyError::SerializationError(e.to_string())),
        other => Err(AssemblyError::SerializationError(format!(
            "Unknown graph format '{}'. Use: sbgn, json",
            other
        ))),
    }
}

/// Write to a file, or to stdout when no path is given.
fn write_output(output: Option<&Path>, content: &str) -> Result<(), AssemblyError> {
    match output {
        Some(path) => {
            let path = validate_output_path(path)?;
            std::fs::write(&path, content)
                .map_err(|e| AssemblyError::IoError(format!("Cannot write file: {}", e)))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "output written");
        }
        None => println!("{}", content),
    }
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Assemble a rule-based model from an assertion file.
pub fn cmd_rules(
    config: &AssemblyConfig,
    input: &Path,
    output: Option<&Path>,
    format: &str,
    no_initials: bool,
) -> Result<(), AssemblyError> {
    let assertions = load_assertions(input)?;
    let initials = config.initial_conditions && !no_initials;
    let rendered = render_rules(config, assertions, format, initials)?;
    write_output(output, &rendered)
}

/// Assemble a process-description graph from an assertion file.
pub fn cmd_graph(
    config: &AssemblyConfig,
    input: &Path,
    output: Option<&Path>,
    format: &str,
) -> Result<(), AssemblyError> {
    let assertions = load_assertions(input)?;
    let rendered = render_graph(config, assertions, format)?;
    write_output(output, &rendered)
}

/// Run one message through the bridge and return its event plan.
pub fn message_plan(
    config: &AssemblyConfig,
    from: &str,
    to: Option<&str>,
    text: &str,
) -> Result<Option<Vec<ScheduledEvent>>, AssemblyError> {
    let bridge = CommandBridge::new(JsonExtractor, config.bridge_settings());
    bridge.handle(&ChatMessage {
        from: from.to_string(),
        to: to.map(str::to_string),
        text: text.to_string(),
    })
}

/// Print the event plan for one chat message as JSON.
pub fn cmd_message(
    config: &AssemblyConfig,
    from: &str,
    to: Option<&str>,
    text: &str,
) -> Result<(), AssemblyError> {
    match message_plan(config, from, to, text)? {
        Some(plan) => {
            let rendered = serde_json::to_string_pretty(&plan)
                .map_err(|e| AssemblyError::SerializationError(e.to_string()))?;
            println!("{}", rendered);
        }
        None => tracing::info!(from, "message ignored"),
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
