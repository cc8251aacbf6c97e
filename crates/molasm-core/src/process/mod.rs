//! # Process Graph
//!
//! The graph-model aggregate: entity glyphs, process glyphs and typed arcs,
//! in the shape of an SBGN process-description map.
//!
//! ## Identifiers
//!
//! Glyphs, nested glyphs and arcs draw from one counter, so every id is
//! unique within a document and never reused. Entity glyphs are
//! deduplicated by [`EntityKey`]: structurally equal entities share a glyph.

mod assembler;
mod handlers;
mod sbgn;

pub use assembler::GraphAssembler;
pub use handlers::builtin_table;
pub use sbgn::to_sbgn_xml;

use crate::identity::EntityKey;
use crate::primitives::{ENTITY_BBOX, ID_PREFIX, PROCESS_BBOX, STATE_BBOX};
use crate::types::{AssemblyError, AssemblyWarning, Entity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// IDENTIFIERS AND CLASSES
// =============================================================================

/// Document-unique identifier of a glyph or arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphId(pub u32);

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ID_PREFIX, self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphClass {
    Macromolecule,
    Complex,
    StateVariable,
    Process,
    Association,
}

impl GlyphClass {
    /// SBGN class attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Macromolecule => "macromolecule",
            Self::Complex => "complex",
            Self::StateVariable => "state variable",
            Self::Process => "process",
            Self::Association => "association",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcClass {
    Consumption,
    Production,
    Catalysis,
}

impl ArcClass {
    /// SBGN class attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::Production => "production",
            Self::Catalysis => "catalysis",
        }
    }
}

// =============================================================================
// GLYPHS AND ARCS
// =============================================================================

/// Bounding box in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl From<(u32, u32, u32, u32)> for BBox {
    fn from((x, y, w, h): (u32, u32, u32, u32)) -> Self {
        Self { x, y, w, h }
    }
}

/// Value of a state-variable glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateValue {
    pub value: String,
    pub variable: String,
}

/// A node of the map, possibly with nested glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub id: GlyphId,
    pub class: GlyphClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateValue>,
    pub bbox: BBox,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Glyph>,
}

/// A typed directed edge between two top-level glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc {
    pub id: GlyphId,
    pub class: ArcClass,
    pub source: GlyphId,
    pub target: GlyphId,
}

// =============================================================================
// PROCESS GRAPH
// =============================================================================

/// An assembled process-description graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessGraph {
    glyphs: Vec<Glyph>,
    arcs: Vec<Arc>,
    warnings: Vec<AssemblyWarning>,
}

impl ProcessGraph {
    /// Top-level glyphs in creation order.
    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    #[must_use]
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    #[must_use]
    pub fn warnings(&self) -> &[AssemblyWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn glyph(&self, id: GlyphId) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.id == id)
    }

    /// Top-level glyphs of the given class.
    pub fn glyphs_of(&self, class: GlyphClass) -> impl Iterator<Item = &Glyph> {
        self.glyphs.iter().filter(move |g| g.class == class)
    }

    /// Arcs of the given class.
    pub fn arcs_of(&self, class: ArcClass) -> impl Iterator<Item = &Arc> {
        self.arcs.iter().filter(move |a| a.class == class)
    }

    /// Every id in the document: glyphs (depth-first) then arcs.
    #[must_use]
    pub fn all_ids(&self) -> Vec<GlyphId> {
        fn walk(glyph: &Glyph, ids: &mut Vec<GlyphId>) {
            ids.push(glyph.id);
            for child in &glyph.children {
                walk(child, ids);
            }
        }
        let mut ids = Vec::new();
        for glyph in &self.glyphs {
            walk(glyph, &mut ids);
        }
        ids.extend(self.arcs.iter().map(|a| a.id));
        ids
    }
}

// =============================================================================
// GRAPH BUILDER
// =============================================================================

/// Emission target for graph handlers.
///
/// Owns the id counter and the entity-to-glyph index for one document.
/// Ids are unique within that document; each builder starts again at `id_1`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ProcessGraph,
    last_id: u32,
    node_ids: BTreeMap<EntityKey, GlyphId>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> GlyphId {
        self.last_id += 1;
        GlyphId(self.last_id)
    }

    /// Ensure `entity` has a glyph. Returns the existing id if a structurally
    /// equal entity was added before.
    pub fn add_entity(&mut self, entity: &Entity) -> GlyphId {
        let key = entity.key();
        if let Some(&id) = self.node_ids.get(&key) {
            return id;
        }
        let glyph = self.entity_glyph(entity);
        let id = glyph.id;
        tracing::debug!(node = %id, entity = %key, "adding entity glyph");
        self.graph.glyphs.push(glyph);
        self.node_ids.insert(key, id);
        id
    }

    /// The glyph previously created for `entity`.
    pub fn node_for(&self, entity: &Entity) -> Result<GlyphId, AssemblyError> {
        let key = entity.key();
        self.node_ids
            .get(&key)
            .copied()
            .ok_or_else(|| AssemblyError::MissingNode(key.to_string()))
    }

    /// Number of distinct entity glyphs.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Add a process-like glyph (`Process` or `Association`).
    pub fn add_process(&mut self, class: GlyphClass) -> GlyphId {
        let id = self.fresh_id();
        self.graph.glyphs.push(Glyph {
            id,
            class,
            label: None,
            state: None,
            bbox: PROCESS_BBOX.into(),
            children: Vec::new(),
        });
        id
    }

    pub fn add_arc(&mut self, class: ArcClass, source: GlyphId, target: GlyphId) -> GlyphId {
        let id = self.fresh_id();
        self.graph.arcs.push(Arc {
            id,
            class,
            source,
            target,
        });
        id
    }

    /// Record a non-fatal condition.
    pub fn warn(&mut self, warning: AssemblyWarning) {
        tracing::warn!(%warning, "graph assembly");
        self.graph.warnings.push(warning);
    }

    #[must_use]
    pub fn finish(self) -> ProcessGraph {
        self.graph
    }

    // -------------------------------------------------------------------------
    // Glyph construction
    // -------------------------------------------------------------------------

    fn entity_glyph(&mut self, entity: &Entity) -> Glyph {
        if !entity.has_bound_partners() {
            return self.macromolecule_glyph(entity);
        }
        let id = self.fresh_id();
        let children = complex_components(entity)
            .iter()
            .map(|component| self.macromolecule_glyph(component))
            .collect();
        Glyph {
            id,
            class: GlyphClass::Complex,
            label: None,
            state: None,
            bbox: ENTITY_BBOX.into(),
            children,
        }
    }

    fn macromolecule_glyph(&mut self, entity: &Entity) -> Glyph {
        let id = self.fresh_id();
        let children = entity
            .modifications
            .iter()
            .map(|site| Glyph {
                id: self.fresh_id(),
                class: GlyphClass::StateVariable,
                label: None,
                state: Some(StateValue {
                    value: site.kind.modified().to_uppercase(),
                    variable: site.site_name(),
                }),
                bbox: STATE_BBOX.into(),
                children: Vec::new(),
            })
            .collect();
        Glyph {
            id,
            class: GlyphClass::Macromolecule,
            label: Some(entity.name.clone()),
            state: None,
            bbox: ENTITY_BBOX.into(),
            children,
        }
    }
}

/// The members of the composite rooted at `entity`, each without bindings.
///
/// Bound partners are walked recursively, so a partner's own partners join
/// the same flat list in depth-first order.
#[must_use]
pub fn complex_components(entity: &Entity) -> Vec<Entity> {
    let mut components = vec![entity.without_bindings()];
    for partner in entity.bound_partners() {
        components.extend(complex_components(partner));
    }
    components
}

// =============================================================================
// TESTS
// =============================================================================
