//! SBGN-ML rendering of a [`ProcessGraph`].

use super::{Arc, Glyph, ProcessGraph};
use crate::primitives::SBGN_NAMESPACE;

/// Render `graph` as an SBGN process-description document.
///
/// Glyphs precede arcs; both appear in creation order.
#[must_use]
pub fn to_sbgn_xml(graph: &ProcessGraph) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<sbgn xmlns=\"{}\">\n", SBGN_NAMESPACE));
    out.push_str("  <map language=\"process description\">\n");
    for glyph in graph.glyphs() {
        write_glyph(&mut out, glyph, 2);
    }
    for arc in graph.arcs() {
        write_arc(&mut out, arc);
    }
    out.push_str("  </map>\n");
    out.push_str("</sbgn>\n");
    out
}

fn write_glyph(out: &mut String, glyph: &Glyph, depth: usize) {
    let pad = "  ".repeat(depth);
    out.push_str(&format!(
        "{}<glyph id=\"{}\" class=\"{}\">\n",
        pad,
        glyph.id,
        glyph.class.as_str()
    ));
    if let Some(label) = &glyph.label {
        out.push_str(&format!("{}  <label text=\"{}\"/>\n", pad, escape(label)));
    }
    if let Some(state) = &glyph.state {
        out.push_str(&format!(
            "{}  <state value=\"{}\" variable=\"{}\"/>\n",
            pad,
            escape(&state.value),
            escape(&state.variable)
        ));
    }
    let b = glyph.bbox;
    out.push_str(&format!(
        "{}  <bbox x=\"{}\" y=\"{}\" w=\"{}\" h=\"{}\"/>\n",
        pad, b.x, b.y, b.w, b.h
    ));
    for child in &glyph.children {
        write_glyph(out, child, depth + 1);
    }
    out.push_str(&format!("{}</glyph>\n", pad));
}

fn write_arc(out: &mut String, arc: &Arc) {
    out.push_str(&format!(
        "    <arc id=\"{}\" class=\"{}\" source=\"{}\" target=\"{}\"/>\n",
        arc.id,
        arc.class.as_str(),
        arc.source,
        arc.target
    ));
}

/// Escape text for use inside a double-quoted attribute.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
