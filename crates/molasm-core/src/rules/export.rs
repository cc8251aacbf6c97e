//! BNGL-style text rendering of a [`RuleModel`].

use super::{ComplexPattern, Monomer, MonomerPattern, Rule, RuleModel, SiteValue};

/// Render `model` as BioNetGen-style rule text.
///
/// Sections appear in a fixed order; empty sections are still emitted so
/// the output shape does not depend on content.
#[must_use]
pub fn export_bngl(model: &RuleModel) -> String {
    let mut out = String::new();
    out.push_str("# Generated by molasm\n");
    for a in model.annotations() {
        out.push_str(&format!("# annotation {} {} {}\n", a.subject, a.predicate, a.object));
    }
    for w in model.warnings() {
        out.push_str(&format!("# warning: {}\n", w));
    }
    out.push_str("begin model\n\n");

    out.push_str("begin parameters\n");
    for p in model.parameters() {
        out.push_str(&format!("  {} {}\n", p.name, p.value));
    }
    out.push_str("end parameters\n\n");

    out.push_str("begin molecule types\n");
    for m in model.monomers() {
        out.push_str(&format!("  {}\n", format_monomer(m)));
    }
    out.push_str("end molecule types\n\n");

    out.push_str("begin seed species\n");
    for i in model.initials() {
        out.push_str(&format!("  {} {}\n", format_complex(&i.pattern), i.parameter));
    }
    out.push_str("end seed species\n\n");

    out.push_str("begin reaction rules\n");
    for r in model.rules() {
        out.push_str(&format!("  {}\n", format_rule(r)));
    }
    out.push_str("end reaction rules\n\n");

    out.push_str("end model\n");
    out
}

fn format_monomer(m: &Monomer) -> String {
    let sites: Vec<String> = m
        .sites
        .iter()
        .map(|site| match m.site_states.get(site) {
            Some(states) => {
                let mut s = site.clone();
                for state in states {
                    s.push('~');
                    s.push_str(state);
                }
                s
            }
            None => site.clone(),
        })
        .collect();
    format!("{}({})", m.name, sites.join(","))
}

fn format_pattern(p: &MonomerPattern) -> String {
    let sites: Vec<String> = p
        .sites
        .iter()
        .map(|(site, value)| match value {
            SiteValue::State(state) => format!("{}~{}", site, state),
            SiteValue::Unbound => site.clone(),
            SiteValue::Bond(n) => format!("{}!{}", site, n),
            SiteValue::AnyBond => format!("{}!+", site),
        })
        .collect();
    format!("{}({})", p.monomer, sites.join(","))
}

fn format_complex(cp: &ComplexPattern) -> String {
    cp.0.iter().map(format_pattern).collect::<Vec<_>>().join(".")
}

fn format_side(side: &[ComplexPattern]) -> String {
    side.iter().map(format_complex).collect::<Vec<_>>().join(" + ")
}

fn format_rule(r: &Rule) -> String {
    match &r.reverse_rate {
        Some(kr) => format!(
            "{}: {} <-> {} {}, {}",
            r.name,
            format_side(&r.reactants),
            format_side(&r.products),
            r.forward_rate,
            kr
        ),
        None => format!(
            "{}: {} -> {} {}",
            r.name,
            format_side(&r.reactants),
            format_side(&r.products),
            r.forward_rate
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyConfig;
    use crate::rules::RuleAssembler;
    use crate::types::{Complex, Entity, Modification, ModificationType};

    #[test]
    fn pattern_notation() {
        let p = MonomerPattern::new("A")
            .with("b", SiteValue::Bond(1))
            .with("c", SiteValue::AnyBond)
            .with("s", SiteValue::State("p".to_string()))
            .with("x", SiteValue::Unbound);
        assert_eq!(format_pattern(&p), "A(b!1,c!+,s~p,x)");
    }

    #[test]
    fn exports_all_sections() {
        let mut assembler = RuleAssembler::new(PolicyConfig::default());
        assembler.add_assertions([
            Modification::new(
                Entity::new("BRAF").with_db_ref("UP", "P15056"),
                Entity::new("MAP2K1"),
                ModificationType::PhosphorylationSerine,
                Some("218"),
            )
            .into(),
            Complex::new(vec![Entity::new("BRAF"), Entity::new("RAF1")]).into(),
        ]);
        let text = export_bngl(assembler.make_model(true).expect("model"));

        assert!(text.contains("# annotation BRAF is http://identifiers.org/uniprot/P15056"));
        assert!(text.contains("  MAP2K1(S218~u~p)\n"));
        assert!(text.contains("  kf_bm_S_1 0.000001\n"));
        assert!(text.contains("  MAP2K1(S218~u) MAP2K1_0\n"));
        assert!(text.contains(
            "  BRAF_S_MAP2K1_S218: BRAF() + MAP2K1(S218~u) -> BRAF() + MAP2K1(S218~p) kf_bm_S_1\n"
        ));
        assert!(text.contains(
            "  BRAF_RAF1_bind: BRAF(raf1) + RAF1(braf) <-> BRAF(raf1!1).RAF1(braf!1) kf_br_bind_1, kr_br_bind_1\n"
        ));
        assert!(text.ends_with("end model\n"));
    }
}
