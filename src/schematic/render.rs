//! SVG renderer: turns a laid-out circuit into a standalone SVG document.
//!
//! Components are embedded as nested `<svg>` elements at their placement;
//! wires are drawn on top as paths with rounded corners, with a small
//! square on each port they attach to.

use crate::config::LayoutConfig;

use super::graph::CircuitGraph;
use super::types::{LayoutResult, Point, RoutedWire};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Compact number formatting: at most two decimals, no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Move from `from` towards `to` by `len`.
fn towards(from: Point, to: Point, len: f64) -> Point {
    let d = distance(from, to);
    if d == 0.0 {
        return from;
    }
    Point::new(
        from.x + (to.x - from.x) * len / d,
        from.y + (to.y - from.y) * len / d,
    )
}

// ── Wires ────────────────────────────────────────────────────────────────────

/// Path data for a poly-line whose corners are replaced by quadratic curves.
///
/// The radius at each corner is capped at half the shorter adjoining segment
/// so consecutive curves never overlap.
pub fn rounded_path(points: &[Point], radius: f64) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {} {}", num(first.x), num(first.y));
    for i in 1..points.len() {
        let p = points[i];
        if i + 1 == points.len() {
            d.push_str(&format!(" L {} {}", num(p.x), num(p.y)));
            break;
        }
        let prev = points[i - 1];
        let next = points[i + 1];
        let r = radius
            .min(distance(prev, p) / 2.0)
            .min(distance(p, next) / 2.0);
        let before = towards(p, prev, r);
        let after = towards(p, next, r);
        d.push_str(&format!(
            " L {} {} Q {} {} {} {}",
            num(before.x),
            num(before.y),
            num(p.x),
            num(p.y),
            num(after.x),
            num(after.y)
        ));
    }
    d
}

fn render_wire(wire: &RoutedWire, config: &LayoutConfig) -> String {
    if wire.points.len() < 2 {
        return String::new();
    }
    let color = wire.color.hex();
    let mut parts = vec![format!(
        r#"<path id="{}" d="{}" fill="none" stroke="{color}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
        escape(&wire.wire_id),
        rounded_path(&wire.points, config.corner_radius),
        num(config.wire_width),
    )];

    let size = config.endpoint_size;
    for end in [wire.points[0], wire.points[wire.points.len() - 1]] {
        parts.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
            num(end.x - size / 2.0),
            num(end.y - size / 2.0),
            num(size),
            num(size),
        ));
    }
    parts.join("\n")
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Render a layout of `graph` to an SVG string.
pub fn render(graph: &CircuitGraph, layout: &LayoutResult, config: &LayoutConfig) -> String {
    let w = num(layout.width);
    let h = num(layout.height);

    let mut parts = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        ),
        format!(r#"<rect width="{w}" height="{h}" fill="white"/>"#),
    ];

    // Components, member by member.
    parts.push(r#"<g id="components">"#.to_string());
    for placed in layout.nodes.iter().filter(|n| !n.is_dummy()) {
        let Some(node) = graph.node(&placed.id) else {
            continue;
        };
        for member in &node.members {
            parts.push(format!(r#"<g id="{}">"#, escape(&member.instance)));
            parts.push(member.asset.nested(
                placed.x + member.x_offset,
                placed.y,
                member.width,
                member.height,
            ));
            parts.push("</g>".to_string());
        }
    }
    parts.push("</g>".to_string());

    // Wires on top so every port stays visible.
    parts.push(r#"<g id="wires">"#.to_string());
    for wire in &layout.wires {
        let svg = render_wire(wire, config);
        if !svg.is_empty() {
            parts.push(svg);
        }
    }
    parts.push("</g>".to_string());

    parts.push("</svg>".to_string());
    parts.join("\n")
}
