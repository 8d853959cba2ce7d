//! Layout types: PlacedNode, RoutedWire, Point, LayoutResult.

use super::model::WireColor;

pub const DUMMY_PREFIX: &str = "__dummy_";

// ─── Point ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ─── PlacedNode ──────────────────────────────────────────────────────────────

/// A layout node (a joined component or a routing dummy) with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: String,
    pub layer: usize,
    pub order: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedNode {
    pub fn is_dummy(&self) -> bool {
        self.id.starts_with(DUMMY_PREFIX)
    }

    pub fn centre_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

// ─── RoutedWire ──────────────────────────────────────────────────────────────

/// A wire with its orthogonal bend points, first and last on the ports.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedWire {
    pub wire_id: String,
    pub color: WireColor,
    pub points: Vec<Point>,
}

// ─── LayoutResult ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub nodes: Vec<PlacedNode>,
    pub wires: Vec<RoutedWire>,
    pub width: f64,
    pub height: f64,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn wire(&self, id: &str) -> Option<&RoutedWire> {
        self.wires.iter().find(|w| w.wire_id == id)
    }
}
