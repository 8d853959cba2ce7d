//! Layered (Sugiyama) layout of the circuit graph.
//!
//! Phases:
//!   1. break wire cycles with a greedy feedback arc set
//!   2. longest-path layering
//!   3. split long wires with dummy nodes
//!   4. barycenter ordering within layers
//!   5. x/y placement from asset sizes
//!   6. orthogonal routing between port anchors
//!
//! Nodes keep their asset size; wires start and end on the exact port
//! anchors, so only the bend points are chosen here.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};

use crate::config::LayoutConfig;

use super::graph::CircuitGraph;
use super::types::{DUMMY_PREFIX, LayoutResult, PlacedNode, Point, RoutedWire};

// ─── Adjacency graph ─────────────────────────────────────────────────────────

/// Adjacency view of the circuit: one edge per connected node pair.
///
/// Several wires between the same two components only need to pull them
/// into neighbouring layers once.
#[derive(Debug, Clone, Default)]
pub struct AdjGraph {
    nodes: Vec<String>,
    successors: HashMap<String, Vec<String>>,
    predecessors: HashMap<String, Vec<String>>,
    edges: Vec<(String, String)>,
}

impl AdjGraph {
    fn new() -> Self {
        Self::default()
    }

    fn add_node(&mut self, id: &str) {
        if !self.successors.contains_key(id) {
            self.nodes.push(id.to_string());
            self.successors.insert(id.to_string(), Vec::new());
            self.predecessors.insert(id.to_string(), Vec::new());
        }
    }

    fn add_edge(&mut self, src: &str, tgt: &str) {
        if self.edges.iter().any(|(s, t)| s == src && t == tgt) {
            return;
        }
        self.successors
            .entry(src.to_string())
            .or_default()
            .push(tgt.to_string());
        self.predecessors
            .entry(tgt.to_string())
            .or_default()
            .push(src.to_string());
        self.edges.push((src.to_string(), tgt.to_string()));
    }

    fn out_degree(&self, id: &str) -> usize {
        self.successors.get(id).map(|v| v.len()).unwrap_or(0)
    }

    fn in_degree(&self, id: &str) -> usize {
        self.predecessors.get(id).map(|v| v.len()).unwrap_or(0)
    }

    fn successors_of(&self, id: &str) -> &[String] {
        self.successors.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn predecessors_of(&self, id: &str) -> &[String] {
        self.predecessors
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

fn circuit_to_adj(graph: &CircuitGraph) -> AdjGraph {
    let mut ag = AdjGraph::new();
    for idx in graph.digraph.node_indices() {
        ag.add_node(&graph.digraph[idx].id);
    }
    for eidx in graph.digraph.edge_indices() {
        if let Some((a, b)) = graph.digraph.edge_endpoints(eidx) {
            let (src, tgt) = (&graph.digraph[a].id, &graph.digraph[b].id);
            // A wire between two members of one joined node needs no layering.
            if src != tgt {
                ag.add_edge(src, tgt);
            }
        }
    }
    ag
}

// ─── Breaking cycles ─────────────────────────────────────────────────────────

/// Order nodes so that few edges point backwards (Eades' greedy feedback
/// arc set heuristic).
///
/// Wires keep the direction they were drawn in. Pin peripherals are drawn
/// from the board to the part and I2C devices from the part to the bus, so
/// a part wired both ways to the same board closes a cycle. Layering needs
/// a DAG.
fn greedy_fas_ordering(ag: &AdjGraph) -> Vec<String> {
    let mut active: IndexSet<String> = ag.nodes.iter().cloned().collect();
    let mut out_deg: HashMap<String, i64> = HashMap::new();
    let mut in_deg: HashMap<String, i64> = HashMap::new();

    for node in &ag.nodes {
        out_deg.insert(node.clone(), ag.out_degree(node) as i64);
        in_deg.insert(node.clone(), ag.in_degree(node) as i64);
    }

    let mut s1: Vec<String> = Vec::new();
    let mut s2: Vec<String> = Vec::new();

    while !active.is_empty() {
        loop {
            let sinks: Vec<String> = active
                .iter()
                .filter(|n| out_deg.get(*n).copied().unwrap_or(0) == 0)
                .cloned()
                .collect();
            if sinks.is_empty() {
                break;
            }
            for sink in &sinks {
                active.shift_remove(sink);
                s2.push(sink.clone());
                for pred in ag.predecessors_of(sink) {
                    if active.contains(pred) {
                        *out_deg.entry(pred.clone()).or_insert(0) -= 1;
                    }
                }
            }
        }

        loop {
            let sources: Vec<String> = active
                .iter()
                .filter(|n| in_deg.get(*n).copied().unwrap_or(0) == 0)
                .cloned()
                .collect();
            if sources.is_empty() {
                break;
            }
            for source in &sources {
                active.shift_remove(source);
                s1.push(source.clone());
                for succ in ag.successors_of(source) {
                    if active.contains(succ) {
                        *in_deg.entry(succ.clone()).or_insert(0) -= 1;
                    }
                }
            }
        }

        let best = active
            .iter()
            .max_by_key(|n| {
                out_deg.get(*n).copied().unwrap_or(0) - in_deg.get(*n).copied().unwrap_or(0)
            })
            .cloned();
        if let Some(best) = best {
            active.shift_remove(&best);
            for succ in ag.successors_of(&best) {
                if active.contains(succ) {
                    *in_deg.entry(succ.clone()).or_insert(0) -= 1;
                }
            }
            for pred in ag.predecessors_of(&best) {
                if active.contains(pred) {
                    *out_deg.entry(pred.clone()).or_insert(0) -= 1;
                }
            }
            s1.push(best);
        }
    }

    s2.reverse();
    s1.extend(s2);
    s1
}

/// Reverse the edges running against the greedy-FAS order.
fn remove_cycles(ag: &AdjGraph) -> (AdjGraph, HashSet<(String, String)>) {
    let ordering = greedy_fas_ordering(ag);
    let position: HashMap<&str, usize> = ordering
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut reversed = HashSet::new();
    let mut dag = AdjGraph::new();
    for node in &ag.nodes {
        dag.add_node(node);
    }
    for (src, tgt) in &ag.edges {
        let sp = position.get(src.as_str()).copied().unwrap_or(0);
        let tp = position.get(tgt.as_str()).copied().unwrap_or(0);
        if sp > tp {
            reversed.insert((src.clone(), tgt.clone()));
            dag.add_edge(tgt, src);
        } else {
            dag.add_edge(src, tgt);
        }
    }
    (dag, reversed)
}

// ─── Layering ────────────────────────────────────────────────────────────────

pub struct LayerAssignment {
    pub layers: HashMap<String, usize>,
    pub layer_count: usize,
    pub reversed_edges: HashSet<(String, String)>,
    dag: AdjGraph,
}

impl LayerAssignment {
    fn assign(ag: &AdjGraph) -> Self {
        let (dag, reversed_edges) = remove_cycles(ag);
        let mut layers: HashMap<String, usize> = dag.nodes.iter().map(|n| (n.clone(), 0)).collect();

        let mut changed = true;
        while changed {
            changed = false;
            for (src, tgt) in &dag.edges {
                let src_layer = layers.get(src).copied().unwrap_or(0);
                let tgt_layer = layers.entry(tgt.clone()).or_insert(0);
                if *tgt_layer < src_layer + 1 {
                    *tgt_layer = src_layer + 1;
                    changed = true;
                }
            }
        }

        let layer_count = layers.values().copied().max().map(|m| m + 1).unwrap_or(1);
        Self {
            layers,
            layer_count,
            reversed_edges,
            dag,
        }
    }
}

// ─── Long wires ──────────────────────────────────────────────────────────────

pub struct DummyEdge {
    pub original_src: String,
    pub original_tgt: String,
    pub dummy_ids: Vec<String>,
}

pub struct AugmentedGraph {
    pub ag: AdjGraph,
    pub layers: HashMap<String, usize>,
    pub layer_count: usize,
    pub dummy_edges: Vec<DummyEdge>,
}

fn insert_dummy_nodes(la: &LayerAssignment) -> AugmentedGraph {
    let mut ag = AdjGraph::new();
    for node in &la.dag.nodes {
        ag.add_node(node);
    }

    let mut layers = la.layers.clone();
    let mut dummy_edges = Vec::new();

    for (edge_counter, (src, tgt)) in la.dag.edges.iter().enumerate() {
        let src_layer = layers.get(src).copied().unwrap_or(0);
        let tgt_layer = layers.get(tgt).copied().unwrap_or(0);
        if tgt_layer <= src_layer + 1 {
            ag.add_edge(src, tgt);
            continue;
        }

        let mut dummy_ids = Vec::new();
        let mut chain_prev = src.clone();
        for i in 0..(tgt_layer - src_layer - 1) {
            let dummy_id = format!("{DUMMY_PREFIX}{edge_counter}_{i}");
            ag.add_node(&dummy_id);
            layers.insert(dummy_id.clone(), src_layer + i + 1);
            ag.add_edge(&chain_prev, &dummy_id);
            dummy_ids.push(dummy_id.clone());
            chain_prev = dummy_id;
        }
        ag.add_edge(&chain_prev, tgt);

        dummy_edges.push(DummyEdge {
            original_src: src.clone(),
            original_tgt: tgt.clone(),
            dummy_ids,
        });
    }

    AugmentedGraph {
        ag,
        layers,
        layer_count: la.layer_count,
        dummy_edges,
    }
}

// ─── Ordering within layers ──────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Side {
    Incoming,
    Outgoing,
}

fn barycenter(node_id: &str, ag: &AdjGraph, neighbor_pos: &HashMap<String, f64>, side: Side) -> f64 {
    let neighbors = match side {
        Side::Incoming => ag.predecessors_of(node_id),
        Side::Outgoing => ag.successors_of(node_id),
    };
    let positions: Vec<f64> = neighbors
        .iter()
        .filter_map(|nb| neighbor_pos.get(nb).copied())
        .collect();
    if positions.is_empty() {
        f64::INFINITY
    } else {
        positions.iter().sum::<f64>() / positions.len() as f64
    }
}

fn count_crossings(ordering: &[Vec<String>], ag: &AdjGraph) -> usize {
    let mut total = 0usize;
    for l_idx in 0..ordering.len().saturating_sub(1) {
        let tgt_pos: HashMap<&str, usize> = ordering[l_idx + 1]
            .iter()
            .enumerate()
            .map(|(i, nid)| (nid.as_str(), i))
            .collect();
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (sp, src_id) in ordering[l_idx].iter().enumerate() {
            for nb in ag.successors_of(src_id) {
                if let Some(&tp) = tgt_pos.get(nb.as_str()) {
                    edges.push((sp, tp));
                }
            }
        }
        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                let (a0, a1) = edges[i];
                let (b0, b1) = edges[j];
                if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
                    total += 1;
                }
            }
        }
    }
    total
}

fn sort_layer(layer: &mut [String], ag: &AdjGraph, reference: &[String], side: Side) {
    let pos: HashMap<String, f64> = reference
        .iter()
        .enumerate()
        .map(|(i, nid)| (nid.clone(), i as f64))
        .collect();
    layer.sort_by(|a, b| {
        let ba = barycenter(a, ag, &pos, side);
        let bb = barycenter(b, ag, &pos, side);
        ba.partial_cmp(&bb).unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn minimise_crossings(aug: &AugmentedGraph) -> Vec<Vec<String>> {
    let layer_count = aug.layer_count;
    let mut ordering: Vec<Vec<String>> = vec![Vec::new(); layer_count];

    let mut sorted_nodes: Vec<&str> = aug.ag.nodes.iter().map(|s| s.as_str()).collect();
    sorted_nodes.sort();
    for node_id in sorted_nodes {
        let layer = aug.layers.get(node_id).copied().unwrap_or(0);
        if layer < ordering.len() {
            ordering[layer].push(node_id.to_string());
        }
    }

    let max_passes = 24;
    let mut best = count_crossings(&ordering, &aug.ag);

    for _pass in 0..max_passes {
        for layer_idx in 1..layer_count {
            let prev = ordering[layer_idx - 1].clone();
            sort_layer(&mut ordering[layer_idx], &aug.ag, &prev, Side::Incoming);
        }
        for layer_idx in (0..layer_count.saturating_sub(1)).rev() {
            let next = ordering[layer_idx + 1].clone();
            sort_layer(&mut ordering[layer_idx], &aug.ag, &next, Side::Outgoing);
        }

        let crossings = count_crossings(&ordering, &aug.ag);
        if crossings >= best {
            break;
        }
        best = crossings;
    }

    ordering
}

// ─── Placement ───────────────────────────────────────────────────────────────

fn assign_coordinates(
    ordering: &[Vec<String>],
    aug: &AugmentedGraph,
    sizes: &HashMap<String, (f64, f64)>,
    config: &LayoutConfig,
) -> Vec<PlacedNode> {
    let gap = config.node_spacing;

    let mut layer_height = vec![0.0f64; ordering.len()];
    for (layer_idx, layer_nodes) in ordering.iter().enumerate() {
        for node_id in layer_nodes {
            if let Some((_, h)) = sizes.get(node_id) {
                layer_height[layer_idx] = layer_height[layer_idx].max(*h);
            }
        }
    }
    let node_dims = |node_id: &str, layer: usize| -> (f64, f64) {
        match sizes.get(node_id) {
            Some(dims) => *dims,
            None => (0.0, layer_height[layer]),
        }
    };

    let mut layer_y = Vec::with_capacity(ordering.len());
    let mut y = 0.0;
    for h in &layer_height {
        layer_y.push(y);
        y += h + config.layer_spacing;
    }

    let layer_widths: Vec<f64> = ordering
        .iter()
        .enumerate()
        .map(|(layer, nodes)| {
            let w: f64 = nodes.iter().map(|n| node_dims(n, layer).0).sum();
            w + nodes.len().saturating_sub(1) as f64 * gap
        })
        .collect();
    let max_layer_w = layer_widths.iter().copied().fold(0.0, f64::max);

    let mut nodes: Vec<PlacedNode> = Vec::new();
    for (layer_idx, layer_nodes) in ordering.iter().enumerate() {
        let mut x = ((max_layer_w - layer_widths[layer_idx]) / 2.0).max(0.0);
        for (order, node_id) in layer_nodes.iter().enumerate() {
            let (width, height) = node_dims(node_id, layer_idx);
            nodes.push(PlacedNode {
                id: node_id.clone(),
                layer: layer_idx,
                order,
                x,
                y: layer_y[layer_idx],
                width,
                height,
            });
            x += width + gap;
        }
    }

    let node_idx: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), i))
        .collect();

    // Forward pass: children align to their parents.
    for layer_idx in 1..ordering.len() {
        let mut sum_child = 0.0;
        let mut sum_parent = 0.0;
        let mut count = 0usize;
        for node_id in &ordering[layer_idx] {
            let Some(&ni) = node_idx.get(node_id) else {
                continue;
            };
            for pred in aug.ag.predecessors_of(node_id) {
                if pred.starts_with(DUMMY_PREFIX) {
                    continue;
                }
                if let Some(&pi) = node_idx.get(pred) {
                    sum_child += nodes[ni].centre_x();
                    sum_parent += nodes[pi].centre_x();
                    count += 1;
                }
            }
        }
        if count == 0 {
            continue;
        }
        let shift = (sum_parent - sum_child) / count as f64;
        for node_id in &ordering[layer_idx] {
            if let Some(&ni) = node_idx.get(node_id) {
                nodes[ni].x = (nodes[ni].x + shift).max(0.0);
            }
        }
    }

    // Backward pass: parents align to their children, if that is a small move.
    for layer_idx in (0..ordering.len().saturating_sub(1)).rev() {
        let mut sum_node = 0.0;
        let mut sum_child = 0.0;
        let mut count = 0usize;
        for node_id in &ordering[layer_idx] {
            let Some(&ni) = node_idx.get(node_id) else {
                continue;
            };
            for succ in aug.ag.successors_of(node_id) {
                if succ.starts_with(DUMMY_PREFIX) {
                    continue;
                }
                if let Some(&ci) = node_idx.get(succ) {
                    sum_node += nodes[ni].centre_x();
                    sum_child += nodes[ci].centre_x();
                    count += 1;
                }
            }
        }
        if count == 0 {
            continue;
        }
        let shift = (sum_child - sum_node) / count as f64;
        if shift.abs() > gap {
            continue;
        }
        for node_id in &ordering[layer_idx] {
            if let Some(&ni) = node_idx.get(node_id) {
                nodes[ni].x = (nodes[ni].x + shift).max(0.0);
            }
        }
    }

    let min_x = nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
    for n in &mut nodes {
        n.x += config.padding - if min_x.is_finite() { min_x } else { 0.0 };
        n.y += config.padding;
    }

    nodes
}

// ─── Wire Routing ────────────────────────────────────────────────────────────

/// A wire resolved to absolute endpoints, upper end first.
struct PendingWire {
    wire_id: String,
    color: super::model::WireColor,
    start: Point,
    end: Point,
    /// Gaps (between layer `g` and `g + 1`) the wire crosses, top down.
    gaps: Vec<usize>,
    dummy_xs: Vec<f64>,
    /// Points were computed bottom-up relative to the wire's direction.
    flipped: bool,
}

fn route_wires(
    graph: &CircuitGraph,
    nodes: &[PlacedNode],
    aug: &AugmentedGraph,
    config: &LayoutConfig,
) -> Vec<RoutedWire> {
    let node_map: HashMap<&str, &PlacedNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let layer_count = aug.layer_count.max(1);
    let mut layer_top = vec![f64::INFINITY; layer_count];
    let mut layer_bottom = vec![0.0f64; layer_count];
    for n in nodes {
        if n.layer < layer_count {
            layer_top[n.layer] = layer_top[n.layer].min(n.y);
            layer_bottom[n.layer] = layer_bottom[n.layer].max(n.bottom());
        }
    }

    let mut dummy_xs: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for de in &aug.dummy_edges {
        let xs = de
            .dummy_ids
            .iter()
            .filter_map(|d| node_map.get(d.as_str()))
            .map(|n| n.x)
            .collect();
        dummy_xs.insert((de.original_src.as_str(), de.original_tgt.as_str()), xs);
    }

    let mut pending: Vec<PendingWire> = Vec::new();
    for eidx in graph.digraph.edge_indices() {
        let edge = &graph.digraph[eidx];
        let (Some((from_node, from_off)), Some((to_node, to_off))) =
            (graph.port_offset(&edge.from), graph.port_offset(&edge.to))
        else {
            tracing::warn!(wire = %edge.wire_id, "wire endpoint has no port anchor");
            continue;
        };
        let (Some(a), Some(b)) = (node_map.get(from_node), node_map.get(to_node)) else {
            continue;
        };
        let from_pt = Point::new(a.x + from_off.0, a.y + from_off.1);
        let to_pt = Point::new(b.x + to_off.0, b.y + to_off.1);

        // Upper end first; ties keep the wire's own direction.
        let flipped = b.layer < a.layer;
        let (upper, lower, start, end) = if flipped {
            (*b, *a, to_pt, from_pt)
        } else {
            (*a, *b, from_pt, to_pt)
        };

        let gaps: Vec<usize> = if upper.layer == lower.layer {
            vec![upper.layer]
        } else {
            (upper.layer..lower.layer).collect()
        };

        // Dummy chains always run from the upper layer down.
        let xs = dummy_xs
            .get(&(upper.id.as_str(), lower.id.as_str()))
            .cloned()
            .unwrap_or_default();

        pending.push(PendingWire {
            wire_id: edge.wire_id.clone(),
            color: edge.color,
            start,
            end,
            gaps,
            dummy_xs: xs,
            flipped,
        });
    }

    // Spread the horizontal runs sharing a gap over separate lanes.
    let mut lanes_per_gap: IndexMap<usize, usize> = IndexMap::new();
    for w in &pending {
        for g in &w.gaps {
            *lanes_per_gap.entry(*g).or_insert(0) += 1;
        }
    }
    let mut next_lane: HashMap<usize, usize> = HashMap::new();

    let mut routes = Vec::with_capacity(pending.len());
    for w in pending {
        let mut points = vec![w.start];
        for (i, gap) in w.gaps.iter().enumerate() {
            let gap_start = layer_bottom.get(*gap).copied().unwrap_or(w.start.y);
            let gap_end = layer_top
                .get(gap + 1)
                .copied()
                .filter(|t| t.is_finite())
                .unwrap_or(gap_start + config.layer_spacing);
            let lanes = lanes_per_gap.get(gap).copied().unwrap_or(1);
            let lane = next_lane.entry(*gap).or_insert(0);
            let lane_y = gap_start + (gap_end - gap_start) * (*lane + 1) as f64 / (lanes + 1) as f64;
            *lane += 1;

            let gap_x = if i == 0 {
                w.start.x
            } else {
                w.dummy_xs.get(i - 1).copied().unwrap_or(w.end.x)
            };
            let last = points[points.len() - 1];
            if last.x != gap_x {
                points.push(Point::new(gap_x, last.y));
            }
            points.push(Point::new(gap_x, lane_y));
            let next_x = w.dummy_xs.get(i).copied().unwrap_or(w.end.x);
            points.push(Point::new(next_x, lane_y));
        }
        let last = points[points.len() - 1];
        if last.x != w.end.x {
            points.push(Point::new(w.end.x, last.y));
        }
        points.push(w.end);
        points.dedup();
        if w.flipped {
            points.reverse();
        }
        routes.push(RoutedWire {
            wire_id: w.wire_id,
            color: w.color,
            points,
        });
    }

    routes
}

// ─── Entry point ─────────────────────────────────────────────────────────────

pub struct LayeredLayout;

impl LayeredLayout {
    /// Run the full layered pipeline on a circuit graph.
    pub fn layout(graph: &CircuitGraph, config: &LayoutConfig) -> LayoutResult {
        let ag = circuit_to_adj(graph);
        let la = LayerAssignment::assign(&ag);
        let aug = insert_dummy_nodes(&la);
        let ordering = minimise_crossings(&aug);

        let sizes: HashMap<String, (f64, f64)> = graph
            .digraph
            .node_weights()
            .map(|n| (n.id.clone(), (n.width, n.height)))
            .collect();
        let nodes = assign_coordinates(&ordering, &aug, &sizes, config);
        let wires = route_wires(graph, &nodes, &aug, config);

        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        for n in &nodes {
            width = width.max(n.x + n.width);
            height = height.max(n.bottom());
        }
        for w in &wires {
            for p in &w.points {
                width = width.max(p.x);
                height = height.max(p.y);
            }
        }

        tracing::debug!(
            layers = la.layer_count,
            reversed = la.reversed_edges.len(),
            "layered layout done"
        );

        LayoutResult {
            nodes,
            wires,
            width: width + config.padding,
            height: height + config.padding,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_layered.rs"]
mod tests;
