use super::*;
use crate::schematic::assets::{AssetCache, BuiltinLoader};
use crate::schematic::components::ComponentKind;
use crate::schematic::model::{ComponentBuilder, MURPHY, MURPHY_I2C, WireColor};

fn adj(edges: &[(&str, &str)]) -> AdjGraph {
    let mut ag = AdjGraph::new();
    for (a, b) in edges {
        ag.add_node(a);
        ag.add_node(b);
        ag.add_edge(a, b);
    }
    ag
}

fn sensor_circuit() -> ComponentBuilder {
    let mut b = ComponentBuilder::new();
    for pin in ["2", "3"] {
        let id = b.add(&format!("digital-{pin}"), ComponentKind::LineSensor);
        b.wire((MURPHY, pin), (&id, "Out"), WireColor::Data1).unwrap();
        b.wire((MURPHY, &format!("{pin}.GND")), (&id, "GND"), WireColor::Gnd)
            .unwrap();
    }
    b.add("tof-1", ComponentKind::Tof);
    b.connect_i2c(MURPHY_I2C, "tof-1", Some(1)).unwrap();
    b
}

fn run(builder: &ComponentBuilder) -> LayoutResult {
    let mut cache = AssetCache::new(&BuiltinLoader);
    let graph = CircuitGraph::build(builder, &mut cache, 2.0).unwrap();
    LayeredLayout::layout(&graph, &LayoutConfig::default())
}

// ── Layer Assignment ─────────────────────────────────────────────────────

#[test]
fn test_layer_assignment_chain() {
    let la = LayerAssignment::assign(&adj(&[("A", "B"), ("B", "C")]));
    assert_eq!(la.layers["A"], 0);
    assert_eq!(la.layers["B"], 1);
    assert_eq!(la.layers["C"], 2);
    assert_eq!(la.layer_count, 3);
}

#[test]
fn test_layer_assignment_cycle_is_broken() {
    let la = LayerAssignment::assign(&adj(&[("A", "B"), ("B", "C"), ("C", "A")]));
    assert_eq!(la.reversed_edges.len(), 1);
    let mut layers: Vec<usize> = la.layers.values().copied().collect();
    layers.sort();
    assert_eq!(layers, vec![0, 1, 2]);
}

#[test]
fn test_parallel_edges_are_merged() {
    let ag = adj(&[("A", "B"), ("A", "B")]);
    assert_eq!(ag.edges.len(), 1);
    assert_eq!(ag.out_degree("A"), 1);
}

// ── Dummy Nodes & Crossings ──────────────────────────────────────────────

#[test]
fn test_long_edge_gets_dummy() {
    let la = LayerAssignment::assign(&adj(&[("A", "B"), ("B", "C"), ("A", "C")]));
    let aug = insert_dummy_nodes(&la);
    assert_eq!(aug.dummy_edges.len(), 1);
    let de = &aug.dummy_edges[0];
    assert_eq!((de.original_src.as_str(), de.original_tgt.as_str()), ("A", "C"));
    assert_eq!(de.dummy_ids.len(), 1);
    assert_eq!(aug.layers[&de.dummy_ids[0]], 1);
}

#[test]
fn test_count_crossings() {
    let ag = adj(&[("A", "D"), ("B", "C")]);
    let crossed = vec![
        vec!["A".to_string(), "B".to_string()],
        vec!["C".to_string(), "D".to_string()],
    ];
    assert_eq!(count_crossings(&crossed, &ag), 1);
    let straight = vec![
        vec!["A".to_string(), "B".to_string()],
        vec!["D".to_string(), "C".to_string()],
    ];
    assert_eq!(count_crossings(&straight, &ag), 0);
}

#[test]
fn test_minimise_crossings_untangles() {
    let la = LayerAssignment::assign(&adj(&[("A", "D"), ("B", "C")]));
    let aug = insert_dummy_nodes(&la);
    let ordering = minimise_crossings(&aug);
    assert_eq!(count_crossings(&ordering, &aug.ag), 0);
}

// ── Full pipeline ────────────────────────────────────────────────────────

#[test]
fn test_board_alone() {
    let result = run(&ComponentBuilder::new());
    assert_eq!(result.nodes.len(), 1);
    assert!(result.wires.is_empty());
    let board = &result.nodes[0];
    assert_eq!(board.x, 20.0);
    assert_eq!(board.y, 20.0);
    assert_eq!(result.width, board.x + board.width + 20.0);
}

#[test]
fn test_sensors_leave_the_board_layer() {
    let result = run(&sensor_circuit());
    let board = result.node("murphy+murphy-i2c").unwrap();
    for id in ["digital-2", "digital-3", "tof-1"] {
        let n = result.node(id).unwrap();
        assert_ne!(n.layer, board.layer, "{id}");
    }
    assert_eq!(result.wires.len(), 8);
}

#[test]
fn test_wires_are_orthogonal() {
    let result = run(&sensor_circuit());
    for wire in &result.wires {
        assert!(wire.points.len() >= 2, "{}", wire.wire_id);
        for seg in wire.points.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            assert!(a.x == b.x || a.y == b.y, "{} bends diagonally", wire.wire_id);
        }
    }
}

#[test]
fn test_wire_ends_on_ports() {
    let builder = sensor_circuit();
    let mut cache = AssetCache::new(&BuiltinLoader);
    let graph = CircuitGraph::build(&builder, &mut cache, 2.0).unwrap();
    let result = LayeredLayout::layout(&graph, &LayoutConfig::default());

    let wire = &builder.wires()[0];
    let routed = result.wire(&wire.id).unwrap();
    let (node_id, (dx, dy)) = graph.port_offset(&wire.from).unwrap();
    let node = result.node(node_id).unwrap();
    assert_eq!(routed.points[0], Point::new(node.x + dx, node.y + dy));

    let (node_id, (dx, dy)) = graph.port_offset(&wire.to).unwrap();
    let node = result.node(node_id).unwrap();
    assert_eq!(
        routed.points[routed.points.len() - 1],
        Point::new(node.x + dx, node.y + dy)
    );
}

#[test]
fn test_layout_is_deterministic() {
    let builder = sensor_circuit();
    assert_eq!(run(&builder), run(&builder));
}
