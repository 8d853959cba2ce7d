//! CircuitGraph: the component model as a petgraph DiGraph for layout.
//!
//! One node per joined component, one edge per wire. Member assets are
//! placed side by side inside their node, so every port has a fixed offset
//! from the node's top-left corner once the assets are loaded.

use std::collections::HashMap;
use std::rc::Rc;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Error, Result};

use super::assets::{AssetCache, LoadedComponent};
use super::model::{ComponentBuilder, PortRef, WireColor};

/// One component inside a layout node.
#[derive(Debug, Clone)]
pub struct MemberData {
    pub instance: String,
    pub asset: Rc<LoadedComponent>,
    /// Horizontal offset of this member inside the node, in output units.
    pub x_offset: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: String,
    pub members: Vec<MemberData>,
    pub width: f64,
    pub height: f64,
    /// `instance:port` → offset from the node's top-left corner.
    pub ports: HashMap<String, (f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct EdgeData {
    pub wire_id: String,
    pub from: PortRef,
    pub to: PortRef,
    pub color: WireColor,
}

pub fn port_key(port: &PortRef) -> String {
    format!("{}:{}", port.instance, port.port)
}

pub struct CircuitGraph {
    pub digraph: DiGraph<NodeData, EdgeData>,
    /// Node id → petgraph NodeIndex.
    pub node_index: HashMap<String, NodeIndex>,
    /// Component instance id → id of the node holding it.
    pub instance_node: HashMap<String, String>,
}

impl CircuitGraph {
    /// Build the graph, loading assets through `cache`. Sizes are multiplied by `scale`.
    pub fn build(builder: &ComponentBuilder, cache: &mut AssetCache, scale: f64) -> Result<Self> {
        let mut digraph: DiGraph<NodeData, EdgeData> = DiGraph::new();
        let mut node_index = HashMap::new();
        let mut instance_node = HashMap::new();

        for joined in builder.components() {
            let mut members = Vec::new();
            let mut ports = HashMap::new();
            let mut x = 0.0;
            let mut height: f64 = 0.0;
            for member in &joined.members {
                let asset = cache.get(&member.component)?;
                let (w, h) = (asset.width * scale, asset.height * scale);
                for (port, (px, py)) in &asset.ports {
                    let key = format!("{}:{}", member.id, port);
                    ports.insert(key, (x + px * scale, py * scale));
                }
                members.push(MemberData {
                    instance: member.id.clone(),
                    asset,
                    x_offset: x,
                    width: w,
                    height: h,
                });
                instance_node.insert(member.id.clone(), joined.id.clone());
                x += w;
                height = height.max(h);
            }
            let idx = digraph.add_node(NodeData {
                id: joined.id.clone(),
                members,
                width: x,
                height,
                ports,
            });
            node_index.insert(joined.id.clone(), idx);
        }

        for wire in builder.wires() {
            let endpoint = |port: &PortRef| -> Result<NodeIndex> {
                instance_node
                    .get(&port.instance)
                    .and_then(|n| node_index.get(n))
                    .copied()
                    .ok_or_else(|| Error::UnknownComponent(port.instance.clone()))
            };
            let a = endpoint(&wire.from)?;
            let b = endpoint(&wire.to)?;
            digraph.add_edge(
                a,
                b,
                EdgeData {
                    wire_id: wire.id.clone(),
                    from: wire.from.clone(),
                    to: wire.to.clone(),
                    color: wire.color,
                },
            );
        }

        tracing::debug!(
            nodes = digraph.node_count(),
            edges = digraph.edge_count(),
            "circuit graph built"
        );

        Ok(Self {
            digraph,
            node_index,
            instance_node,
        })
    }

    pub fn node_count(&self) -> usize {
        self.digraph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.digraph.edge_count()
    }

    pub fn is_dag(&self) -> bool {
        !is_cyclic_directed(&self.digraph)
    }

    pub fn node(&self, id: &str) -> Option<&NodeData> {
        self.node_index.get(id).map(|idx| &self.digraph[*idx])
    }

    /// Node id and in-node offset of a port.
    pub fn port_offset(&self, port: &PortRef) -> Option<(&str, (f64, f64))> {
        let node_id = self.instance_node.get(&port.instance)?;
        let node = self.node(node_id)?;
        let offset = node.ports.get(&port_key(port))?;
        Some((node_id.as_str(), *offset))
    }
}
