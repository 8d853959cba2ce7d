//! Circuit schematic: the component model generators fill in, and the
//! pipeline that lays it out and renders it as SVG.

pub mod assets;
pub mod components;
pub mod graph;
pub mod layered;
pub mod model;
pub mod render;
pub mod types;

pub use assets::{AssetLoader, BuiltinLoader, FsLoader, MemoryLoader};
pub use components::{Component, ComponentKind, mapping_in_range};
pub use model::{ComponentBuilder, JoinedComponent, MURPHY, MURPHY_I2C, PortRef, VisibleComponent, Wire, WireColor};
pub use types::LayoutResult;

use crate::config::LayoutConfig;
use crate::error::Result;

use assets::AssetCache;
use graph::CircuitGraph;
use layered::LayeredLayout;

/// Load assets, lay out and position the circuit without rendering it.
pub fn layout_schematic(
    builder: &ComponentBuilder,
    loader: &dyn AssetLoader,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    let mut cache = AssetCache::new(loader);
    let graph = CircuitGraph::build(builder, &mut cache, config.scale)?;
    Ok(LayeredLayout::layout(&graph, config))
}

/// Full pipeline: assets → circuit graph → layered layout → SVG.
pub fn render_schematic(
    builder: &ComponentBuilder,
    loader: &dyn AssetLoader,
    config: &LayoutConfig,
) -> Result<String> {
    let mut cache = AssetCache::new(loader);
    let graph = CircuitGraph::build(builder, &mut cache, config.scale)?;
    let layout = LayeredLayout::layout(&graph, config);
    tracing::debug!(
        components = builder.instance_count(),
        wires = builder.wires().len(),
        "rendering schematic"
    );
    Ok(render::render(&graph, &layout, config))
}
