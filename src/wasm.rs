//! WASM bindings.
//!
//! Exposes `compile` and `renderSchematic` to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::config::{GeneratorConfig, LayoutConfig, Target};
use crate::schematic::{BuiltinLoader, render_schematic};

fn config(robot: &str, target: &str) -> Result<GeneratorConfig, JsError> {
    let target: Target = target.parse().map_err(|e: crate::Error| JsError::new(&e.to_string()))?;
    Ok(GeneratorConfig::new().with_robot(robot).with_target(target))
}

/// Compile a serialized workspace. Returns `{code, dependencies, warnings}` as JSON.
#[wasm_bindgen]
pub fn compile(workspace: &str, robot: &str, target: &str) -> Result<String, JsError> {
    let config = config(robot, target)?;
    let program = crate::compile(workspace, &config).map_err(|e| JsError::new(&e.to_string()))?;
    serde_json::to_string(&program).map_err(|e| JsError::new(&e.to_string()))
}

/// Compile for Arduino and render the resulting circuit as SVG.
#[wasm_bindgen(js_name = "renderSchematic")]
pub fn render_schematic_svg(workspace: &str, robot: &str) -> Result<String, JsError> {
    let config = config(robot, "arduino")?;
    let program = crate::compile(workspace, &config).map_err(|e| JsError::new(&e.to_string()))?;
    let circuit = program.circuit.unwrap_or_default();
    render_schematic(&circuit, &BuiltinLoader, &LayoutConfig::default())
        .map_err(|e| JsError::new(&e.to_string()))
}
