//! blockwire: turns a block-editor workspace into an Arduino sketch (or
//! MicroPython for the supported subset) and synthesises the wiring
//! schematic of the robot the program drives.
//!
//! Pipeline: JSON workspace → `Workspace` → type inference → generator →
//! sketch text + dependency set + `ComponentBuilder` → layered layout → SVG.

pub mod config;
pub mod error;
pub mod generators;
pub mod inference;
pub mod registry;
pub mod schematic;
pub mod workspace;

#[cfg(feature = "wasm")]
mod wasm;

use serde::Serialize;

pub use config::{GeneratorConfig, LayoutConfig, MlConfig, RobotType, Target};
pub use error::{Error, Result};
pub use generators::arduino::{ArduinoGenerator, ArduinoOutput};
pub use generators::python::MicroPythonGenerator;
pub use registry::{Dependency, Registry};
pub use schematic::{AssetLoader, BuiltinLoader, ComponentBuilder, FsLoader, render_schematic};
pub use workspace::{BlockGraph, BlockId, BlockKind, Workspace};

/// A warning the pass left on one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockWarning {
    /// Editor id of the block.
    pub block: String,
    pub text: String,
}

/// Everything one compilation produces.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledProgram {
    pub code: String,
    pub dependencies: Vec<Dependency>,
    pub warnings: Vec<BlockWarning>,
    /// Wiring model; MicroPython passes do not build one.
    #[serde(skip)]
    pub circuit: Option<ComponentBuilder>,
}

/// Generate code for the workspace in `json` using `config`.
pub fn compile(json: &str, config: &GeneratorConfig) -> Result<CompiledProgram> {
    let mut workspace = Workspace::from_json(json)?;
    compile_workspace(&mut workspace, config)
}

/// Like [`compile`], for a workspace already in memory. Warnings are written
/// onto the blocks as well as returned.
pub fn compile_workspace(
    workspace: &mut Workspace,
    config: &GeneratorConfig,
) -> Result<CompiledProgram> {
    tracing::debug!(language = ?config.target, blocks = workspace.len(), "compiling");
    let (code, dependencies, circuit) = match config.target {
        Target::Arduino => {
            let out = ArduinoGenerator::new(workspace, config).generate()?;
            (out.code, out.dependencies, Some(out.circuit))
        }
        Target::MicroPython => {
            let code = MicroPythonGenerator::new(workspace).generate()?;
            (code, Vec::new(), None)
        }
    };
    Ok(CompiledProgram {
        code,
        dependencies,
        warnings: collect_warnings(workspace),
        circuit,
    })
}

fn collect_warnings(workspace: &Workspace) -> Vec<BlockWarning> {
    workspace
        .block_ids()
        .into_iter()
        .filter_map(|id| {
            let block = workspace.block(id);
            block.warning_text().map(|text| BlockWarning {
                block: block.id.clone(),
                text,
            })
        })
        .collect()
}
