//! Configuration for a generation pass and for schematic layout.

use serde::Deserialize;

/// Robot identifier as used by the editor (`l_uno`, `l_nano_esp32`, `l_original_nano`, ...).
///
/// Pin choices and a few library variants depend on the board family the
/// robot is built on, which is encoded in the identifier itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RobotType(pub String);

impl RobotType {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_esp32(&self) -> bool {
        self.0.contains("esp32")
    }

    pub fn is_nano(&self) -> bool {
        self.0.contains("nano")
    }

    /// Leaphy Original robots wire the RGB LED differently on the nano.
    pub fn is_original(&self) -> bool {
        self.0.contains("original")
    }
}

impl Default for RobotType {
    fn default() -> Self {
        Self("l_uno".to_string())
    }
}

/// Which source language the driver emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Arduino,
    MicroPython,
}

impl std::str::FromStr for Target {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arduino" | "cpp" => Ok(Target::Arduino),
            "micropython" | "python" => Ok(Target::MicroPython),
            other => Err(crate::Error::UnknownTarget(other.to_string())),
        }
    }
}

/// How `ml_classify` gathers its result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MlConfig {
    /// Run the model on the board (TensorFlow Lite) instead of streaming
    /// sensor values over BLE to a host.
    #[serde(default)]
    pub generate_inference: bool,
    /// Model weights as C source (`const unsigned char model_data[] = ...`).
    #[serde(default)]
    pub model_headers: Option<String>,
}

/// Configuration for one code generation pass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub robot: RobotType,
    #[serde(default)]
    pub target: Target,
    /// Program image embedded in the sketch so the IDE can read it back over serial.
    #[serde(default)]
    pub program: Option<Vec<u8>>,
    #[serde(default)]
    pub ml: MlConfig,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_robot(mut self, robot: impl Into<String>) -> Self {
        self.robot = RobotType::new(robot);
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
}

/// Geometry parameters for schematic layout and rendering.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Horizontal gap between components in one layer.
    pub node_spacing: f64,
    /// Vertical gap between layers.
    pub layer_spacing: f64,
    /// Output pixels per asset unit.
    pub scale: f64,
    pub corner_radius: f64,
    pub wire_width: f64,
    /// Side length of the square drawn at each wire endpoint.
    pub endpoint_size: f64,
    /// Margin around the whole drawing.
    pub padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 40.0,
            layer_spacing: 80.0,
            scale: 4.0,
            corner_radius: 10.0,
            wire_width: 4.0,
            endpoint_size: 8.0,
            padding: 20.0,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
