//! Component SVG assets: loading, caching and port anchor extraction.
//!
//! A port sits at the centre of the element whose id the component maps it
//! to. Only the handful of shapes used to mark connectors are understood
//! (`rect`, `circle`, `ellipse`, `line`); coordinates are read in the asset's
//! own viewBox units.

use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Error, Result};

use super::components::{Component, ComponentKind};

static ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z][\w:-]*)\b([^>]*)>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w:-]+)\s*=\s*"([^"]*)""#).expect("valid regex"));
static SVG_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").expect("valid regex"));

// ─── Loaders ─────────────────────────────────────────────────────────────────

/// Source of SVG text for a component schema name.
pub trait AssetLoader {
    fn load(&self, schema: &str) -> Result<String>;
}

/// Reads `<root>/<schema>` from disk.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for FsLoader {
    fn load(&self, schema: &str) -> Result<String> {
        let path = self.root.join(schema);
        tracing::debug!(path = %path.display(), "loading schematic asset");
        std::fs::read_to_string(&path).map_err(|e| Error::Asset {
            schema: schema.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Assets held in memory, keyed by schema name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    assets: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: impl Into<String>, svg: impl Into<String>) -> &mut Self {
        self.assets.insert(schema.into(), svg.into());
        self
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, schema: &str) -> Result<String> {
        self.assets.get(schema).cloned().ok_or_else(|| Error::Asset {
            schema: schema.to_string(),
            reason: "not registered".to_string(),
        })
    }
}

/// The drawings shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl BuiltinLoader {
    fn source(schema: &str) -> Option<&'static str> {
        let svg = match schema {
            "murphy.svg" => include_str!("../../assets/murphy.svg"),
            "murphy-i2c.svg" => include_str!("../../assets/murphy-i2c.svg"),
            "servo.svg" => include_str!("../../assets/servo.svg"),
            "line-sensor.svg" => include_str!("../../assets/line-sensor.svg"),
            "light-sensor.svg" => include_str!("../../assets/light-sensor.svg"),
            "rgb-flitz.svg" => include_str!("../../assets/rgb-flitz.svg"),
            "tof.svg" => include_str!("../../assets/tof.svg"),
            "ultrasonic.svg" => include_str!("../../assets/ultrasonic.svg"),
            "gas.svg" => include_str!("../../assets/gas.svg"),
            _ => return None,
        };
        Some(svg)
    }
}

impl AssetLoader for BuiltinLoader {
    fn load(&self, schema: &str) -> Result<String> {
        Self::source(schema)
            .map(str::to_string)
            .ok_or_else(|| Error::Asset {
                schema: schema.to_string(),
                reason: "no builtin drawing".to_string(),
            })
    }
}

// ─── Parsed assets ───────────────────────────────────────────────────────────

/// An asset with its size and the position of every mapped port.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedComponent {
    pub schema: String,
    pub content: String,
    pub width: f64,
    pub height: f64,
    /// port name → (x, y) relative to the asset's top-left corner
    pub ports: IndexMap<String, (f64, f64)>,
}

impl LoadedComponent {
    /// The asset re-rooted at `(x, y)` with the given outer size, ready to
    /// nest inside another SVG document.
    pub fn nested(&self, x: f64, y: f64, width: f64, height: f64) -> String {
        let open = format!(
            r#"<svg x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" viewBox="0 0 {} {}">"#,
            self.width, self.height
        );
        let body = match SVG_OPEN_RE.find(&self.content) {
            Some(m) => &self.content[m.end()..],
            None => self.content.as_str(),
        };
        format!("{open}{body}")
    }
}

/// Leading number of an SVG length (`"12.5mm"` → 12.5).
fn parse_length(value: &str) -> Option<f64> {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e'))
        .unwrap_or(value.len());
    value[..end].trim().parse().ok()
}

fn attrs(raw: &str) -> HashMap<&str, &str> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect()
}

fn num(attrs: &HashMap<&str, &str>, name: &str) -> f64 {
    attrs.get(name).and_then(|v| parse_length(v)).unwrap_or(0.0)
}

fn centre(tag: &str, a: &HashMap<&str, &str>) -> (f64, f64) {
    match tag {
        "circle" | "ellipse" => (num(a, "cx"), num(a, "cy")),
        "line" => (
            (num(a, "x1") + num(a, "x2")) / 2.0,
            (num(a, "y1") + num(a, "y2")) / 2.0,
        ),
        _ => (
            num(a, "x") + num(a, "width") / 2.0,
            num(a, "y") + num(a, "height") / 2.0,
        ),
    }
}

/// Parse an asset and resolve the anchor of every port `component` maps.
pub fn parse_component(component: &Component, content: String) -> Result<LoadedComponent> {
    let schema = component.schema;
    let asset_err = |reason: String| Error::Asset {
        schema: schema.to_string(),
        reason,
    };

    let root = SVG_OPEN_RE
        .find(&content)
        .ok_or_else(|| asset_err("not an SVG document".to_string()))?;
    let root_attrs = attrs(root.as_str());
    let (width, height) = match root_attrs.get("viewBox") {
        Some(vb) => {
            let parts: Vec<f64> = vb
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            match parts.as_slice() {
                [_, _, w, h] => (*w, *h),
                _ => return Err(asset_err(format!("malformed viewBox '{vb}'"))),
            }
        }
        None => (num(&root_attrs, "width"), num(&root_attrs, "height")),
    };

    let mut anchors: HashMap<String, (f64, f64)> = HashMap::new();
    for cap in ELEMENT_RE.captures_iter(&content) {
        let (Some(tag), Some(raw)) = (cap.get(1), cap.get(2)) else {
            continue;
        };
        let a = attrs(raw.as_str());
        if let Some(id) = a.get("id") {
            anchors.insert(id.to_string(), centre(tag.as_str(), &a));
        }
    }

    let mut ports = IndexMap::new();
    for (port, element) in &component.mappings {
        let pos = anchors
            .get(element)
            .ok_or_else(|| asset_err(format!("element '{element}' for port {port} not found")))?;
        ports.insert(port.clone(), *pos);
    }

    Ok(LoadedComponent {
        schema: schema.to_string(),
        content,
        width,
        height,
        ports,
    })
}

/// Loads each schema once per cache lifetime.
pub struct AssetCache<'l> {
    loader: &'l dyn AssetLoader,
    loaded: HashMap<ComponentKind, Rc<LoadedComponent>>,
}

impl<'l> AssetCache<'l> {
    pub fn new(loader: &'l dyn AssetLoader) -> Self {
        Self {
            loader,
            loaded: HashMap::new(),
        }
    }

    pub fn get(&mut self, component: &Component) -> Result<Rc<LoadedComponent>> {
        if let Some(hit) = self.loaded.get(&component.kind) {
            return Ok(Rc::clone(hit));
        }
        let content = self.loader.load(component.schema)?;
        let parsed = Rc::new(parse_component(component, content)?);
        self.loaded.insert(component.kind, Rc::clone(&parsed));
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
