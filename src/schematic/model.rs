//! Component/port/wire model built up by the generators during a pass.
//!
//! Instances are keyed by an id chosen by the generator (`digital-3`,
//! `servo_left`, `tof-null`, ...). Adding an id that already exists returns
//! the existing instance, so two blocks using the same sensor produce one
//! component with wires from both call sites.

use crate::error::{Error, Result};

use super::components::{Component, ComponentKind};

/// Instance id of the main board.
pub const MURPHY: &str = "murphy";
/// Instance id of the I2C multiplexer fused to the board.
pub const MURPHY_I2C: &str = "murphy-i2c";

// ─── WireColor ───────────────────────────────────────────────────────────────

/// Semantic wire colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireColor {
    Gnd,
    Vcc,
    Vdd,
    Vss,
    Data1,
    Data2,
    Data3,
    Data4,
    Sda,
    Scl,
    Tx,
    Rx,
    Mosi,
    Miso,
    Sck,
    Cs,
    Reset,
    Enable,
    Interrupt,
    Clock,
    Analog1,
    Analog2,
    Analog3,
    Pwm1,
    Pwm2,
    Pwm3,
    Shield,
    Ref,
}

impl WireColor {
    pub fn hex(self) -> &'static str {
        match self {
            WireColor::Gnd | WireColor::Vss => "#000000",
            WireColor::Vcc | WireColor::Vdd => "#dc2626",
            WireColor::Data1 => "#16a34a",
            WireColor::Data2 => "#2563eb",
            WireColor::Data3 => "#ca8a04",
            WireColor::Data4 => "#c026d3",
            WireColor::Sda => "#0891b2",
            WireColor::Scl | WireColor::Sck => "#eab308",
            WireColor::Tx => "#15803d",
            WireColor::Rx => "#7c3aed",
            WireColor::Mosi => "#22c55e",
            WireColor::Miso => "#3b82f6",
            WireColor::Cs => "#a855f7",
            WireColor::Reset => "#991b1b",
            WireColor::Enable => "#166534",
            WireColor::Interrupt => "#6b21a8",
            WireColor::Clock => "#d97706",
            WireColor::Analog1 => "#ec4899",
            WireColor::Analog2 => "#06b6d4",
            WireColor::Analog3 => "#b45309",
            WireColor::Pwm1 => "#8b5cf6",
            WireColor::Pwm2 => "#10b981",
            WireColor::Pwm3 => "#f59e0b",
            WireColor::Shield => "#6b7280",
            WireColor::Ref => "#4b5563",
        }
    }
}

// ─── Instances and wires ─────────────────────────────────────────────────────

/// One end of a wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub instance: String,
    pub port: String,
}

/// A placed occurrence of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleComponent {
    pub id: String,
    pub component: Component,
}

impl VisibleComponent {
    /// Reference a port, failing if the component does not declare it.
    pub fn port(&self, port: &str) -> Result<PortRef> {
        if !self.component.has_port(port) {
            return Err(Error::MissingPort {
                instance: self.id.clone(),
                port: port.to_string(),
                schema: self.component.schema.to_string(),
            });
        }
        Ok(PortRef {
            instance: self.id.clone(),
            port: port.to_string(),
        })
    }
}

/// Components laid out as a single node, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedComponent {
    pub id: String,
    pub members: Vec<VisibleComponent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: String,
    pub from: PortRef,
    pub to: PortRef,
    pub color: WireColor,
}

// ─── ComponentBuilder ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    components: Vec<JoinedComponent>,
    wires: Vec<Wire>,
}

impl Default for ComponentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentBuilder {
    /// A builder holding the board and its multiplexer, already joined.
    pub fn new() -> Self {
        let mut builder = Self {
            components: Vec::new(),
            wires: Vec::new(),
        };
        builder.add(MURPHY, ComponentKind::Murphy);
        builder.add(MURPHY_I2C, ComponentKind::MurphyI2c);
        builder.join(&[MURPHY, MURPHY_I2C]);
        builder
    }

    /// Find-or-create the instance `id` and return its id.
    pub fn add(&mut self, id: &str, kind: ComponentKind) -> String {
        if self.instance(id).is_none() {
            let visible = VisibleComponent {
                id: id.to_string(),
                component: Component::new(kind),
            };
            self.components.push(JoinedComponent {
                id: id.to_string(),
                members: vec![visible],
            });
        }
        id.to_string()
    }

    pub fn instance(&self, id: &str) -> Option<&VisibleComponent> {
        self.components
            .iter()
            .flat_map(|j| j.members.iter())
            .find(|m| m.id == id)
    }

    /// Fuse instances into one layout node. Unknown ids are ignored.
    pub fn join(&mut self, ids: &[&str]) {
        let mut members = Vec::new();
        for id in ids {
            if let Some(pos) = self
                .components
                .iter()
                .position(|j| j.members.iter().any(|m| m.id == *id))
            {
                let joined = self.components.remove(pos);
                members.extend(joined.members);
            }
        }
        if members.is_empty() {
            return;
        }
        let id = members
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join("+");
        self.components.push(JoinedComponent { id, members });
    }

    pub fn port(&self, instance: &str, port: &str) -> Result<PortRef> {
        self.instance(instance)
            .ok_or_else(|| Error::UnknownComponent(instance.to_string()))?
            .port(port)
    }

    pub fn connect(&mut self, from: PortRef, to: PortRef, color: WireColor) {
        let id = format!("w{}", self.wires.len());
        self.wires.push(Wire {
            id,
            from,
            to,
            color,
        });
    }

    /// Resolve both ports, then connect them.
    pub fn wire(
        &mut self,
        (from, from_port): (&str, &str),
        (to, to_port): (&str, &str),
        color: WireColor,
    ) -> Result<()> {
        let a = self.port(from, from_port)?;
        let b = self.port(to, to_port)?;
        self.connect(a, b, color);
        Ok(())
    }

    /// Wire an I2C device to `bus`, on a multiplexer channel when one is given.
    pub fn connect_i2c(&mut self, bus: &str, device: &str, channel: Option<u8>) -> Result<()> {
        let prefix = channel.map(|c| format!("C{c}.")).unwrap_or_default();
        self.wire((device, "SDA"), (bus, &format!("{prefix}SDA")), WireColor::Sda)?;
        self.wire((device, "SCL"), (bus, &format!("{prefix}SCL")), WireColor::Scl)?;
        if channel.is_some() {
            self.wire((device, "VCC"), (bus, &format!("{prefix}VCC")), WireColor::Vcc)?;
            self.wire((device, "GND"), (bus, &format!("{prefix}GND")), WireColor::Gnd)?;
        } else {
            self.wire((device, "VCC"), (bus, "SDA.3V3"), WireColor::Vcc)?;
            self.wire((device, "GND"), (bus, "SDA.GND"), WireColor::Gnd)?;
        }
        Ok(())
    }

    pub fn components(&self) -> &[JoinedComponent] {
        &self.components
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Number of component instances across all joined nodes.
    pub fn instance_count(&self) -> usize {
        self.components.iter().map(|j| j.members.len()).sum()
    }
}
