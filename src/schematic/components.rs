//! Catalog of the hardware components generators can place in a schematic.
//!
//! Each component is an SVG asset plus a map from port name to the id of the
//! element inside the asset that marks where a wire attaches.

use indexmap::IndexMap;

/// Port mappings for a numbered run of connectors.
///
/// Produces `prefix + pin + suffix → connector{n}pin` for every pin from
/// `start` to `end` inclusive, counting down when `start > end`, with the
/// connector number increasing from `start_connector`.
pub fn mapping_in_range(
    prefix: &str,
    suffix: &str,
    start: i32,
    end: i32,
    start_connector: u32,
) -> IndexMap<String, String> {
    let mut result = IndexMap::new();
    let step = if start > end { -1 } else { 1 };
    let mut pin = start;
    let mut connector = start_connector;
    loop {
        result.insert(
            format!("{prefix}{pin}{suffix}"),
            format!("connector{connector}pin"),
        );
        connector += 1;
        if pin == end {
            break;
        }
        pin += step;
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Murphy,
    MurphyI2c,
    Servo,
    LineSensor,
    LightSensor,
    RgbFlitz,
    Tof,
    Ultrasonic,
    Gas,
}

/// A component definition: asset name and port → element id mappings.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub kind: ComponentKind,
    pub schema: &'static str,
    pub mappings: IndexMap<String, String>,
}

impl Component {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            schema: kind.schema(),
            mappings: kind.mappings(),
        }
    }

    pub fn has_port(&self, port: &str) -> bool {
        self.mappings.contains_key(port)
    }
}

fn fixed(pairs: &[(&str, u32)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(port, n)| (port.to_string(), format!("connector{n}pin")))
        .collect()
}

/// Board pins are addressable as `D12` and as plain `12`, each with
/// `.3V3` and `.GND` companions on the adjacent header rows.
fn murphy_mappings() -> IndexMap<String, String> {
    let mut m = IndexMap::new();
    for prefix in ["D", ""] {
        m.extend(mapping_in_range(prefix, "", 12, 2, 30));
        m.extend(mapping_in_range(prefix, ".3V3", 12, 2, 15));
        m.extend(mapping_in_range(prefix, ".GND", 12, 2, 0));
    }
    m.extend(mapping_in_range("A", "", 0, 7, 78));
    m.extend(mapping_in_range("A", ".3V3", 0, 7, 93));
    m.extend(mapping_in_range("A", ".GND", 0, 7, 108));
    for prefix in ["D", ""] {
        m.extend(mapping_in_range(prefix, "", 14, 19, 78));
        m.extend(mapping_in_range(prefix, ".3V3", 14, 19, 93));
        m.extend(mapping_in_range(prefix, ".GND", 14, 19, 108));
    }
    for prefix in ["D13", "13"] {
        m.extend(fixed(&[
            (prefix, 75),
            (format!("{prefix}.3V3").as_str(), 90),
            (format!("{prefix}.GND").as_str(), 105),
        ]));
    }
    m.extend(fixed(&[
        ("SDA", 82),
        ("SDA.3V3", 97),
        ("SDA.GND", 112),
        ("SCL", 83),
        ("SCL.3V3", 98),
        ("SCL.GND", 113),
        ("5V", 86),
        ("5V.3V3", 101),
        ("5V.GND", 116),
        ("3V3", 76),
        ("3V3.3V3", 91),
        ("3V3.GND", 106),
        ("GND", 41),
        ("GND.3V3", 26),
        ("GND.GND", 11),
        ("GND2", 88),
        ("GND2.3V3", 103),
        ("GND2.GND", 118),
    ]));
    m
}

fn murphy_i2c_mappings() -> IndexMap<String, String> {
    let mut m = IndexMap::new();
    m.extend(mapping_in_range("C", ".GND", 3, 0, 0));
    m.extend(mapping_in_range("C", ".VCC", 3, 0, 4));
    m.extend(mapping_in_range("C", ".SCL", 3, 0, 8));
    m.extend(mapping_in_range("C", ".SDA", 3, 0, 12));
    m.extend(mapping_in_range("C", ".SDA", 4, 7, 32));
    m.extend(mapping_in_range("C", ".SCL", 4, 7, 36));
    m.extend(mapping_in_range("C", ".VCC", 4, 7, 40));
    m.extend(mapping_in_range("C", ".GND", 4, 7, 44));
    m.extend(fixed(&[("GND", 28), ("ECHO", 29), ("TRIG", 30), ("VCC", 31)]));
    m
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Murphy,
        ComponentKind::MurphyI2c,
        ComponentKind::Servo,
        ComponentKind::LineSensor,
        ComponentKind::LightSensor,
        ComponentKind::RgbFlitz,
        ComponentKind::Tof,
        ComponentKind::Ultrasonic,
        ComponentKind::Gas,
    ];

    pub fn schema(self) -> &'static str {
        match self {
            ComponentKind::Murphy => "murphy.svg",
            ComponentKind::MurphyI2c => "murphy-i2c.svg",
            ComponentKind::Servo => "servo.svg",
            ComponentKind::LineSensor => "line-sensor.svg",
            ComponentKind::LightSensor => "light-sensor.svg",
            ComponentKind::RgbFlitz => "rgb-flitz.svg",
            ComponentKind::Tof => "tof.svg",
            ComponentKind::Ultrasonic => "ultrasonic.svg",
            ComponentKind::Gas => "gas.svg",
        }
    }

    pub fn mappings(self) -> IndexMap<String, String> {
        match self {
            ComponentKind::Murphy => murphy_mappings(),
            ComponentKind::MurphyI2c => murphy_i2c_mappings(),
            ComponentKind::Servo => fixed(&[("pulse", 0), ("vcc", 1), ("gnd", 2)]),
            ComponentKind::LineSensor => fixed(&[("Out", 0), ("3V3", 1), ("GND", 2)]),
            ComponentKind::LightSensor => fixed(&[("Out", 0), ("VCC", 1), ("GND", 2)]),
            ComponentKind::RgbFlitz => fixed(&[("R", 0), ("G", 1), ("B", 2), ("GND", 3)]),
            ComponentKind::Tof | ComponentKind::Gas => {
                fixed(&[("VCC", 0), ("GND", 1), ("SCL", 2), ("SDA", 3)])
            }
            ComponentKind::Ultrasonic => {
                fixed(&[("VCC", 0), ("TRIG", 1), ("ECHO", 2), ("GND", 3)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_counts_down() {
        let m = mapping_in_range("D", ".GND", 12, 10, 0);
        let pairs: Vec<(&str, &str)> = m.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("D12.GND", "connector0pin"),
                ("D11.GND", "connector1pin"),
                ("D10.GND", "connector2pin"),
            ]
        );
    }

    #[test]
    fn test_single_pin_range() {
        let m = mapping_in_range("A", "", 3, 3, 7);
        assert_eq!(m.get("A3").map(String::as_str), Some("connector7pin"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_murphy_aliases() {
        let murphy = Component::new(ComponentKind::Murphy);
        assert_eq!(murphy.mappings["D13"], "connector75pin");
        assert_eq!(murphy.mappings["13.GND"], "connector105pin");
        assert_eq!(murphy.mappings["D2"], murphy.mappings["2"]);
        assert_eq!(murphy.mappings["A0"], "connector78pin");
        assert_eq!(murphy.mappings["SDA.3V3"], "connector97pin");
    }

    #[test]
    fn test_multiplexer_channels() {
        let mux = Component::new(ComponentKind::MurphyI2c);
        assert_eq!(mux.mappings["C3.GND"], "connector0pin");
        assert_eq!(mux.mappings["C0.SDA"], "connector15pin");
        assert_eq!(mux.mappings["C4.SDA"], "connector32pin");
        assert_eq!(mux.mappings["C7.GND"], "connector47pin");
    }
}
