//! Emission registry: the per-pass accumulator of includes, globals, setup
//! statements, library dependencies and pin reservations.
//!
//! Every section is keyed by a tag chosen by the generator (`servo_3`,
//! `io_13`, ...). Registering a tag a second time is a no-op unless the
//! caller asks to overwrite, so a generator may run any number of times for
//! the same piece of hardware and still produce one declaration.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::workspace::{BlockGraph, BlockId};

/// Setup tag that is always emitted last inside `setup()`.
pub const USER_SETUP_TAG: &str = "userSetupCode";

// ─── OnceMap ─────────────────────────────────────────────────────────────────

/// Insertion-ordered map whose entries are written once unless overwritten.
#[derive(Debug, Clone)]
pub struct OnceMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for OnceMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> OnceMap<V> {
    /// Insert `value` if `tag` is absent. Returns whether a write happened.
    pub fn insert_once(&mut self, tag: &str, value: V) -> bool {
        if self.entries.contains_key(tag) {
            return false;
        }
        self.entries.insert(tag.to_string(), value);
        true
    }

    /// Insert or replace; a replaced entry keeps its original position.
    pub fn upsert(&mut self, tag: &str, value: V) {
        self.entries.insert(tag.to_string(), value);
    }

    pub fn insert(&mut self, tag: &str, value: V, overwrite: bool) -> bool {
        if overwrite {
            self.upsert(tag, value);
            true
        } else {
            self.insert_once(tag, value)
        }
    }

    pub fn get(&self, tag: &str) -> Option<&V> {
        self.entries.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

// ─── Pins and libraries ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinType {
    Input,
    Output,
    Pwm,
    Servo,
    Stepper,
    Serial,
    I2c,
    Spi,
    LedStrip,
}

impl PinType {
    pub fn as_str(self) -> &'static str {
        match self {
            PinType::Input => "INPUT",
            PinType::Output => "OUTPUT",
            PinType::Pwm => "PWM",
            PinType::Servo => "SERVO",
            PinType::Stepper => "STEPPER",
            PinType::Serial => "SERIAL",
            PinType::I2c => "I2C/TWI",
            PinType::Spi => "SPI",
            PinType::LedStrip => "LEDSTRIP",
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arduino libraries the generated sketch needs, as `name@version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dependency {
    LeaphyExtensions,
    ArduinoBle,
    List,
    Servo,
    EspServo,
    AdafruitSsd1306Oled,
    AdafruitSh110xOled,
    AdafruitVl53l0xTof,
    AdafruitLsm6dsAccelerometer,
    AdafruitBmp280Bar,
    AdafruitSgp30Gas,
    SparkfunTmp102,
    FastLed,
    SparkfunVl53l5cx,
    Apds9960Rgb,
    Ds3231Rtc,
    PainlessMesh,
    AsyncTcp,
    TensorflowEsp32,
    Sd,
}

impl Dependency {
    pub fn id(self) -> &'static str {
        match self {
            Dependency::LeaphyExtensions => "Leaphy Extensions@1.2.1",
            Dependency::ArduinoBle => "ArduinoBLE@1.4.0",
            Dependency::List => "List@3.0.1",
            Dependency::Servo => "Servo@1.2.2",
            Dependency::EspServo => "ESP32Servo@3",
            Dependency::AdafruitSsd1306Oled => "Adafruit SSD1306@2.5",
            Dependency::AdafruitSh110xOled => "Adafruit SH110X@2.1.12",
            Dependency::AdafruitVl53l0xTof => "Adafruit_VL53L0X@1.2.4",
            Dependency::AdafruitLsm6dsAccelerometer => "Adafruit LSM6DS@4.7.4",
            Dependency::AdafruitBmp280Bar => "Adafruit BMP280 Library@2.6.8",
            Dependency::AdafruitSgp30Gas => "Adafruit SGP30 Sensor@2.0.3",
            Dependency::SparkfunTmp102 => "SparkFun TMP102 Breakout@1.1.2",
            Dependency::FastLed => "FastLED@3.10.3",
            Dependency::SparkfunVl53l5cx => "SparkFun VL53L5CX Arduino Library@1.0.3",
            Dependency::Apds9960Rgb => "Arduino_APDS9960@1.0.4",
            Dependency::Ds3231Rtc => "DS3231@1.1.2",
            Dependency::PainlessMesh => "painlessMesh@1.5.4",
            Dependency::AsyncTcp => "AsyncTCP@3.3.2",
            Dependency::TensorflowEsp32 => "TensorFlowLite_ESP32@1.0.0",
            Dependency::Sd => "SD@1.3.0",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Dependency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Declaration {
    priority: i32,
    code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    includes: OnceMap<String>,
    definitions: OnceMap<String>,
    declarations: OnceMap<Declaration>,
    /// `None` marks a setup tag that was deliberately suppressed.
    setups: OnceMap<Option<String>>,
    dependencies: IndexSet<Dependency>,
    pins: IndexMap<String, PinType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_include(&mut self, tag: &str, code: impl Into<String>) {
        self.includes.insert_once(tag, code.into());
    }

    pub fn add_definition(&mut self, tag: &str, code: impl Into<String>, overwrite: bool) {
        self.definitions.insert(tag, code.into(), overwrite);
    }

    /// Register a global declaration. Higher `priority` is emitted first.
    pub fn add_declaration(
        &mut self,
        tag: &str,
        code: impl Into<String>,
        overwrite: bool,
        priority: i32,
    ) {
        let decl = Declaration {
            priority,
            code: code.into(),
        };
        self.declarations.insert(tag, decl, overwrite);
    }

    /// Register a statement for `setup()`. Returns whether it was written.
    pub fn add_setup(&mut self, tag: &str, code: impl Into<String>, overwrite: bool) -> bool {
        self.setups.insert(tag, Some(code.into()), overwrite)
    }

    /// Keep `tag` out of `setup()` even if a later generator registers it.
    pub fn suppress_setup(&mut self, tag: &str) {
        self.setups.upsert(tag, None);
    }

    pub fn add_dependency(&mut self, deps: &[Dependency]) {
        self.dependencies.extend(deps.iter().copied());
    }

    pub fn setup(&self, tag: &str) -> Option<&str> {
        self.setups.get(tag).and_then(|s| s.as_deref())
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.iter().copied().collect()
    }

    pub fn pin_purpose(&self, pin: &str) -> Option<PinType> {
        self.pins.get(pin).copied()
    }

    /// Claim `pin` for `purpose` on behalf of `block`.
    ///
    /// The first claim is recorded. A later claim with a different purpose
    /// warns on the later block under `warning_tag` and leaves the record
    /// alone; a matching claim clears that warning.
    pub fn reserve_pin(
        &mut self,
        graph: &mut dyn BlockGraph,
        block: BlockId,
        pin: &str,
        purpose: PinType,
        warning_tag: &str,
    ) {
        match self.pins.get(pin) {
            Some(existing) if *existing != purpose => {
                let text = format!(
                    "Pin {pin} is needed for {warning_tag} as pin {purpose}. \
                     It is already used as {existing}."
                );
                graph.set_warning(block, Some(text), warning_tag);
            }
            _ => {
                self.pins.insert(pin.to_string(), purpose);
                graph.set_warning(block, None, warning_tag);
            }
        }
    }

    /// Assemble the sketch around the loop body.
    pub fn finish(&self, loop_code: &str) -> String {
        let mut sections: Vec<String> = Vec::new();

        let includes: Vec<&str> = self.includes.values().map(String::as_str).collect();
        if !includes.is_empty() {
            sections.push(includes.join("\n"));
        }
        let definitions: Vec<&str> = self
            .definitions
            .values()
            .map(|d| d.trim_end_matches('\n'))
            .collect();
        if !definitions.is_empty() {
            sections.push(definitions.join("\n"));
        }

        let mut declarations: Vec<&Declaration> = self.declarations.values().collect();
        // sort_by is stable, so equal priorities keep insertion order
        declarations.sort_by(|a, b| b.priority.cmp(&a.priority));
        if !declarations.is_empty() {
            let code: Vec<&str> = declarations
                .iter()
                .map(|d| d.code.trim_end_matches('\n'))
                .collect();
            sections.push(code.join("\n"));
        }

        let mut out = String::new();
        if !sections.is_empty() {
            out.push_str(&sections.join("\n\n"));
            out.push_str("\n\n");
        }

        out.push_str("void setup() {\n");
        let user_setup = self.setup(USER_SETUP_TAG);
        let setups = self
            .setups
            .iter()
            .filter(|(tag, _)| *tag != USER_SETUP_TAG)
            .filter_map(|(_, code)| code.as_deref())
            .chain(user_setup);
        for code in setups {
            let code = code.trim_end();
            if !code.is_empty() {
                out.push_str("  ");
                out.push_str(code);
                out.push('\n');
            }
        }
        out.push_str("}\n\n");

        out.push_str("void loop() {\n");
        out.push_str(&indent(loop_code, "  "));
        out.push_str("}\n");
        out
    }
}

/// Prefix every non-empty line with `prefix`, keeping a trailing newline.
pub fn indent(code: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str(prefix);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
