//! MicroPython generator for the blocks that have a MicroPython rendition.
//!
//! Same walk as the Arduino generator, with Python's precedence table,
//! `from X import a, b` imports merged per package and module-level
//! definitions in place of includes and declarations. Blocks without a
//! MicroPython rendition get a warning and emit nothing.

use std::fmt;

use indexmap::IndexMap;

use crate::error::Result;
use crate::registry::indent;
use crate::workspace::{BlockGraph, BlockId, BlockKind};

use super::names::{NameDb, PYTHON_RESERVED};
use super::{Code, Precedence, parenthesize, prefix_lines};

const INDENT: &str = "  ";

/// Python operator precedence, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Atomic,
    Collection,
    StringConversion,
    Member,
    FunctionCall,
    Exponentiation,
    UnarySign,
    Multiplicative,
    Additive,
    BitwiseShift,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    Relational,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    Conditional,
    Lambda,
    None,
}

impl Precedence for Order {
    fn rank(self) -> u8 {
        match self {
            Order::Atomic => 0,
            Order::Collection | Order::StringConversion => 10,
            Order::Member => 21,
            Order::FunctionCall => 22,
            Order::Exponentiation => 30,
            Order::UnarySign => 40,
            Order::Multiplicative => 50,
            Order::Additive => 60,
            Order::BitwiseShift => 70,
            Order::BitwiseAnd => 80,
            Order::BitwiseXor => 90,
            Order::BitwiseOr => 100,
            Order::Relational => 110,
            Order::LogicalNot => 120,
            Order::LogicalAnd => 130,
            Order::LogicalOr => 140,
            Order::Conditional => 150,
            Order::Lambda => 160,
            Order::None => 255,
        }
    }
}

pub type PythonCode = Code<Order>;

fn expr(code: impl Into<String>, order: Order) -> Result<PythonCode> {
    Ok(Code::Expr(code.into(), order))
}

fn stmt(code: impl Into<String>) -> Result<PythonCode> {
    Ok(Code::Statement(code.into()))
}

/// Python string literal for `s`.
pub fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\'', "\\'");
    format!("'{escaped}'")
}

/// How a board pin has been configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    DigitalIn,
    DigitalOut,
    Pwm,
    Adc,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PinMode::DigitalIn => "digital input",
            PinMode::DigitalOut => "digital output",
            PinMode::Pwm => "PWM output",
            PinMode::Adc => "analog input",
        })
    }
}

/// Channel label used in identifiers; `BC` is the bus without multiplexer.
fn channel_label(channel: Option<u8>) -> String {
    channel.map_or_else(|| "BC".to_string(), |c| c.to_string())
}

pub struct MicroPythonGenerator<'w> {
    graph: &'w mut dyn BlockGraph,
    imports: IndexMap<String, Vec<String>>,
    definitions: IndexMap<String, String>,
    pins: IndexMap<String, PinMode>,
    names: NameDb,
    /// Multiplexer channels of the enclosing `i2c_use_channel` blocks.
    channels: Vec<u8>,
}

impl<'w> MicroPythonGenerator<'w> {
    pub fn new(graph: &'w mut dyn BlockGraph) -> Self {
        Self {
            graph,
            imports: IndexMap::new(),
            definitions: IndexMap::new(),
            pins: IndexMap::new(),
            names: NameDb::new(PYTHON_RESERVED),
            channels: Vec::new(),
        }
    }

    pub fn generate(mut self) -> Result<String> {
        tracing::debug!("micropython pass: walking top-level chains");
        let mut code = String::new();
        for top in self.graph.top_blocks() {
            code.push_str(&self.chain_to_code(Some(top))?);
        }
        Ok(self.finish(&code))
    }

    /// Imports, then definitions, then the top-level code.
    fn finish(&self, code: &str) -> String {
        let mut sections = Vec::new();
        if !self.imports.is_empty() {
            let imports: Vec<String> = self
                .imports
                .iter()
                .map(|(package, members)| format!("from {package} import {}", members.join(", ")))
                .collect();
            sections.push(imports.join("\n"));
        }
        sections.extend(
            self.definitions
                .values()
                .map(|d| d.trim_end_matches('\n').to_string()),
        );
        if sections.is_empty() {
            return code.to_string();
        }
        format!("{}\n\n\n{code}", sections.join("\n\n"))
    }

    pub fn add_import(&mut self, package: &str, member: &str) {
        let members = self.imports.entry(package.to_string()).or_default();
        if !members.iter().any(|m| m == member) {
            members.push(member.to_string());
        }
    }

    /// Register a module-level definition; the first one under `tag` wins.
    pub fn add_definition(&mut self, tag: &str, code: impl Into<String>) {
        self.definitions
            .entry(tag.to_string())
            .or_insert_with(|| code.into());
    }

    // ── Tree walking ─────────────────────────────────────────────────────────

    fn block_to_code(&mut self, block: BlockId) -> Result<PythonCode> {
        use BlockKind::*;
        match self.graph.kind(block) {
            LeaphyStart => self.leaphy_start(block),
            TimeDelay => self.time_delay(block),
            SerialPrintLine => {
                let value = self.value_or(block, "VALUE", Order::None, "None")?;
                stmt(format!("print({value})\n"))
            }

            ControlsRepeatForever => {
                let branch = self.statement_to_code(block, "DO")?;
                stmt(format!("while True:\n{branch}"))
            }
            ControlsRepeatExt => self.controls_repeat_ext(block),
            ControlsWhileUntil => self.controls_while_until(block),
            ControlsIf => self.controls_if(block),

            LogicBoolean => {
                let value = if self.field(block, "BOOL") == "TRUE" { "True" } else { "False" };
                expr(value, Order::Atomic)
            }
            LogicNull => expr("None", Order::Atomic),
            LogicCompare => self.logic_compare(block),
            LogicOperation => self.logic_operation(block),
            LogicNegate => {
                let value = self.value_or(block, "BOOL", Order::LogicalNot, "True")?;
                expr(format!("not {value}"), Order::LogicalNot)
            }

            MathNumber => self.math_number(block),
            MathArithmetic => self.math_arithmetic(block),

            Text => expr(quote(&self.field(block, "TEXT")), Order::Atomic),
            TextJoin => {
                let left = self.value_or(block, "ADD0", Order::None, "''")?;
                let right = self.value_or(block, "ADD1", Order::None, "''")?;
                expr(format!("str({left}) + str({right})"), Order::Additive)
            }
            TextIncludes => {
                let haystack = self.value_or(block, "VALUE", Order::Relational, "''")?;
                let needle = self.value_or(block, "CHECK", Order::Relational, "''")?;
                expr(format!("{needle} in {haystack}"), Order::Relational)
            }
            TextToDouble => {
                let value = self.value_or(block, "VALUE", Order::None, "0")?;
                expr(format!("float({value})"), Order::FunctionCall)
            }

            VariablesGet => {
                let id = self.field(block, "VAR");
                expr(self.variable_name(&id), Order::Atomic)
            }
            VariablesSet => {
                let id = self.field(block, "VAR");
                let value = self.value_or(block, "VALUE", Order::None, "0")?;
                let name = self.variable_name(&id);
                stmt(format!("{name} = {value}\n"))
            }

            DigitalWrite => self.digital_write(block),
            AnalogWrite => self.analog_write(block),
            DigitalRead => self.digital_read(block),
            AnalogRead => self.analog_read(block),
            SonarRead => self.sonar_read(block),

            I2cUseChannel => self.i2c_use_channel(block),
            TofGetDistance => self.tof_get_distance(),
            I2cGesture => self.i2c_gesture(),
            I2cRgbColor => self.i2c_rgb_color(block),

            DisplayClear => {
                let oled = self.oled();
                stmt(format!("{oled}.fill(0)\n"))
            }
            DisplayPrintLine => self.display_print_line(block),
            DisplayPrintValue => self.display_print_value(block),
            DisplayDisplay => {
                let oled = self.oled();
                stmt(format!("{oled}.show()\n"))
            }

            OriginalSetMotor => self.set_motor(block),

            kind => self.unsupported(block, kind),
        }
    }

    fn unsupported(&mut self, block: BlockId, kind: BlockKind) -> Result<PythonCode> {
        tracing::debug!(kind = kind.tag(), "no micropython rendition");
        self.graph.set_warning(
            block,
            Some(format!("{} is not available in MicroPython", kind.tag())),
            "micropython",
        );
        if kind.is_value() {
            expr("None", Order::Atomic)
        } else {
            stmt("")
        }
    }

    fn chain_to_code(&mut self, head: Option<BlockId>) -> Result<String> {
        let mut out = String::new();
        let mut current = head;
        while let Some(block) = current {
            let code = match self.block_to_code(block)? {
                Code::Statement(code) => code,
                Code::Expr(code, _) if !code.is_empty() => format!("{code}\n"),
                Code::Expr(..) => String::new(),
            };
            if !self.graph.is_inline(block)
                && let Some(comment) = self.graph.comment(block)
            {
                out.push_str(&prefix_lines(comment, "# "));
            }
            out.push_str(&code);
            current = self.graph.next(block);
        }
        Ok(out)
    }

    fn value_to_code(&mut self, block: BlockId, slot: &str, order: Order) -> Result<String> {
        let Some(target) = self.graph.input_target(block, slot) else {
            return Ok(String::new());
        };
        Ok(match self.block_to_code(target)? {
            Code::Expr(code, inner) => parenthesize(code, inner, order),
            Code::Statement(code) => code.trim_end().to_string(),
        })
    }

    fn value_or(&mut self, block: BlockId, slot: &str, order: Order, default: &str) -> Result<String> {
        let code = self.value_to_code(block, slot, order)?;
        Ok(if code.is_empty() { default.to_string() } else { code })
    }

    /// The chain in `slot`, indented one level; `pass` when empty.
    fn statement_to_code(&mut self, block: BlockId, slot: &str) -> Result<String> {
        let head = self.graph.statement_target(block, slot);
        let code = self.chain_to_code(head)?;
        if code.trim().is_empty() {
            return Ok(format!("{INDENT}pass\n"));
        }
        Ok(indent(&code, INDENT))
    }

    fn field(&self, block: BlockId, name: &str) -> String {
        self.graph.field(block, name).unwrap_or_default().to_string()
    }

    fn variable_name(&mut self, id: &str) -> String {
        let name = self
            .graph
            .variables()
            .item(id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| id.to_string());
        let ident = self.names.get(&format!("var:{id}"), &name);
        self.definitions
            .entry(format!("var:{id}"))
            .or_insert_with(|| format!("{ident} = None"));
        ident
    }

    /// Names of every variable declared so far, for `global` statements.
    fn globals(&self) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|(tag, _)| tag.starts_with("var:"))
            .filter_map(|(_, code)| code.split(" = ").next().map(str::to_string))
            .collect()
    }

    // ── Program structure ────────────────────────────────────────────────────

    fn leaphy_start(&mut self, block: BlockId) -> Result<PythonCode> {
        let branch = self.statement_to_code(block, "STACK")?;
        let globals = self.globals();
        let globals = if globals.is_empty() {
            String::new()
        } else {
            format!("{INDENT}global {}\n", globals.join(", "))
        };
        self.add_definition(
            "leaphy_program",
            format!("def leaphy_program():\n{globals}{branch}"),
        );
        stmt("leaphy_program()\n")
    }

    /// `utime` offers `sleep(seconds)` and `sleep_ms(ms)`; some ports reject
    /// a float for `sleep`, so only whole seconds use it.
    fn time_delay(&mut self, block: BlockId) -> Result<PythonCode> {
        let ms = self.value_or(block, "DELAY_TIME_MILI", Order::None, "0")?;
        match ms.parse::<i64>() {
            Ok(ms) if ms % 1000 == 0 => {
                self.add_import("utime", "sleep");
                stmt(format!("sleep({})\n", ms / 1000))
            }
            _ => {
                self.add_import("utime", "sleep_ms");
                stmt(format!("sleep_ms({ms})\n"))
            }
        }
    }

    fn controls_repeat_ext(&mut self, block: BlockId) -> Result<PythonCode> {
        let times = self.value_or(block, "TIMES", Order::None, "0")?;
        let times = if times.parse::<i64>().is_ok() {
            times
        } else {
            format!("int({times})")
        };
        let counter = self
            .names
            .get(&format!("loop:{}", block.0), "count");
        let branch = self.statement_to_code(block, "DO")?;
        stmt(format!("for {counter} in range({times}):\n{branch}"))
    }

    fn controls_while_until(&mut self, block: BlockId) -> Result<PythonCode> {
        let until = self.field(block, "MODE") == "UNTIL";
        let order = if until { Order::LogicalNot } else { Order::None };
        let cond = self.value_or(block, "BOOL", order, "False")?;
        let cond = if until { format!("not {cond}") } else { cond };
        let branch = self.statement_to_code(block, "DO")?;
        stmt(format!("while {cond}:\n{branch}"))
    }

    fn controls_if(&mut self, block: BlockId) -> Result<PythonCode> {
        let mut code = String::new();
        let mut n = 0;
        while n == 0 || self.graph.input_target(block, &format!("IF{n}")).is_some() {
            let cond = self.value_or(block, &format!("IF{n}"), Order::None, "False")?;
            let branch = self.statement_to_code(block, &format!("DO{n}"))?;
            let keyword = if n == 0 { "if" } else { "elif" };
            code.push_str(&format!("{keyword} {cond}:\n{branch}"));
            n += 1;
        }
        if self.graph.statement_target(block, "ELSE").is_some() {
            let branch = self.statement_to_code(block, "ELSE")?;
            code.push_str(&format!("else:\n{branch}"));
        }
        stmt(code)
    }

    fn logic_compare(&mut self, block: BlockId) -> Result<PythonCode> {
        let op = match self.field(block, "OP").as_str() {
            "NEQ" => "!=",
            "LT" => "<",
            "LTE" => "<=",
            "GT" => ">",
            "GTE" => ">=",
            _ => "==",
        };
        // Comparisons chain in Python, so a nested comparison always keeps its parentheses.
        let a = self.value_or(block, "A", Order::BitwiseOr, "0")?;
        let b = self.value_or(block, "B", Order::BitwiseOr, "0")?;
        expr(format!("{a} {op} {b}"), Order::Relational)
    }

    fn logic_operation(&mut self, block: BlockId) -> Result<PythonCode> {
        let (op, order, neutral) = if self.field(block, "OP") == "OR" {
            ("or", Order::LogicalOr, "False")
        } else {
            ("and", Order::LogicalAnd, "True")
        };
        let a = self.value_or(block, "A", order, neutral)?;
        let b = self.value_or(block, "B", order, neutral)?;
        expr(format!("{a} {op} {b}"), order)
    }

    fn math_number(&mut self, block: BlockId) -> Result<PythonCode> {
        let raw = self.field(block, "NUM");
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(v) if v == f64::INFINITY => expr("float('inf')", Order::FunctionCall),
            Ok(v) if v == f64::NEG_INFINITY => expr("float('-inf')", Order::FunctionCall),
            Ok(v) if v < 0.0 => expr(raw, Order::UnarySign),
            Ok(_) => expr(raw, Order::Atomic),
            Err(_) => expr("0", Order::Atomic),
        }
    }

    fn math_arithmetic(&mut self, block: BlockId) -> Result<PythonCode> {
        // `**` groups to the right, the other operators to the left.
        let (op, order, left, right) = match self.field(block, "OP").as_str() {
            "MINUS" => ("-", Order::Additive, Order::Additive, Order::Multiplicative),
            "MULTIPLY" => ("*", Order::Multiplicative, Order::Multiplicative, Order::UnarySign),
            "DIVIDE" => ("/", Order::Multiplicative, Order::Multiplicative, Order::UnarySign),
            "POWER" => ("**", Order::Exponentiation, Order::FunctionCall, Order::Exponentiation),
            _ => ("+", Order::Additive, Order::Additive, Order::Additive),
        };
        let a = self.value_or(block, "A", left, "0")?;
        let b = self.value_or(block, "B", right, "0")?;
        expr(format!("{a} {op} {b}"), order)
    }

    // ── Pins ─────────────────────────────────────────────────────────────────

    /// Configure `pin` for `mode`, declaring its object on first use.
    /// Returns `false` when the pin is already configured differently.
    fn reserve_pin(&mut self, pin: &str, mode: PinMode) -> bool {
        match self.pins.get(pin) {
            Some(existing) => return *existing == mode,
            None => {
                self.pins.insert(pin.to_string(), mode);
            }
        }
        let lower = pin.to_lowercase();
        self.add_import("machine", "Pin");
        let (tag, code) = match mode {
            PinMode::DigitalIn => (format!("pin_{lower}"), format!("pin_{lower} = Pin(\"{pin}\", Pin.IN)")),
            PinMode::DigitalOut => (format!("pin_{lower}"), format!("pin_{lower} = Pin(\"{pin}\", Pin.OUT)")),
            PinMode::Pwm => {
                self.add_import("machine", "PWM");
                (format!("pwm_{lower}"), format!("pwm_{lower} = PWM(Pin(\"{pin}\"))"))
            }
            PinMode::Adc => {
                self.add_import("machine", "ADC");
                (format!("adc_{lower}"), format!("adc_{lower} = ADC(Pin(\"{pin}\"))"))
            }
        };
        self.add_definition(&tag, code);
        true
    }

    /// Reserve `pin` or warn on `block`. Returns whether the pin is usable.
    fn claim_pin(&mut self, block: BlockId, pin: &str, mode: PinMode, usage: &str) -> bool {
        if self.reserve_pin(pin, mode) {
            self.graph.set_warning(block, None, "pin");
            return true;
        }
        let existing = self.pins.get(pin).copied().unwrap_or(mode);
        self.graph.set_warning(
            block,
            Some(format!(
                "Pin {pin} cannot be used for {usage}, it is already used as {existing}"
            )),
            "pin",
        );
        false
    }

    fn pin_field(&self, block: BlockId, default: &str) -> String {
        self.graph
            .field(block, "PIN")
            .filter(|p| !p.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    fn digital_write(&mut self, block: BlockId) -> Result<PythonCode> {
        let pin = self.pin_field(block, "D2");
        let value = self.value_or(block, "STATE", Order::None, "False")?;
        if !self.claim_pin(block, &pin, PinMode::DigitalOut, "digital write") {
            return stmt("");
        }
        stmt(format!("pin_{}.value({value})\n", pin.to_lowercase()))
    }

    fn analog_write(&mut self, block: BlockId) -> Result<PythonCode> {
        let pin = self.pin_field(block, "D2");
        let value = self.value_or(block, "NUM", Order::None, "0")?;
        if !self.claim_pin(block, &pin, PinMode::Pwm, "PWM") {
            return stmt("");
        }
        stmt(format!("pwm_{}.duty_u16({value})\n", pin.to_lowercase()))
    }

    fn digital_read(&mut self, block: BlockId) -> Result<PythonCode> {
        let pin = self.pin_field(block, "D2");
        if !self.claim_pin(block, &pin, PinMode::DigitalIn, "digital read") {
            return expr("None", Order::Atomic);
        }
        expr(format!("pin_{}.value()", pin.to_lowercase()), Order::FunctionCall)
    }

    fn analog_read(&mut self, block: BlockId) -> Result<PythonCode> {
        let pin = self.pin_field(block, "A0");
        if !self.claim_pin(block, &pin, PinMode::Adc, "analog read") {
            return expr("None", Order::Atomic);
        }
        expr(format!("adc_{}.read_u16()", pin.to_lowercase()), Order::FunctionCall)
    }

    fn sonar_read(&mut self, block: BlockId) -> Result<PythonCode> {
        self.add_import("leaphymicropython.sensors.sonar", "read_distance");
        let pin = |name: &str, default: &str| match self.graph.field(block, name) {
            Some(p) if !p.is_empty() && p != "DEFAULT" => p.to_string(),
            _ => default.to_string(),
        };
        let (trig, echo) = (pin("TRIG_PIN", "A3"), pin("ECHO_PIN", "A2"));
        expr(format!("read_distance(\"{trig}\",\"{echo}\")"), Order::FunctionCall)
    }

    // ── I2C ──────────────────────────────────────────────────────────────────

    fn add_i2c_support(&mut self, multiplexer: bool) {
        self.add_import("leaphymicropython.utils.i2c_helper", "select_channel");
        self.add_import("machine", "I2C");
        self.add_definition("i2c_object", "I2C_CONNECTION = I2C(0)");
        if multiplexer {
            self.add_definition("const_multiplexer_address", "MULTIPLEXER_ADDRESS = 0x70");
        }
    }

    fn current_channel(&self) -> Option<u8> {
        self.channels.last().copied()
    }

    /// The channel body is emitted in place; devices inside it bind to the
    /// channel through their constructors.
    fn i2c_use_channel(&mut self, block: BlockId) -> Result<PythonCode> {
        let Ok(channel) = self.field(block, "CHANNEL").parse::<u8>() else {
            tracing::warn!("i2c channel block without a valid channel");
            return stmt("");
        };
        self.channels.push(channel);
        let head = self.graph.statement_target(block, "DO");
        let code = self.chain_to_code(head);
        self.channels.pop();
        stmt(code?)
    }

    fn tof_get_distance(&mut self) -> Result<PythonCode> {
        let label = channel_label(self.current_channel());
        let name = format!("TOF_{label}");
        let address = self.current_channel().map_or(255, u32::from);
        self.add_i2c_support(false);
        self.add_import("leaphymicropython.sensors.tof", "TimeOfFlight");
        self.add_definition(
            &format!("channel{label}obj"),
            format!("{name} = TimeOfFlight({address})\n{name}.initialize_device()"),
        );
        expr(format!("{name}.get_distance()"), Order::FunctionCall)
    }

    /// Register the APDS-9960 on the current channel. Returns the channel
    /// label and the sensor's name.
    fn adps(&mut self) -> (String, String) {
        let label = channel_label(self.current_channel());
        let name = format!("ADPS_{label}");
        let args = self
            .current_channel()
            .map(|c| format!("channel = {c}"))
            .unwrap_or_default();
        self.add_i2c_support(false);
        self.add_import("leaphymicropython.sensors.adps9960", "ADPS_9960");
        self.add_definition(
            &format!("channel{label}adps"),
            format!("{name} = ADPS_9960({args})\n{name}.begin()"),
        );
        (label, name)
    }

    fn i2c_gesture(&mut self) -> Result<PythonCode> {
        let (label, name) = self.adps();
        self.add_import("leaphymicropython.sensors.adps9960", "GESTURE_NONE");
        self.add_definition(
            &format!("channel{label}gesturebuffer"),
            format!("last_gesture_{label} = GESTURE_NONE"),
        );
        // The sensor only reports a gesture once, so the last one is kept.
        self.add_definition(
            &format!("channel{label}gesture"),
            format!(
                "def gesture_{label}():\n  global last_gesture_{label}\n  \
                 if {name}.gesture_available():\n    last_gesture_{label} = {name}.read_gesture()\n  \
                 return last_gesture_{label}"
            ),
        );
        expr(format!("gesture_{label}()"), Order::FunctionCall)
    }

    fn i2c_rgb_color(&mut self, block: BlockId) -> Result<PythonCode> {
        let (label, name) = self.adps();
        let channel = self.field(block, "COLOR_TYPE");
        self.add_definition(
            &format!("channel{label}colorbuffer"),
            format!("last_color_{label} = (0, 0, 0, 0)"),
        );
        self.add_definition(
            &format!("channel{label}color"),
            format!(
                "def color_{label}(channel):\n  global last_color_{label}\n  \
                 if {name}.color_available():\n    last_color_{label} = {name}.read_color()\n  \
                 return last_color_{label}[channel]"
            ),
        );
        expr(format!("color_{label}({channel})"), Order::FunctionCall)
    }

    /// Register the small OLED on the current channel and return its name.
    fn oled(&mut self) -> String {
        let label = channel_label(self.current_channel());
        let address = self.current_channel().map_or(255, u32::from);
        self.add_i2c_support(true);
        self.add_import("leaphymicropython.actuators", "ssd1306");
        self.add_definition(
            "smalldisplaysize",
            "SMALL_OLED_WIDTH = 128\nSMALL_OLED_HEIGHT = 64",
        );
        // The display driver does not switch channels itself.
        self.add_definition(
            &format!("channel{label}oled"),
            format!(
                "select_channel(I2C_CONNECTION, MULTIPLEXER_ADDRESS, {address})\n\
                 SMALL_OLED_{label} = ssd1306.SSD1306I2C(SMALL_OLED_WIDTH, SMALL_OLED_HEIGHT, I2C_CONNECTION)\n\
                 SMALL_OLED_{label}.initialize_device()"
            ),
        );
        format!("SMALL_OLED_{label}")
    }

    fn display_row(&self, block: BlockId) -> i64 {
        self.graph
            .field(block, "DISPLAY_ROW")
            .and_then(|r| r.parse::<i64>().ok())
            .unwrap_or(0)
            * 8
    }

    fn display_print_line(&mut self, block: BlockId) -> Result<PythonCode> {
        let oled = self.oled();
        let value = self.value_or(block, "VALUE", Order::None, "''")?;
        let y = self.display_row(block);
        stmt(format!("{oled}.text(str({value}), 0, {y})\n"))
    }

    fn display_print_value(&mut self, block: BlockId) -> Result<PythonCode> {
        let oled = self.oled();
        let name = self.value_or(block, "NAME", Order::None, "''")?;
        let value = self.value_or(block, "VALUE", Order::None, "''")?;
        let y = self.display_row(block);
        stmt(format!(
            "{oled}.text(str({name}) + ' = ' + str({value}), 0, {y})\n"
        ))
    }

    // ── Motors ───────────────────────────────────────────────────────────────

    fn set_motor(&mut self, block: BlockId) -> Result<PythonCode> {
        let right = self.field(block, "MOTOR_TYPE") == "10";
        let speed = self.value_or(block, "MOTOR_SPEED", Order::None, "100")?;
        let (side, direction_pin, pwm_pin) = if right {
            ("right", "D2", "D3")
        } else {
            ("left", "D4", "D11")
        };

        self.add_import("leaphymicropython.actuators.dcmotor", "DCMotor");
        self.add_definition(
            "set_motor_speed",
            "def set_motor_speed(motor, speed):\n  if speed >= 0:\n    motor.forward(speed)\n  else:\n    motor.backward(-speed)",
        );
        let motor = format!("motor_{side}");
        self.add_definition(
            &motor,
            format!("{motor} = DCMotor(direction_pin=\"{direction_pin}\", pwn_pin=\"{pwm_pin}\")"),
        );
        stmt(format!("set_motor_speed({motor}, {speed})\n"))
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_python.rs"]
mod tests;
