//! Arduino C++ generator.
//!
//! One `ArduinoGenerator` is built per pass. It runs type inference, walks
//! every top-level chain depth first and lets each block register includes,
//! globals, setup statements, pins and schematic components in its own
//! `Registry` and `ComponentBuilder`. Nothing outlives the pass.

mod actuators;
mod bluetooth;
mod display;
mod extensions;
mod i2c;
mod io;
mod ledstrip;
mod lists;
mod logic;
mod loops;
mod math;
mod mesh;
mod ml;
mod procedures;
mod program;
mod rtc;
mod sensors;
mod text;
mod variables;

pub use bluetooth::{decode_uuid, encode_uuid};

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::inference::{self, InferenceResult};
use crate::registry::{Dependency, PinType, Registry, indent};
use crate::schematic::ComponentBuilder;
use crate::workspace::{BlockGraph, BlockId, BlockKind};

use super::names::{ARDUINO_RESERVED, NameDb};
use super::{Code, Precedence, parenthesize, prefix_lines};

// ─── Order ───────────────────────────────────────────────────────────────────

/// C++ operator precedence, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Atomic,
    UnaryPostfix,
    UnaryPrefix,
    Multiplicative,
    Additive,
    Shift,
    Relational,
    Equality,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    Conditional,
    Assignment,
    Comma,
    UnaryNegation,
    Member,
    None,
}

impl Precedence for Order {
    fn rank(self) -> u8 {
        match self {
            Order::Atomic => 0,
            Order::UnaryPostfix => 1,
            Order::UnaryPrefix => 2,
            Order::Multiplicative => 3,
            Order::Additive => 4,
            Order::Shift => 5,
            Order::Relational => 6,
            Order::Equality => 7,
            Order::BitwiseAnd => 8,
            Order::BitwiseXor => 9,
            Order::BitwiseOr => 10,
            Order::LogicalAnd => 11,
            Order::LogicalOr => 12,
            Order::Conditional => 13,
            Order::Assignment => 14,
            Order::Comma => 15,
            Order::UnaryNegation => 16,
            Order::Member => 17,
            Order::None => 99,
        }
    }
}

pub type ArduinoCode = Code<Order>;

fn expr(code: impl Into<String>, order: Order) -> Result<ArduinoCode> {
    Ok(Code::Expr(code.into(), order))
}

fn stmt(code: impl Into<String>) -> Result<ArduinoCode> {
    Ok(Code::Statement(code.into()))
}

/// C string literal for `s`.
pub fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\n', "\\\n")
        .replace('$', "\\$")
        .replace('"', "\\\"")
        .replace('\'', "\\'");
    format!("\"{escaped}\"")
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Result of one Arduino pass.
#[derive(Debug, Clone)]
pub struct ArduinoOutput {
    pub code: String,
    pub dependencies: Vec<Dependency>,
    pub circuit: ComponentBuilder,
}

// ─── Generator ───────────────────────────────────────────────────────────────

pub struct ArduinoGenerator<'w> {
    graph: &'w mut dyn BlockGraph,
    config: &'w GeneratorConfig,
    registry: Registry,
    builder: ComponentBuilder,
    names: NameDb,
    types: InferenceResult,
}

impl<'w> ArduinoGenerator<'w> {
    pub fn new(graph: &'w mut dyn BlockGraph, config: &'w GeneratorConfig) -> Self {
        Self {
            graph,
            config,
            registry: Registry::new(),
            builder: ComponentBuilder::new(),
            names: NameDb::new(ARDUINO_RESERVED),
            types: InferenceResult::default(),
        }
    }

    /// Run the whole pass and assemble the sketch.
    pub fn generate(mut self) -> Result<ArduinoOutput> {
        tracing::debug!(robot = self.config.robot.as_str(), "arduino pass: init");
        self.init();

        tracing::debug!("arduino pass: walking top-level chains");
        let mut loop_code = String::new();
        for top in self.graph.top_blocks() {
            loop_code.push_str(&self.chain_to_code(Some(top))?);
        }

        tracing::debug!("arduino pass: finishing");
        let code = self.registry.finish(&loop_code);
        Ok(ArduinoOutput {
            code,
            dependencies: self.registry.dependencies(),
            circuit: self.builder,
        })
    }

    fn init(&mut self) {
        self.types = inference::infer(&mut *self.graph);

        let mut used = Vec::new();
        for kind in [BlockKind::VariablesGet, BlockKind::VariablesSet] {
            for block in self.graph.blocks_of_kind(kind) {
                used.push(self.field(block, "VAR"));
            }
        }
        let variables: Vec<(String, String)> = self
            .graph
            .variables()
            .items()
            .filter(|v| used.contains(&v.id))
            .map(|v| (v.id.clone(), v.name.clone()))
            .collect();
        if !variables.is_empty() {
            let lines: Vec<String> = variables
                .iter()
                .map(|(id, name)| {
                    let ty = self.types.variable(id);
                    let ident = self.names.get(&format!("var:{id}"), name);
                    format!("{} {ident} = {}", ty.arduino_type(), ty.arduino_default())
                })
                .collect();
            self.registry
                .add_definition("variables", format!("{};\n", lines.join(";\n")), false);
        }

        let lists: Vec<(String, String)> = self
            .graph
            .lists()
            .items()
            .map(|l| (l.id.clone(), l.ident()))
            .collect();
        if !lists.is_empty() {
            let lines: Vec<String> = lists
                .iter()
                .map(|(id, name)| {
                    let ty = self.types.list(id);
                    let ident = self.names.get(&format!("list:{id}"), name);
                    format!("List<{}> {ident}", ty.arduino_type())
                })
                .collect();
            self.registry
                .add_definition("lists", format!("{};\n", lines.join(";\n")), false);
            self.registry.add_include("lists", "#include <List.hpp>");
            self.registry.add_dependency(&[Dependency::List]);
        }

        self.add_serial();
    }

    // ── Tree walking ─────────────────────────────────────────────────────────

    fn block_to_code(&mut self, block: BlockId) -> Result<ArduinoCode> {
        use BlockKind::*;
        match self.graph.kind(block) {
            LeaphyStart => self.leaphy_start(block),
            TimeDelay => self.time_delay(block),
            SerialPrintLine => self.serial_print_line(block),
            SerialPrintValue => self.serial_print_value(block),
            SerialAvailable => self.serial_available(),
            SerialReadLine => self.serial_read_line(),

            ControlsIf => self.controls_if(block),
            LogicCompare => self.logic_compare(block),
            LogicOperation => self.logic_operation(block),
            LogicNegate => self.logic_negate(block),
            LogicBoolean => self.logic_boolean(block),
            LogicNull => expr("NULL", Order::Atomic),
            LogicTernary => self.logic_ternary(block),

            ControlsRepeatExt => self.controls_repeat_ext(block),
            ControlsRepeatForever => self.controls_repeat_forever(block),
            ControlsWhileUntil => self.controls_while_until(block),
            ControlsFor => self.controls_for(block),
            ControlsFlowStatements => self.controls_flow_statements(block),

            MathNumber => self.math_number(block),
            MathArithmetic => self.math_arithmetic(block),
            MathSingle => self.math_single(block),
            MathTrig => self.math_trig(block),
            MathConstant => self.math_constant(block),
            MathNumberProperty => self.math_number_property(block),
            MathRound => self.math_round(block),
            MathModulo => self.math_modulo(block),
            MathConstrain => self.math_constrain(block),
            MathRandomInt => self.math_random_int(block),
            MathRandomFloat => self.math_random_float(),

            Text => self.text(block),
            TextJoin => self.text_join(block),
            TextLength => self.text_length(block),
            TextCharAt => self.text_char_at(block),
            TextIncludes => self.text_includes(block),
            TextToDouble => self.text_to_double(block),

            VariablesGet => self.variables_get(block),
            VariablesSet => self.variables_set(block),

            ListsAdd => self.lists_add(block),
            ListsDelete => self.lists_delete(block),
            ListsClear => self.lists_clear(block),
            ListsInsert => self.lists_insert(block),
            ListsGet => self.lists_get(block),
            ListsReplace => self.lists_replace(block),
            ListsLength => self.lists_length(block),

            ProceduresDefNoReturn | ProceduresDefReturn => self.procedures_def(block),
            ProceduresCallNoReturn => self.procedures_call_no_return(block),
            ProceduresCallReturn => self.procedures_call_return(block),
            ProceduresIfReturn => self.procedures_if_return(block),

            DigitalRead => self.digital_read(block),
            AnalogRead => self.analog_read(block),
            DigitalWrite => self.digital_write(block),
            AnalogWrite => self.analog_write(block),
            MultiplexerDigitalWrite => self.multiplexer_digital_write(block),
            ServoWrite => self.servo_write(block),
            ServoRead => self.servo_read(block),
            SonarRead => self.sonar_read(block),

            OriginalSetLed => self.original_set_led(block),
            OriginalSetMotor | ClickSetMotor => self.original_set_motor(block),
            OriginalMoveMotors => self.original_move_motors(block),
            OriginalBuzz => self.original_buzz(block),
            OriginalServoSet => self.original_servo_set(block),
            OriginalServoMove => self.original_servo_move(block),

            LedSetStrip => self.led_set_strip(block),
            LedSetBasic => self.led_set_basic(block),
            LedSetSpeed => self.led_set_speed(block),
            LedStripDemo => self.led_strip_demo(block),

            I2cUseChannel => self.i2c_use_channel(block),
            TofGetDistance => self.tof_get_distance(block),
            RgbColor => self.rgb_color(block, false),
            RgbColorRaw => self.rgb_color(block, true),
            RgbRawColorRed => self.rgb_raw_channel(0),
            RgbRawColorGreen => self.rgb_raw_channel(1),
            RgbRawColorBlue => self.rgb_raw_channel(2),
            GasSensor => self.gas_sensor(block),

            SegmentInit => self.segment_init(block),
            MatrixInit => self.matrix_init(block),
            SoundInit => self.sound_init(block),

            I2cGesture | I2cRgbColor => self.unsupported(block),

            DisplayClear => self.display_clear(block, false),
            DisplaySetTextSize => self.display_set_text_size(block, false),
            DisplayPrintLine => self.display_print_line(block, false),
            DisplayPrintValue => self.display_print_value(block, false),
            DisplayDisplay => self.display_display(block, false),
            DisplayLargeClear => self.display_clear(block, true),
            DisplayLargeSetTextSize => self.display_set_text_size(block, true),
            DisplayLargePrintLine => self.display_print_line(block, true),
            DisplayLargePrintValue => self.display_print_value(block, true),
            DisplayLargeDisplay => self.display_display(block, true),

            MeshSetup => self.mesh_setup(block),
            MeshUpdate => stmt("mesh.update();\n"),
            MeshOnSignal => stmt(""),
            MeshCallSignal => self.mesh_call_signal(block),
            MeshBroadcastSignal => self.mesh_broadcast_signal(block),
            MeshSender => expr("node_sender", Order::Atomic),

            BleSetup => self.ble_setup(block),
            BleUpdate => self.ble_update(),
            BleIsPressed => self.ble_is_pressed(block),

            MlClassify => self.ml_classify(),
            MlCertainty => self.ml_certainty(block),

            RtcGet => self.rtc_get(block),
            RtcSet => self.rtc_set(block),
            RtcFormat => self.rtc_format(block),
        }
    }

    /// Code for a statement chain starting at `head`, comments included.
    fn chain_to_code(&mut self, head: Option<BlockId>) -> Result<String> {
        let mut out = String::new();
        let mut current = head;
        while let Some(block) = current {
            let code = match self.block_to_code(block)? {
                Code::Statement(code) => code,
                // A loose expression on the canvas still evaluates.
                Code::Expr(code, _) if !code.is_empty() => format!("{code};\n"),
                Code::Expr(..) => String::new(),
            };
            out.push_str(&self.comments(block));
            out.push_str(&code);
            current = self.graph.next(block);
        }
        Ok(out)
    }

    /// `// ` lines for the comment on `block` and on everything plugged into
    /// its value inputs. Inline blocks carry none of their own.
    fn comments(&self, block: BlockId) -> String {
        if self.graph.is_inline(block) {
            return String::new();
        }
        let mut out = String::new();
        if let Some(comment) = self.graph.comment(block) {
            out.push_str(&prefix_lines(comment, "// "));
        }
        for child in self.value_children(block) {
            for comment in self.nested_comments(child) {
                out.push_str(&prefix_lines(&comment, "// "));
            }
        }
        out
    }

    fn value_children(&self, block: BlockId) -> Vec<BlockId> {
        let kind = self.graph.kind(block);
        self.graph
            .block(block)
            .inputs
            .iter()
            .filter(|(name, _)| !kind.is_statement_input(name))
            .filter_map(|(_, input)| input.target)
            .collect()
    }

    fn nested_comments(&self, block: BlockId) -> Vec<String> {
        let mut out: Vec<String> = self.graph.comment(block).map(str::to_string).into_iter().collect();
        for child in self.value_children(block) {
            out.extend(self.nested_comments(child));
        }
        out
    }

    /// Expression plugged into `slot`, parenthesised for a context of `order`.
    /// An empty slot yields an empty string.
    fn value_to_code(&mut self, block: BlockId, slot: &str, order: Order) -> Result<String> {
        let Some(target) = self.graph.input_target(block, slot) else {
            return Ok(String::new());
        };
        match self.block_to_code(target)? {
            Code::Expr(code, inner) => Ok(parenthesize(code, inner, order)),
            Code::Statement(code) => {
                tracing::warn!(slot, "statement block plugged into a value slot");
                Ok(code.trim_end().to_string())
            }
        }
    }

    /// Like `value_to_code`, falling back to `default` for an empty slot.
    fn value_or(&mut self, block: BlockId, slot: &str, order: Order, default: &str) -> Result<String> {
        let code = self.value_to_code(block, slot, order)?;
        Ok(if code.is_empty() { default.to_string() } else { code })
    }

    /// The chain in statement `slot`, indented one level.
    fn statement_to_code(&mut self, block: BlockId, slot: &str) -> Result<String> {
        let head = self.graph.statement_target(block, slot);
        let code = self.chain_to_code(head)?;
        Ok(indent(&code, "  "))
    }

    fn field(&self, block: BlockId, name: &str) -> String {
        self.graph.field(block, name).unwrap_or_default().to_string()
    }

    /// Blocks that only exist for the MicroPython target.
    fn unsupported(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let kind = self.graph.kind(block);
        tracing::debug!(kind = kind.tag(), "no arduino rendition");
        self.warn(block, "arduino", Some(format!("{kind} is not available on Arduino")));
        expr("0", Order::Atomic)
    }

    fn warn(&mut self, block: BlockId, tag: &str, text: Option<String>) {
        self.graph.set_warning(block, text, tag);
    }

    fn reserve_pin(&mut self, block: BlockId, pin: &str, purpose: PinType, tag: &str) {
        self.registry
            .reserve_pin(&mut *self.graph, block, pin, purpose, tag);
    }

    // ── Shared registrations ─────────────────────────────────────────────────

    fn add_serial(&mut self) {
        let Some(program) = self.config.program.as_ref() else {
            self.registry
                .add_setup("serial", "Serial.begin(115200);", false);
            return;
        };

        let bytes: Vec<String> = program.iter().map(|b| format!("0x{b:02x}")).collect();
        self.registry.add_declaration(
            "program",
            format!("const unsigned char program[] PROGMEM = {{ {} }};", bytes.join(", ")),
            false,
            0,
        );
        let robot = self.config.robot.as_str();
        self.registry.add_declaration(
            "serial-check",
            format!(
                "bool checkSerial() {{\n  if (Serial.available() == 0) return true;\n  if (Serial.peek() != 0xff) return false;\n\n  \
                 Serial.print(F(\"leaphy_program [{robot}] (\"));\n  Serial.print(sizeof(program));\n  Serial.println(F(\")\"));\n  \
                 while (Serial.available() > 0) {{\n    Serial.read();\n  }}\n  delay(10);\n\n  \
                 // Send from flash in chunks so the serial buffer never overflows\n  \
                 const size_t CHUNK_SIZE = 64;\n  size_t programSize = sizeof(program);\n\n  \
                 for (size_t i = 0; i < programSize; i += CHUNK_SIZE) {{\n    \
                 size_t chunkSize = min(CHUNK_SIZE, programSize - i);\n    \
                 for (size_t j = 0; j < chunkSize; j++) {{\n      \
                 Serial.write(pgm_read_byte(&program[i + j]));\n    }}\n  }}\n  return false;\n}}"
            ),
            false,
            0,
        );

        if self.config.robot.is_esp32() {
            // The ESP32 does not reset on a new serial connection, so the
            // check runs from a task woken by the USB CDC receive event.
            self.registry.add_declaration(
                "serial-task",
                "TaskHandle_t serialTaskHandle = NULL;\nvoid updateSerial(void* parameter) {\n  while (true) {\n    \
                 ulTaskNotifyTake(pdTRUE, portMAX_DELAY);\n    checkSerial();\n  }\n}",
                false,
                0,
            );
            self.registry.add_declaration(
                "serial-event",
                "void onSerialEvent(void* event_handler_arg, esp_event_base_t event_base, int32_t event_id, void* event_data) {\n  \
                 if (event_id != ARDUINO_USB_CDC_RX_EVENT) return;\n\n  \
                 xTaskNotifyFromISR(serialTaskHandle, 0, eNoAction, NULL);\n}",
                false,
                0,
            );
            self.registry.add_setup(
                "serial",
                "Serial.begin(115200);\n  xTaskCreate(updateSerial, \"Task\", 2048, NULL, 1, &serialTaskHandle);\n  \
                 Serial.onEvent(onSerialEvent);",
                false,
            );
        } else {
            self.registry.add_setup(
                "serial",
                "Serial.begin(115200);\n  while (millis() < 100 && checkSerial()) {};",
                false,
            );
        }
    }

    fn include_servo_header(&mut self) {
        if self.config.robot.is_esp32() {
            self.registry.add_dependency(&[Dependency::EspServo]);
            self.registry.add_include("servo", "#include <ESP32Servo.h>");
        } else {
            self.registry.add_dependency(&[Dependency::Servo]);
            self.registry.add_include("servo", "#include <Servo.h>");
        }
    }

    /// Identifier of the user variable with editor id `id`.
    fn variable_name(&mut self, id: &str) -> String {
        let name = self
            .graph
            .variables()
            .item(id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| id.to_string());
        self.names.get(&format!("var:{id}"), &name)
    }
}

#[cfg(test)]
#[path = "../../../tests/rust/test_arduino.rs"]
mod tests;
