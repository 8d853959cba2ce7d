//! Block kinds and value types.
//!
//! Every block type tag the generators understand is a `BlockKind` variant.
//! Loading a workspace with any other tag fails, and the generator dispatch
//! matches exhaustively on this enum.

use std::fmt;

// ─── ValueType ───────────────────────────────────────────────────────────────

/// Type constraint carried on block outputs and value inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    Boolean,
    String,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Number => "Number",
            ValueType::Boolean => "Boolean",
            ValueType::String => "String",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Number" => Some(ValueType::Number),
            "Boolean" => Some(ValueType::Boolean),
            "String" => Some(ValueType::String),
            _ => None,
        }
    }

    /// C++ type used when declaring a global of this type.
    pub fn arduino_type(self) -> &'static str {
        match self {
            ValueType::Number => "double",
            ValueType::Boolean => "boolean",
            ValueType::String => "String",
        }
    }

    /// Initial value for a global of this type.
    pub fn arduino_default(self) -> &'static str {
        match self {
            ValueType::Number => "0",
            ValueType::Boolean => "false",
            ValueType::String => "\"\"",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Connection shape of a block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Chained statement block (previous/next connections).
    Statement,
    /// Expression block with an optional initial output check.
    Value(Option<ValueType>),
}

// ─── BlockKind ───────────────────────────────────────────────────────────────

macro_rules! block_kinds {
    ($($variant:ident => $tag:literal : $output:expr),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BlockKind {
            $($variant),*
        }

        impl BlockKind {
            pub const ALL: &'static [BlockKind] = &[$(BlockKind::$variant),*];

            pub fn tag(self) -> &'static str {
                match self {
                    $(BlockKind::$variant => $tag),*
                }
            }

            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(BlockKind::$variant),)*
                    _ => None,
                }
            }

            pub fn output(self) -> Output {
                match self {
                    $(BlockKind::$variant => $output),*
                }
            }
        }
    };
}

const STMT: Output = Output::Statement;
const NUM: Output = Output::Value(Some(ValueType::Number));
const BOOL: Output = Output::Value(Some(ValueType::Boolean));
const STR: Output = Output::Value(Some(ValueType::String));
const ANY: Output = Output::Value(None);

block_kinds! {
    // program structure
    LeaphyStart => "leaphy_start": STMT,
    TimeDelay => "time_delay": STMT,
    SerialPrintLine => "leaphy_serial_print_line": STMT,
    SerialPrintValue => "leaphy_serial_print_value": STMT,
    SerialAvailable => "leaphy_serial_available": NUM,
    SerialReadLine => "leaphy_serial_read_line": STR,

    // logic
    ControlsIf => "controls_if": STMT,
    LogicCompare => "logic_compare": BOOL,
    LogicOperation => "logic_operation": BOOL,
    LogicNegate => "logic_negate": BOOL,
    LogicBoolean => "logic_boolean": BOOL,
    LogicNull => "logic_null": ANY,
    LogicTernary => "logic_ternary": ANY,

    // loops
    ControlsRepeatExt => "controls_repeat_ext": STMT,
    ControlsRepeatForever => "controls_repeat_forever": STMT,
    ControlsWhileUntil => "controls_whileUntil": STMT,
    ControlsFor => "controls_for": STMT,
    ControlsFlowStatements => "controls_flow_statements": STMT,

    // math
    MathNumber => "math_number": NUM,
    MathArithmetic => "math_arithmetic": NUM,
    MathSingle => "math_single": NUM,
    MathTrig => "math_trig": NUM,
    MathConstant => "math_constant": NUM,
    MathNumberProperty => "math_number_property": BOOL,
    MathRound => "math_round": NUM,
    MathModulo => "math_modulo": NUM,
    MathConstrain => "math_constrain": NUM,
    MathRandomInt => "math_random_int": NUM,
    MathRandomFloat => "math_random_float": NUM,

    // text
    Text => "text": STR,
    TextJoin => "text_join": STR,
    TextLength => "text_length": NUM,
    TextCharAt => "text_charAt": STR,
    TextIncludes => "text_includes": BOOL,
    TextToDouble => "text_to_double": NUM,

    // variables
    VariablesGet => "variables_get": ANY,
    VariablesSet => "variables_set": STMT,

    // lists
    ListsAdd => "lists_add": STMT,
    ListsDelete => "lists_delete": STMT,
    ListsClear => "lists_clear": STMT,
    ListsInsert => "lists_insert": STMT,
    ListsGet => "lists_get": ANY,
    ListsReplace => "lists_replace": STMT,
    ListsLength => "lists_length": NUM,

    // procedures
    ProceduresDefNoReturn => "procedures_defnoreturn": STMT,
    ProceduresDefReturn => "procedures_defreturn": STMT,
    ProceduresCallNoReturn => "procedures_callnoreturn": STMT,
    ProceduresCallReturn => "procedures_callreturn": ANY,
    ProceduresIfReturn => "procedures_ifreturn": STMT,

    // pin i/o
    DigitalRead => "digital_read": NUM,
    AnalogRead => "analog_read": NUM,
    DigitalWrite => "leaphy_io_digitalwrite": STMT,
    AnalogWrite => "leaphy_io_analogwrite": STMT,
    MultiplexerDigitalWrite => "leaphy_multiplexer_digitalwrite": STMT,
    ServoWrite => "leaphy_servo_write": STMT,
    ServoRead => "leaphy_servo_read": NUM,
    SonarRead => "leaphy_sonar_read": NUM,

    // leaphy original robot
    OriginalSetLed => "leaphy_original_set_led": STMT,
    OriginalSetMotor => "leaphy_original_set_motor": STMT,
    ClickSetMotor => "leaphy_click_set_motor": STMT,
    OriginalMoveMotors => "leaphy_original_move_motors": STMT,
    OriginalBuzz => "leaphy_original_buzz": STMT,
    OriginalServoSet => "leaphy_original_servo_set": STMT,
    OriginalServoMove => "leaphy_original_servo_move": STMT,

    // led strip
    LedSetStrip => "leaphy_led_set_strip": STMT,
    LedSetBasic => "leaphy_led_set_basic": STMT,
    LedSetSpeed => "leaphy_led_set_speed": STMT,
    LedStripDemo => "leaphy_led_strip_demo": STMT,

    // i2c sensors
    I2cUseChannel => "i2c_use_channel": STMT,
    TofGetDistance => "leaphy_tof_get_distance": NUM,
    RgbColor => "leaphy_rgb_color": NUM,
    RgbColorRaw => "leaphy_rgb_color_raw": NUM,
    RgbRawColorRed => "leaphy_rgb_raw_color_red": NUM,
    RgbRawColorGreen => "leaphy_rgb_raw_color_green": NUM,
    RgbRawColorBlue => "leaphy_rgb_raw_color_blue": NUM,
    I2cGesture => "leaphy_i2c_gesture": NUM,
    I2cRgbColor => "leaphy_i2c_rgb_color": NUM,
    GasSensor => "leaphy_gas_sensor": NUM,

    // leaphy extensions peripherals
    SegmentInit => "leaphy_segment_init": STMT,
    MatrixInit => "leaphy_matrix_init": STMT,
    SoundInit => "leaphy_sound_init": STMT,

    // oled displays
    DisplayClear => "leaphy_display_clear": STMT,
    DisplaySetTextSize => "leaphy_display_set_text_size": STMT,
    DisplayPrintLine => "leaphy_display_print_line": STMT,
    DisplayPrintValue => "leaphy_display_print_value": STMT,
    DisplayDisplay => "leaphy_display_display": STMT,
    DisplayLargeClear => "leaphy_display_large_clear": STMT,
    DisplayLargeSetTextSize => "leaphy_display_large_set_text_size": STMT,
    DisplayLargePrintLine => "leaphy_display_large_print_line": STMT,
    DisplayLargePrintValue => "leaphy_display_large_print_value": STMT,
    DisplayLargeDisplay => "leaphy_display_large_display": STMT,

    // mesh networking
    MeshSetup => "mesh_setup": STMT,
    MeshUpdate => "mesh_update": STMT,
    MeshOnSignal => "mesh_on_signal": STMT,
    MeshCallSignal => "mesh_call_signal": STMT,
    MeshBroadcastSignal => "mesh_broadcast_signal": STMT,
    MeshSender => "mesh_sender": NUM,

    // bluetooth remote
    BleSetup => "ble_setup": STMT,
    BleUpdate => "ble_update": STMT,
    BleIsPressed => "ble_is_pressed": BOOL,

    // machine learning
    MlClassify => "ml_classify": STMT,
    MlCertainty => "ml_certainty": BOOL,

    // real time clock
    RtcGet => "leaphy_i2c_rtc_get": NUM,
    RtcSet => "leaphy_i2c_rtc_set": STMT,
    RtcFormat => "leaphy_i2c_rtc_format": STR,
}

impl BlockKind {
    /// Whether `input` on this kind holds a statement chain rather than an expression.
    pub fn is_statement_input(self, input: &str) -> bool {
        match self {
            BlockKind::LeaphyStart
            | BlockKind::ProceduresDefNoReturn
            | BlockKind::ProceduresDefReturn
            | BlockKind::MeshOnSignal => input == "STACK",
            BlockKind::ControlsIf => {
                input == "ELSE"
                    || input
                        .strip_prefix("DO")
                        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
            }
            BlockKind::ControlsRepeatExt
            | BlockKind::ControlsRepeatForever
            | BlockKind::ControlsWhileUntil
            | BlockKind::ControlsFor
            | BlockKind::I2cUseChannel => input == "DO",
            _ => false,
        }
    }

    pub fn is_value(self) -> bool {
        matches!(self.output(), Output::Value(_))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
