use super::*;
use crate::config::{GeneratorConfig, MlConfig};
use crate::registry::Dependency;
use crate::schematic::MURPHY_I2C;
use crate::workspace::{MlSensor, SensorKind, Workspace};
use pretty_assertions::assert_eq;
use serde_json::json;

fn generate(ws: &mut Workspace) -> ArduinoOutput {
    generate_with(ws, &GeneratorConfig::new())
}

fn generate_with(ws: &mut Workspace, config: &GeneratorConfig) -> ArduinoOutput {
    ArduinoGenerator::new(ws, config)
        .generate()
        .expect("generation succeeds")
}

fn number(ws: &mut Workspace, value: &str) -> BlockId {
    let n = ws.add_block(BlockKind::MathNumber);
    ws.set_field(n, "NUM", value);
    n
}

fn arithmetic(ws: &mut Workspace, op: &str, a: BlockId, b: BlockId) -> BlockId {
    let block = ws.add_block(BlockKind::MathArithmetic);
    ws.set_field(block, "OP", op);
    ws.connect_input(block, "A", a);
    ws.connect_input(block, "B", b);
    block
}

/// Put `stack` under a start block.
fn program(ws: &mut Workspace, stack: &[BlockId]) -> BlockId {
    let start = ws.add_block(BlockKind::LeaphyStart);
    if let Some(head) = ws.chain(stack) {
        ws.connect_input(start, "STACK", head);
    }
    start
}

fn print(ws: &mut Workspace, value: BlockId) -> BlockId {
    let block = ws.add_block(BlockKind::SerialPrintLine);
    ws.connect_input(block, "VALUE", value);
    block
}

fn digital_write(ws: &mut Workspace, pin: &str, on: bool) -> BlockId {
    let block = ws.add_block(BlockKind::DigitalWrite);
    ws.set_field(block, "PIN", pin);
    let state = ws.add_block(BlockKind::LogicBoolean);
    ws.set_field(state, "BOOL", if on { "TRUE" } else { "FALSE" });
    ws.connect_input(block, "STATE", state);
    block
}

fn delay(ws: &mut Workspace, ms: &str) -> BlockId {
    let block = ws.add_block(BlockKind::TimeDelay);
    let n = number(ws, ms);
    ws.connect_input(block, "DELAY_TIME_MILI", n);
    block
}

#[test]
fn test_minimal_sketch() {
    let mut ws = Workspace::new();
    let d = delay(&mut ws, "500");
    program(&mut ws, &[d]);

    let out = generate(&mut ws);
    assert_eq!(
        out.code,
        "void leaphyProgram() {\n  delay(500);\n}\n\n\
         void setup() {\n  Serial.begin(115200);\n  leaphyProgram();\n}\n\n\
         void loop() {\n}\n"
    );
    assert!(out.dependencies.is_empty());
}

#[test]
fn test_loose_chain_goes_to_loop() {
    let mut ws = Workspace::new();
    let d = delay(&mut ws, "10");
    let out = generate(&mut ws);
    assert!(ws.top_blocks().contains(&d));
    assert!(out.code.ends_with("void loop() {\n  delay(10);\n}\n"));
}

#[test]
fn test_precedence_adds_parentheses() {
    let mut ws = Workspace::new();
    let (two, three, four) = (number(&mut ws, "2"), number(&mut ws, "3"), number(&mut ws, "4"));
    let sum = arithmetic(&mut ws, "ADD", three, four);
    let product = arithmetic(&mut ws, "MULTIPLY", two, sum);
    let p = print(&mut ws, product);
    program(&mut ws, &[p]);
    assert!(generate(&mut ws).code.contains("Serial.println(2 * (3 + 4));"));
}

#[test]
fn test_precedence_skips_needless_parentheses() {
    let mut ws = Workspace::new();
    let (two, three, four) = (number(&mut ws, "2"), number(&mut ws, "3"), number(&mut ws, "4"));
    let product = arithmetic(&mut ws, "MULTIPLY", two, three);
    let sum = arithmetic(&mut ws, "ADD", product, four);
    let p = print(&mut ws, sum);
    program(&mut ws, &[p]);
    assert!(generate(&mut ws).code.contains("Serial.println(2 * 3 + 4);"));
}

fn compare(ws: &mut Workspace, op: &str, a: BlockId, b: BlockId) -> BlockId {
    let block = ws.add_block(BlockKind::LogicCompare);
    ws.set_field(block, "OP", op);
    ws.connect_input(block, "A", a);
    ws.connect_input(block, "B", b);
    block
}

fn printed(ws: &mut Workspace, value: BlockId) -> String {
    let p = print(ws, value);
    program(ws, &[p]);
    generate(ws).code
}

#[test]
fn test_right_grouping_keeps_parentheses() {
    let cases = [
        ("MINUS", "MINUS", "Serial.println(10 - (3 - 2));"),
        ("MULTIPLY", "DIVIDE", "Serial.println(10 * (3 / 2));"),
        ("DIVIDE", "MULTIPLY", "Serial.println(10 / (3 * 2));"),
    ];
    for (outer, inner, expected) in cases {
        let mut ws = Workspace::new();
        let (a, b, c) = (number(&mut ws, "10"), number(&mut ws, "3"), number(&mut ws, "2"));
        let right = arithmetic(&mut ws, inner, b, c);
        let top = arithmetic(&mut ws, outer, a, right);
        assert!(printed(&mut ws, top).contains(expected), "{outer} of {inner}");
    }
}

#[test]
fn test_left_grouping_drops_parentheses() {
    let mut ws = Workspace::new();
    let (a, b, c) = (number(&mut ws, "10"), number(&mut ws, "3"), number(&mut ws, "2"));
    let left = arithmetic(&mut ws, "MINUS", a, b);
    let top = arithmetic(&mut ws, "MINUS", left, c);
    assert!(printed(&mut ws, top).contains("Serial.println(10 - 3 - 2);"));
}

#[test]
fn test_nested_comparison_keeps_parentheses() {
    let mut ws = Workspace::new();
    let (one, two, three) = (number(&mut ws, "1"), number(&mut ws, "2"), number(&mut ws, "3"));
    let inner = compare(&mut ws, "LT", two, three);
    let outer = compare(&mut ws, "LT", one, inner);
    assert!(printed(&mut ws, outer).contains("Serial.println(1 < (2 < 3));"));
}

#[test]
fn test_ternary_condition_keeps_parentheses() {
    let mut ws = Workspace::new();
    let flag = ws.add_block(BlockKind::LogicBoolean);
    ws.set_field(flag, "BOOL", "TRUE");
    let inner = ws.add_block(BlockKind::LogicTernary);
    ws.connect_input(inner, "IF", flag);
    let (one, two) = (number(&mut ws, "1"), number(&mut ws, "2"));
    ws.connect_input(inner, "THEN", one);
    ws.connect_input(inner, "ELSE", two);
    let outer = ws.add_block(BlockKind::LogicTernary);
    ws.connect_input(outer, "IF", inner);
    let (three, four) = (number(&mut ws, "3"), number(&mut ws, "4"));
    ws.connect_input(outer, "THEN", three);
    ws.connect_input(outer, "ELSE", four);
    assert!(printed(&mut ws, outer).contains("Serial.println((true ? 1 : 2) ? 3 : 4);"));
}

#[test]
fn test_whole_check_wraps_comparison() {
    let mut ws = Workspace::new();
    let (a, b) = (number(&mut ws, "1"), number(&mut ws, "2"));
    let eq = compare(&mut ws, "EQ", a, b);
    let whole = ws.add_block(BlockKind::MathNumberProperty);
    ws.set_field(whole, "PROPERTY", "WHOLE");
    ws.connect_input(whole, "NUMBER_TO_CHECK", eq);
    assert!(printed(&mut ws, whole).contains("Serial.println((1 == 2) == floor((1 == 2)));"));
}

#[test]
fn test_loose_chain_keeps_order_in_loop() {
    let mut ws = Workspace::new();
    let wait = delay(&mut ws, "1000");
    let on = digital_write(&mut ws, "13", true);
    ws.chain(&[wait, on]);

    let out = generate(&mut ws);
    assert!(out
        .code
        .ends_with("void loop() {\n  delay(1000);\n  digitalWrite(13, true);\n}\n"));
    assert_eq!(out.code.matches("pinMode(13, OUTPUT);").count(), 1);
    let setup = out.code.find("void setup()").expect("setup present");
    let loop_start = out.code.find("void loop()").expect("loop present");
    let pin_mode = out.code.find("pinMode(13, OUTPUT);").expect("pin mode present");
    assert!(setup < pin_mode && pin_mode < loop_start);
}

#[test]
fn test_blink_sets_pin_mode_once() {
    let mut ws = Workspace::new();
    let on = digital_write(&mut ws, "13", true);
    let d1 = delay(&mut ws, "1000");
    let off = digital_write(&mut ws, "13", false);
    let d2 = delay(&mut ws, "1000");
    let forever = ws.add_block(BlockKind::ControlsRepeatForever);
    if let Some(head) = ws.chain(&[on, d1, off, d2]) {
        ws.connect_input(forever, "DO", head);
    }
    program(&mut ws, &[forever]);

    let out = generate(&mut ws);
    assert_eq!(out.code.matches("pinMode(13, OUTPUT);").count(), 1);
    assert!(out.code.contains(
        "  while (true) {\n    digitalWrite(13, true);\n    delay(1000);\n    digitalWrite(13, false);\n    delay(1000);\n  }\n"
    ));
}

#[test]
fn test_comments_precede_statement() {
    let mut ws = Workspace::new();
    let d = delay(&mut ws, "5");
    ws.set_comment(d, "wait a bit\nthen go");
    let n = ws.input_target(d, "DELAY_TIME_MILI").expect("number plugged in");
    ws.set_comment(n, "milliseconds");
    program(&mut ws, &[d]);

    let code = generate(&mut ws).code;
    assert!(code.contains("  // wait a bit\n  // then go\n  // milliseconds\n  delay(5);\n"));
}

#[test]
fn test_quote_escapes() {
    assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    assert_eq!(quote("it's"), "\"it\\'s\"");
    assert_eq!(quote("back\\slash"), "\"back\\\\slash\"");
}

#[test]
fn test_servo_declared_once() {
    let mut ws = Workspace::new();
    let mut stack = Vec::new();
    for angle in ["0", "180"] {
        let s = ws.add_block(BlockKind::ServoWrite);
        ws.set_field(s, "SERVO_PIN", "9");
        let a = number(&mut ws, angle);
        ws.connect_input(s, "SERVO_ANGLE", a);
        stack.push(s);
    }
    program(&mut ws, &stack);

    let out = generate(&mut ws);
    assert_eq!(out.code.matches("Servo myServo9;").count(), 1);
    assert!(out.code.contains("#include <Servo.h>"));
    assert!(out.code.contains("myServo9.write(180);"));
    assert_eq!(out.dependencies, vec![Dependency::Servo]);
}

#[test]
fn test_esp32_uses_esp_servo_library() {
    let mut ws = Workspace::new();
    let s = ws.add_block(BlockKind::ServoRead);
    ws.set_field(s, "SERVO_PIN", "4");
    let p = print(&mut ws, s);
    program(&mut ws, &[p]);

    let out = generate_with(&mut ws, &GeneratorConfig::new().with_robot("l_esp32"));
    assert!(out.code.contains("#include <ESP32Servo.h>"));
    assert_eq!(out.dependencies, vec![Dependency::EspServo]);
}

#[test]
fn test_pin_conflict_warns_second_block() {
    let mut ws = Workspace::new();
    let w = digital_write(&mut ws, "5", true);
    let s = ws.add_block(BlockKind::ServoWrite);
    ws.set_field(s, "SERVO_PIN", "5");
    program(&mut ws, &[w, s]);

    generate(&mut ws);
    assert!(ws.block(w).warning_text().is_none());
    let warning = ws.block(s).warning("Servo Write").unwrap_or_default();
    assert!(warning.contains("already used as OUTPUT"), "{warning}");
}

#[test]
fn test_analog_write_range_warning() {
    let mut ws = Workspace::new();
    let w = ws.add_block(BlockKind::AnalogWrite);
    ws.set_field(w, "PIN", "6");
    let n = number(&mut ws, "300");
    ws.connect_input(w, "NUM", n);
    program(&mut ws, &[w]);

    generate(&mut ws);
    assert!(ws.block(w).warning("pwm_value").is_some());

    ws.set_field(n, "NUM", "200");
    generate(&mut ws);
    assert!(ws.block(w).warning("pwm_value").is_none());
}

#[test]
fn test_variables_are_declared_with_inferred_type() {
    let mut ws = Workspace::new();
    ws.variables.add("v1", "speed");
    ws.variables.add("v2", "unused");
    let set = ws.add_block(BlockKind::VariablesSet);
    ws.set_field(set, "VAR", "v1");
    let n = number(&mut ws, "12");
    ws.connect_input(set, "VALUE", n);
    program(&mut ws, &[set]);

    let code = generate(&mut ws).code;
    assert!(code.contains("double speed = 0;\n"));
    assert!(!code.contains("unused"));
    assert!(code.contains("  speed = 12;\n"));
}

#[test]
fn test_reserved_variable_name_is_renamed() {
    let mut ws = Workspace::new();
    ws.variables.add("v1", "delay");
    let set = ws.add_block(BlockKind::VariablesSet);
    ws.set_field(set, "VAR", "v1");
    program(&mut ws, &[set]);

    let code = generate(&mut ws).code;
    assert!(code.contains("delay2 = 0;"));
}

#[test]
fn test_stale_list_reference_emits_default() {
    let mut ws = Workspace::new();
    ws.lists.add("l1", "scores");
    let add = ws.add_block(BlockKind::ListsAdd);
    ws.set_field(add, "LIST", "gone");
    let len = ws.add_block(BlockKind::ListsLength);
    ws.set_field(len, "LIST", "gone");
    let p = print(&mut ws, len);
    program(&mut ws, &[add, p]);

    let out = generate(&mut ws);
    assert!(out.code.contains("List<double> scores;"));
    assert!(out.code.contains("Serial.println(0);"));
    assert!(!out.code.contains(".add("));
    assert_eq!(out.dependencies, vec![Dependency::List]);
}

#[test]
fn test_procedure_with_return() {
    let mut ws = Workspace::new();
    let def = ws.add_block(BlockKind::ProceduresDefReturn);
    ws.set_field(def, "NAME", "double it");
    let (a, b) = (number(&mut ws, "2"), number(&mut ws, "21"));
    let product = arithmetic(&mut ws, "MULTIPLY", a, b);
    ws.connect_input(def, "RETURN", product);

    let call = ws.add_block(BlockKind::ProceduresCallReturn);
    ws.set_extra_state(call, json!({"name": "double it"}));
    let p = print(&mut ws, call);
    program(&mut ws, &[p]);

    let code = generate(&mut ws).code;
    assert!(code.contains("double double_it() {\n  return 2 * 21;\n}"), "{code}");
    assert!(code.contains("Serial.println(double_it());"));
}

#[test]
fn test_serial_check_with_program_image() {
    let mut ws = Workspace::new();
    let config = GeneratorConfig {
        program: Some(vec![0x01, 0xff]),
        ..GeneratorConfig::new()
    };
    let code = generate_with(&mut ws, &config).code;
    assert!(code.contains("const unsigned char program[] PROGMEM = { 0x01, 0xff };"));
    assert!(code.contains("while (millis() < 100 && checkSerial()) {};"));
    assert!(!code.contains("xTaskCreate"));

    let esp = GeneratorConfig {
        program: Some(vec![0x01]),
        ..GeneratorConfig::new().with_robot("l_esp32")
    };
    let code = generate_with(&mut ws, &esp).code;
    assert!(code.contains("xTaskCreate(updateSerial"));
    assert!(code.contains("Serial.onEvent(onSerialEvent);"));
}

#[test]
fn test_tof_behind_multiplexer_channel() {
    let mut ws = Workspace::new();
    let channel = ws.add_block(BlockKind::I2cUseChannel);
    ws.set_field(channel, "CHANNEL", "2");
    let tof = ws.add_block(BlockKind::TofGetDistance);
    let p = print(&mut ws, tof);
    ws.connect_input(channel, "DO", p);
    program(&mut ws, &[channel]);

    let out = generate(&mut ws);
    assert!(out.code.contains(
        "  {\n    i2cSelectChannel(2);\n    Serial.println(getTOF());\n    i2cRestoreChannel();\n  }\n"
    ));
    assert!(out.code.contains("void setuptof() {"));
    assert!(out.code.contains("#include <Wire.h>"));
    assert_eq!(out.dependencies, vec![Dependency::AdafruitVl53l0xTof]);

    let sda = out
        .circuit
        .port(MURPHY_I2C, "C2.SDA")
        .expect("multiplexer port");
    assert!(out.circuit.instance("tof-2").is_some());
    assert!(out.circuit.wires().iter().any(|w| w.to == sda));
}

#[test]
fn test_tof_without_channel_wires_to_board() {
    let mut ws = Workspace::new();
    let tof = ws.add_block(BlockKind::TofGetDistance);
    let p = print(&mut ws, tof);
    program(&mut ws, &[p]);

    let out = generate(&mut ws);
    assert!(out.circuit.instance("tof-null").is_some());
    assert_eq!(out.circuit.wires().len(), 4);
}

#[test]
fn test_starling_servos() {
    let mut ws = Workspace::new();
    let m = ws.add_block(BlockKind::OriginalServoMove);
    ws.set_field(m, "DIRECTION", "left");
    program(&mut ws, &[m]);

    let out = generate(&mut ws);
    assert!(out.code.contains("servo_left.attach(12);"));
    assert!(out.code.contains("servo_right.attach(13);"));
    assert!(out.code.contains(
        "servo_left.write(90 + 90*100/100*-1);\n  servo_right.write(90 + 90*100/100*-1);\n"
    ));
    assert!(out.circuit.instance("servo_left").is_some());
}

#[test]
fn test_nano_motor_speed_is_mapped() {
    let mut ws = Workspace::new();
    let m = ws.add_block(BlockKind::OriginalMoveMotors);
    ws.set_field(m, "MOTOR_DIRECTION", "1");
    let s = number(&mut ws, "150");
    ws.connect_input(m, "MOTOR_SPEED", s);
    program(&mut ws, &[m]);

    let out = generate_with(&mut ws, &GeneratorConfig::new().with_robot("l_original_nano"));
    assert!(out.code.contains("moveMotors(2, map(150, 0, 255, 100, 255));"));
    assert!(out.code.contains("setMotorPins(3, 2, 11, 4);"));
    assert!(out.code.contains("#include \"Leaphyoriginal1.h\""));
}

#[test]
fn test_mesh_receiver_callback() {
    let mut ws = Workspace::new();
    ws.signals.add("s1", "ping");
    let setup = ws.add_block(BlockKind::MeshSetup);
    ws.set_field(setup, "NAME", "robots");
    program(&mut ws, &[setup]);

    let handler = ws.add_block(BlockKind::MeshOnSignal);
    ws.set_field(handler, "SIGNAL", "s1");
    let d = delay(&mut ws, "1");
    ws.connect_input(handler, "STACK", d);

    let code = generate(&mut ws).code;
    assert!(code.contains(
        "void receivedCallback(uint32_t from, String &msg) {\n  node_sender = from;\n  if (msg == \"ping\") {\n    delay(1);\n  }\n}"
    ), "{code}");
    assert!(code.contains("mesh.init(\"robots\", \"Leaphy123\");"));
}

#[test]
fn test_ble_remote_keys() {
    let mut ws = Workspace::new();
    let setup = ws.add_block(BlockKind::BleSetup);
    let name = ws.add_block(BlockKind::Text);
    ws.set_field(name, "TEXT", "bot");
    ws.connect_input(setup, "NAME", name);
    let pressed = ws.add_block(BlockKind::BleIsPressed);
    ws.set_field(pressed, "KEY", "up");
    let p = print(&mut ws, pressed);
    program(&mut ws, &[setup, p]);

    let out = generate(&mut ws);
    assert!(out.code.contains(&format!(
        "BLEByteCharacteristic upCharacteristic(\"{}\", BLEWrite);",
        encode_uuid("up")
    )));
    assert!(out.code.contains("BLE.setLocalName(\"bot\");"));
    assert!(out.code.contains("Serial.println((upCharacteristic.value() == 1));"));
    assert_eq!(out.dependencies, vec![Dependency::ArduinoBle]);
}

#[test]
fn test_ml_streams_sensors_over_ble() {
    let mut ws = Workspace::new();
    ws.ml_classes.add("c1", "thumbs up");
    ws.ml_sensors.push(MlSensor {
        id: "s-1".into(),
        kind: SensorKind::Analog { pin: "A0".into() },
    });
    let classify = ws.add_block(BlockKind::MlClassify);
    let certainty = ws.add_block(BlockKind::MlCertainty);
    ws.set_field(certainty, "CLASS", "c1");
    let p = print(&mut ws, certainty);
    program(&mut ws, &[classify, p]);

    let code = generate(&mut ws).code;
    assert!(code.contains("BLEFloatCharacteristic sensor_analog_s_1(\"s-1\", BLERead | BLENotify);"));
    assert!(code.contains("BLEBooleanCharacteristic class_thumbs_up(\"c1\", BLEWrite);"));
    assert!(code.contains("sensor_analog_s_1.writeValue(analogRead(A0) / 4095.0f);"));
    assert!(code.contains("Serial.println(class_thumbs_up.value());"));
}

#[test]
fn test_ml_inference_on_board() {
    let mut ws = Workspace::new();
    ws.ml_classes.add("c1", "left");
    ws.ml_classes.add("c2", "right");
    ws.ml_sensors.push(MlSensor {
        id: "d".into(),
        kind: SensorKind::Digital { pin: "7".into() },
    });
    let classify = ws.add_block(BlockKind::MlClassify);
    let certainty = ws.add_block(BlockKind::MlCertainty);
    ws.set_field(certainty, "CLASS", "c2");
    let p = print(&mut ws, certainty);
    program(&mut ws, &[classify, p]);

    let config = GeneratorConfig {
        ml: MlConfig {
            generate_inference: true,
            model_headers: Some("const unsigned char model_data[] = {0};".into()),
        },
        ..GeneratorConfig::new().with_robot("l_esp32")
    };
    let out = generate_with(&mut ws, &config);
    assert!(out.code.contains("input->data.f[0] = digitalRead(7);\n  interpreter->Invoke();"));
    assert!(out.code.contains("float class_right_prob = output->data.f[1];"));
    assert!(out.code.contains("Serial.println((predicted_class == 1));"));
    assert!(out.code.contains("const unsigned char model_data[] = {0};"));
    assert!(out.dependencies.contains(&Dependency::TensorflowEsp32));
}

#[test]
fn test_stale_ml_class_is_false() {
    let mut ws = Workspace::new();
    let certainty = ws.add_block(BlockKind::MlCertainty);
    ws.set_field(certainty, "CLASS", "missing");
    let p = print(&mut ws, certainty);
    program(&mut ws, &[p]);
    assert!(generate(&mut ws).code.contains("Serial.println(false);"));
}

#[test]
fn test_led_strip_effect() {
    let mut ws = Workspace::new();
    let strip = ws.add_block(BlockKind::LedSetStrip);
    let (pin, leds) = (number(&mut ws, "6"), number(&mut ws, "8"));
    ws.connect_input(strip, "LED_SET_PIN", pin);
    ws.connect_input(strip, "LED_SET_LEDS", leds);
    let demo = ws.add_block(BlockKind::LedStripDemo);
    ws.set_field(demo, "DEMO_TYPE", "4");
    program(&mut ws, &[strip, demo]);

    let out = generate(&mut ws);
    assert!(out.code.contains("#define NUM_LEDS 8\nCRGB ledstrip[NUM_LEDS];"));
    assert!(out.code.contains("FastLED.addLeds<WS2812, 6, GRB>(ledstrip, NUM_LEDS);"));
    assert!(out.code.contains("void ledstripRainbow() {"));
    assert!(out.code.contains("  ledstripRainbow();\n"));
}

#[test]
fn test_rtc_format_expression() {
    let mut ws = Workspace::new();
    let format = ws.add_block(BlockKind::RtcFormat);
    ws.set_extra_state(
        format,
        json!([
            {"type": "item", "item": "hour", "fmt": "2-digit"},
            {"type": "text", "value": ":"},
            {"type": "item", "item": "minute", "fmt": "2-digit"},
        ]),
    );
    let p = print(&mut ws, format);
    program(&mut ws, &[p]);

    let out = generate(&mut ws);
    assert!(out.code.contains(
        "Serial.println(rtcPad(rtc.getHour(h12Flag, pmFlag)) + String(\":\") + rtcPad(rtc.getMinute()));"
    ));
    assert!(out.code.contains("DS3231 rtc;"));
    assert_eq!(out.dependencies, vec![Dependency::Ds3231Rtc]);
}

#[test]
fn test_extension_peripherals_declared_once() {
    let mut ws = Workspace::new();
    let segment = ws.add_block(BlockKind::SegmentInit);
    ws.set_field(segment, "CLK", "2");
    ws.set_field(segment, "DIO", "3");
    let matrix = ws.add_block(BlockKind::MatrixInit);
    ws.set_field(matrix, "DIN", "11");
    ws.set_field(matrix, "CLK", "13");
    ws.set_field(matrix, "CS", "10");
    let sound = ws.add_block(BlockKind::SoundInit);
    ws.set_field(sound, "RX", "7");
    ws.set_field(sound, "TX", "8");
    let again = ws.add_block(BlockKind::SegmentInit);
    ws.set_field(again, "CLK", "4");
    ws.set_field(again, "DIO", "5");
    program(&mut ws, &[segment, matrix, sound, again]);

    let out = generate(&mut ws);
    assert!(out.code.starts_with(
        "#include <SegmentDisplay.h>\n#include <LedControl.h>\n#include <RedMP3.h>\n\n"
    ));
    assert!(out.code.contains("TM1637Display segment_display(2, 3);"));
    assert!(!out.code.contains("segment_display(4, 5)"));
    assert!(out.code.contains("LedControl matrix = LedControl(11, 13, 10, 1);"));
    assert!(out.code.contains("MP3 mp3(7, 8);"));
    assert!(out.code.contains(
        "  segment_display.setBrightness(255);\n  matrix.shutdown(0, false);\n  \
         matrix.setIntensity(0, 8);\n  matrix.clearDisplay(0);\n"
    ));
    assert!(out.code.contains("void leaphyProgram() {\n}\n"));
    assert_eq!(out.dependencies, vec![Dependency::LeaphyExtensions]);
}

#[test]
fn test_raw_colour_channels_share_helper() {
    let mut ws = Workspace::new();
    let red = ws.add_block(BlockKind::RgbRawColorRed);
    let green = ws.add_block(BlockKind::RgbRawColorGreen);
    let blue = ws.add_block(BlockKind::RgbRawColorBlue);
    let (r, g, b) = (print(&mut ws, red), print(&mut ws, green), print(&mut ws, blue));
    program(&mut ws, &[r, g, b]);

    let code = generate(&mut ws).code;
    assert_eq!(code.matches("double getColor(int colorCode, bool isRaw)").count(), 1);
    assert!(code.contains(
        "  Serial.println(getColor(0, true));\n  Serial.println(getColor(1, true));\n  \
         Serial.println(getColor(2, true));\n"
    ));
}

#[test]
fn test_micropython_only_block_warns() {
    let mut ws = Workspace::new();
    let gesture = ws.add_block(BlockKind::I2cGesture);
    let p = print(&mut ws, gesture);
    program(&mut ws, &[p]);

    let code = generate(&mut ws).code;
    assert!(code.contains("  Serial.println(0);\n"));
    assert_eq!(
        ws.block(gesture).warning("arduino"),
        Some("leaphy_i2c_gesture is not available on Arduino")
    );
}
