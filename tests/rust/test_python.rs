use super::*;
use crate::workspace::Workspace;
use pretty_assertions::assert_eq;

fn generate(ws: &mut Workspace) -> String {
    MicroPythonGenerator::new(ws)
        .generate()
        .expect("generation succeeds")
}

fn number(ws: &mut Workspace, value: &str) -> BlockId {
    let n = ws.add_block(BlockKind::MathNumber);
    ws.set_field(n, "NUM", value);
    n
}

fn text(ws: &mut Workspace, value: &str) -> BlockId {
    let t = ws.add_block(BlockKind::Text);
    ws.set_field(t, "TEXT", value);
    t
}

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

fn delay(ws: &mut Workspace, ms: BlockId) -> BlockId {
    let block = ws.add_block(BlockKind::TimeDelay);
    ws.connect_input(block, "DELAY_TIME_MILI", ms);
    block
}

#[test]
fn test_blink_program() {
    let mut ws = Workspace::new();
    let on = digital_write(&mut ws, "D13", true);
    let second = number(&mut ws, "1000");
    let wait_long = delay(&mut ws, second);
    let off = digital_write(&mut ws, "D13", false);
    let half = number(&mut ws, "500");
    let wait_short = delay(&mut ws, half);
    program(&mut ws, &[on, wait_long, off, wait_short]);

    assert_eq!(
        generate(&mut ws),
        "from machine import Pin\n\
         from utime import sleep, sleep_ms\n\n\
         pin_d13 = Pin(\"D13\", Pin.OUT)\n\n\
         def leaphy_program():\n  pin_d13.value(True)\n  sleep(1)\n  pin_d13.value(False)\n  sleep_ms(500)\n\n\n\
         leaphy_program()\n"
    );
}

#[test]
fn test_empty_program_body_is_pass() {
    let mut ws = Workspace::new();
    program(&mut ws, &[]);
    assert_eq!(
        generate(&mut ws),
        "def leaphy_program():\n  pass\n\n\nleaphy_program()\n"
    );
}

#[test]
fn test_pin_mode_conflict_warns_and_skips() {
    let mut ws = Workspace::new();
    let write = digital_write(&mut ws, "D2", true);
    let read = ws.add_block(BlockKind::DigitalRead);
    ws.set_field(read, "PIN", "D2");
    let show = print(&mut ws, read);
    program(&mut ws, &[write, show]);

    let code = generate(&mut ws);
    assert!(code.contains("  pin_d2.value(True)\n  print(None)\n"));
    assert_eq!(
        ws.block(read).warning("pin"),
        Some("Pin D2 cannot be used for digital read, it is already used as digital output")
    );
    assert_eq!(ws.block(write).warning("pin"), None);
}

#[test]
fn test_imports_merge_per_package() {
    let mut ws = Workspace::new();
    let pwm = ws.add_block(BlockKind::AnalogWrite);
    ws.set_field(pwm, "PIN", "D3");
    let duty = number(&mut ws, "32768");
    ws.connect_input(pwm, "NUM", duty);
    let adc = ws.add_block(BlockKind::AnalogRead);
    ws.set_field(adc, "PIN", "A0");
    let show = print(&mut ws, adc);
    program(&mut ws, &[pwm, show]);

    let code = generate(&mut ws);
    assert!(code.starts_with("from machine import Pin, PWM, ADC\n\n"));
    assert!(code.contains("pwm_d3 = PWM(Pin(\"D3\"))\n\nadc_a0 = ADC(Pin(\"A0\"))"));
    assert!(code.contains("  pwm_d3.duty_u16(32768)\n  print(adc_a0.read_u16())\n"));
}

#[test]
fn test_unsupported_block_warns() {
    let mut ws = Workspace::new();
    let servo = ws.add_block(BlockKind::ServoWrite);
    ws.set_field(servo, "PIN", "9");
    program(&mut ws, &[servo]);

    let code = generate(&mut ws);
    assert!(!code.contains("servo"));
    assert_eq!(
        ws.block(servo).warning("micropython"),
        Some("leaphy_servo_write is not available in MicroPython")
    );
}

#[test]
fn test_variables_are_global_in_program() {
    let mut ws = Workspace::new();
    ws.variables.add("v1", "speed");
    let set = ws.add_block(BlockKind::VariablesSet);
    ws.set_field(set, "VAR", "v1");
    let five = number(&mut ws, "5");
    ws.connect_input(set, "VALUE", five);
    program(&mut ws, &[set]);

    assert_eq!(
        generate(&mut ws),
        "speed = None\n\ndef leaphy_program():\n  global speed\n  speed = 5\n\n\nleaphy_program()\n"
    );
}

#[test]
fn test_delay_with_computed_duration() {
    let mut ws = Workspace::new();
    ws.variables.add("v1", "pause");
    let get = ws.add_block(BlockKind::VariablesGet);
    ws.set_field(get, "VAR", "v1");
    let wait = delay(&mut ws, get);
    program(&mut ws, &[wait]);

    let code = generate(&mut ws);
    assert!(code.contains("from utime import sleep_ms\n"));
    assert!(code.contains("  sleep_ms(pause)\n"));
}

#[test]
fn test_precedence() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let two = number(&mut ws, "2");
    let sum = ws.add_block(BlockKind::MathArithmetic);
    ws.set_field(sum, "OP", "ADD");
    ws.connect_input(sum, "A", one);
    ws.connect_input(sum, "B", two);
    let three = number(&mut ws, "3");
    let product = ws.add_block(BlockKind::MathArithmetic);
    ws.set_field(product, "OP", "MULTIPLY");
    ws.connect_input(product, "A", sum);
    ws.connect_input(product, "B", three);
    print(&mut ws, product);

    assert_eq!(generate(&mut ws), "print((1 + 2) * 3)\n");
}

fn arithmetic(ws: &mut Workspace, op: &str, a: BlockId, b: BlockId) -> BlockId {
    let block = ws.add_block(BlockKind::MathArithmetic);
    ws.set_field(block, "OP", op);
    ws.connect_input(block, "A", a);
    ws.connect_input(block, "B", b);
    block
}

#[test]
fn test_right_grouping_keeps_parentheses() {
    let cases = [
        ("MINUS", "MINUS", "print(10 - (3 - 2))\n"),
        ("MULTIPLY", "DIVIDE", "print(10 * (3 / 2))\n"),
        ("DIVIDE", "MULTIPLY", "print(10 / (3 * 2))\n"),
        ("POWER", "POWER", "print(10 ** 3 ** 2)\n"),
    ];
    for (outer, inner, expected) in cases {
        let mut ws = Workspace::new();
        let (a, b, c) = (number(&mut ws, "10"), number(&mut ws, "3"), number(&mut ws, "2"));
        let right = arithmetic(&mut ws, inner, b, c);
        let top = arithmetic(&mut ws, outer, a, right);
        print(&mut ws, top);
        assert_eq!(generate(&mut ws), expected, "{outer} of {inner}");
    }
}

#[test]
fn test_power_groups_left_operand() {
    let mut ws = Workspace::new();
    let (a, b, c) = (number(&mut ws, "2"), number(&mut ws, "3"), number(&mut ws, "2"));
    let left = arithmetic(&mut ws, "POWER", a, b);
    let top = arithmetic(&mut ws, "POWER", left, c);
    print(&mut ws, top);
    assert_eq!(generate(&mut ws), "print((2 ** 3) ** 2)\n");
}

#[test]
fn test_nested_comparison_keeps_parentheses() {
    let mut ws = Workspace::new();
    let (one, two, three) = (number(&mut ws, "1"), number(&mut ws, "2"), number(&mut ws, "3"));
    let inner = ws.add_block(BlockKind::LogicCompare);
    ws.set_field(inner, "OP", "LT");
    ws.connect_input(inner, "A", two);
    ws.connect_input(inner, "B", three);
    let outer = ws.add_block(BlockKind::LogicCompare);
    ws.set_field(outer, "OP", "LT");
    ws.connect_input(outer, "A", one);
    ws.connect_input(outer, "B", inner);
    print(&mut ws, outer);
    assert_eq!(generate(&mut ws), "print(1 < (2 < 3))\n");
}

#[test]
fn test_text_blocks() {
    let mut ws = Workspace::new();
    let haystack = text(&mut ws, "it's");
    let needle = text(&mut ws, "s");
    let includes = ws.add_block(BlockKind::TextIncludes);
    ws.connect_input(includes, "VALUE", haystack);
    ws.connect_input(includes, "CHECK", needle);
    let negate = ws.add_block(BlockKind::LogicNegate);
    ws.connect_input(negate, "BOOL", includes);
    print(&mut ws, negate);

    let left = number(&mut ws, "Infinity");
    let right = text(&mut ws, "x");
    let join = ws.add_block(BlockKind::TextJoin);
    ws.connect_input(join, "ADD0", left);
    ws.connect_input(join, "ADD1", right);
    print(&mut ws, join);

    assert_eq!(
        generate(&mut ws),
        "print(not 's' in 'it\\'s')\nprint(str(float('inf')) + str('x'))\n"
    );
}

#[test]
fn test_tof_behind_channel() {
    let mut ws = Workspace::new();
    let tof = ws.add_block(BlockKind::TofGetDistance);
    let show = print(&mut ws, tof);
    let channel = ws.add_block(BlockKind::I2cUseChannel);
    ws.set_field(channel, "CHANNEL", "3");
    ws.connect_input(channel, "DO", show);

    let code = generate(&mut ws);
    assert!(code.contains(
        "from leaphymicropython.utils.i2c_helper import select_channel\n\
         from machine import I2C\n\
         from leaphymicropython.sensors.tof import TimeOfFlight\n"
    ));
    assert!(code.contains("I2C_CONNECTION = I2C(0)"));
    assert!(code.contains("TOF_3 = TimeOfFlight(3)\nTOF_3.initialize_device()"));
    assert!(code.ends_with("\n\n\nprint(TOF_3.get_distance())\n"));
}

#[test]
fn test_small_display() {
    let mut ws = Workspace::new();
    let clear = ws.add_block(BlockKind::DisplayClear);
    let line = ws.add_block(BlockKind::DisplayPrintLine);
    ws.set_field(line, "DISPLAY_ROW", "2");
    let hello = text(&mut ws, "hi");
    ws.connect_input(line, "VALUE", hello);
    let show = ws.add_block(BlockKind::DisplayDisplay);
    ws.chain(&[clear, line, show]);

    let code = generate(&mut ws);
    assert!(code.contains("MULTIPLEXER_ADDRESS = 0x70"));
    assert!(code.contains("SMALL_OLED_BC = ssd1306.SSD1306I2C("));
    assert!(code.ends_with(
        "SMALL_OLED_BC.fill(0)\nSMALL_OLED_BC.text(str('hi'), 0, 16)\nSMALL_OLED_BC.show()\n"
    ));
}

#[test]
fn test_set_motor() {
    let mut ws = Workspace::new();
    let motor = ws.add_block(BlockKind::OriginalSetMotor);
    ws.set_field(motor, "MOTOR_TYPE", "10");
    let speed = number(&mut ws, "-80");
    ws.connect_input(motor, "MOTOR_SPEED", speed);

    let code = generate(&mut ws);
    assert!(code.contains("from leaphymicropython.actuators.dcmotor import DCMotor\n"));
    assert!(code.contains("motor_right = DCMotor(direction_pin=\"D2\", pwn_pin=\"D3\")"));
    assert!(code.ends_with("\n\n\nset_motor_speed(motor_right, -80)\n"));
}

#[test]
fn test_if_else_chain() {
    let mut ws = Workspace::new();
    let cond = ws.add_block(BlockKind::LogicBoolean);
    ws.set_field(cond, "BOOL", "TRUE");
    let yes = text(&mut ws, "yes");
    let then = print(&mut ws, yes);
    let branch = ws.add_block(BlockKind::ControlsIf);
    ws.connect_input(branch, "IF0", cond);
    ws.connect_input(branch, "DO0", then);
    let no = text(&mut ws, "no");
    let otherwise = print(&mut ws, no);
    ws.connect_input(branch, "ELSE", otherwise);

    assert_eq!(
        generate(&mut ws),
        "if True:\n  print('yes')\nelse:\n  print('no')\n"
    );
}

#[test]
fn test_sonar_default_pins() {
    let mut ws = Workspace::new();
    let sonar = ws.add_block(BlockKind::SonarRead);
    ws.set_field(sonar, "TRIG_PIN", "DEFAULT");
    ws.set_field(sonar, "ECHO_PIN", "D7");
    print(&mut ws, sonar);

    let code = generate(&mut ws);
    assert!(code.ends_with("print(read_distance(\"A3\",\"D7\"))\n"));
}

#[test]
fn test_gesture_behind_channel() {
    let mut ws = Workspace::new();
    let gesture = ws.add_block(BlockKind::I2cGesture);
    let show = print(&mut ws, gesture);
    let channel = ws.add_block(BlockKind::I2cUseChannel);
    ws.set_field(channel, "CHANNEL", "2");
    ws.connect_input(channel, "DO", show);

    let code = generate(&mut ws);
    assert!(code.contains(
        "from leaphymicropython.sensors.adps9960 import ADPS_9960, GESTURE_NONE\n"
    ));
    assert!(code.contains("ADPS_2 = ADPS_9960(channel = 2)\nADPS_2.begin()\n\nlast_gesture_2 = GESTURE_NONE"));
    assert!(code.contains(
        "def gesture_2():\n  global last_gesture_2\n  if ADPS_2.gesture_available():\n    \
         last_gesture_2 = ADPS_2.read_gesture()\n  return last_gesture_2"
    ));
    assert!(code.ends_with("\n\n\nprint(gesture_2())\n"));
}

#[test]
fn test_colour_and_gesture_share_sensor() {
    let mut ws = Workspace::new();
    let color = ws.add_block(BlockKind::I2cRgbColor);
    ws.set_field(color, "COLOR_TYPE", "1");
    print(&mut ws, color);
    let gesture = ws.add_block(BlockKind::I2cGesture);
    print(&mut ws, gesture);

    let code = generate(&mut ws);
    assert_eq!(code.matches("ADPS_BC = ADPS_9960()\n").count(), 1);
    assert!(code.contains("last_color_BC = (0, 0, 0, 0)"));
    assert!(code.contains("  return last_color_BC[channel]"));
    assert!(code.ends_with("print(color_BC(1))\nprint(gesture_BC())\n"));
}
