//! Pin level input and output, servos included.

use crate::error::Result;
use crate::registry::PinType;
use crate::schematic::{ComponentKind, MURPHY, WireColor};
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

impl ArduinoGenerator<'_> {
    /// Place a three-wire sensor on `pin`: signal, supply and ground.
    fn wire_pin_sensor(
        &mut self,
        id: &str,
        kind: ComponentKind,
        pin: &str,
        (signal, vcc, gnd): (&str, &str, &str),
    ) -> Result<()> {
        if self.builder.instance(id).is_some() {
            return Ok(());
        }
        let sensor = self.builder.add(id, kind);
        self.builder
            .wire((MURPHY, pin), (&sensor, signal), WireColor::Data1)?;
        self.builder
            .wire((MURPHY, &format!("{pin}.3V3")), (&sensor, vcc), WireColor::Vcc)?;
        self.builder
            .wire((MURPHY, &format!("{pin}.GND")), (&sensor, gnd), WireColor::Gnd)?;
        Ok(())
    }

    pub(super) fn digital_read(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "PIN");
        self.wire_pin_sensor(
            &format!("digital-{pin}"),
            ComponentKind::LineSensor,
            &pin,
            ("Out", "3V3", "GND"),
        )?;
        self.registry.add_setup(
            &format!("setup_input_{pin}"),
            format!("pinMode({pin}, INPUT);"),
            true,
        );
        expr(format!("digitalRead({pin})"), Order::Atomic)
    }

    pub(super) fn analog_read(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "PIN");
        self.wire_pin_sensor(
            &format!("analog-{pin}"),
            ComponentKind::LightSensor,
            &pin,
            ("Out", "VCC", "GND"),
        )?;
        expr(format!("analogRead({pin})"), Order::Atomic)
    }

    pub(super) fn digital_write(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "PIN");
        let state = self.value_or(block, "STATE", Order::Atomic, "false")?;
        self.reserve_pin(block, &pin, PinType::Output, "Digital Write");
        self.registry.add_setup(
            &format!("io_{pin}"),
            format!("pinMode({pin}, OUTPUT);"),
            false,
        );
        stmt(format!("digitalWrite({pin}, {state});\n"))
    }

    pub(super) fn analog_write(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "PIN");
        let value = self.value_or(block, "NUM", Order::Atomic, "0")?;
        self.reserve_pin(block, &pin, PinType::Output, "Analogue Write");
        self.registry.add_setup(
            &format!("io_{pin}"),
            format!("pinMode({pin}, OUTPUT);"),
            false,
        );

        let out_of_range = value
            .parse::<f64>()
            .is_ok_and(|v| !(0.0..=255.0).contains(&v));
        let warning = out_of_range
            .then(|| "The analogue value set must be between 0 and 255".to_string());
        self.warn(block, "pwm_value", warning);

        stmt(format!("analogWrite({pin}, {value});\n"))
    }

    /// Drive the 3-bit address lines of the on-board multiplexer.
    pub(super) fn multiplexer_digital_write(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "PIN");
        self.registry.add_setup(
            "dgmulti",
            "pinMode(0, OUTPUT);\n  pinMode(16, OUTPUT);\n  pinMode(1, OUTPUT);",
            false,
        );
        stmt(format!(
            "digitalWrite(0, bitRead({pin}, 2));\ndigitalWrite(16, bitRead({pin}, 1));\ndigitalWrite(1, bitRead({pin}, 0));\n"
        ))
    }

    fn attach_servo(&mut self, block: BlockId, pin: &str, tag: &str) -> String {
        let name = format!("myServo{pin}");
        self.reserve_pin(block, pin, PinType::Servo, tag);
        self.include_servo_header();
        self.registry
            .add_declaration(&format!("servo_{pin}"), format!("Servo {name};"), false, 0);
        self.registry.add_setup(
            &format!("servo_{pin}"),
            format!("{name}.attach({pin});"),
            true,
        );
        name
    }

    pub(super) fn servo_write(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "SERVO_PIN");
        let angle = self.value_or(block, "SERVO_ANGLE", Order::Atomic, "90")?;
        let name = self.attach_servo(block, &pin, "Servo Write");
        stmt(format!("{name}.write({angle});\n"))
    }

    pub(super) fn servo_read(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.field(block, "SERVO_PIN");
        let name = self.attach_servo(block, &pin, "Servo Read");
        expr(format!("{name}.read()"), Order::Atomic)
    }
}
