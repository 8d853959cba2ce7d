//! Actuators of the Leaphy Original and Starling robots: RGB LED, DC
//! motors, buzzer and the continuous-rotation wheel servos.

use crate::error::Result;
use crate::registry::{Dependency, PinType};
use crate::schematic::{ComponentKind, MURPHY, WireColor};
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, stmt};

const MOTOR_PINS_SETUP: &str = "setMotorPins(3, 2, 11, 4);";

impl ArduinoGenerator<'_> {
    fn include_original_library(&mut self) {
        self.registry.add_dependency(&[Dependency::LeaphyExtensions]);
        self.registry
            .add_include("include_leaphy_original", "#include \"Leaphyoriginal1.h\"");
    }

    /// On the nano the motor driver sees a lower PWM voltage, so positive
    /// speeds are lifted into the range the motors actually turn at.
    fn nano_motor_speed(&mut self, speed: String) -> String {
        if !self.config.robot.is_nano() {
            return speed;
        }
        self.registry.add_setup("set_motor_pins", MOTOR_PINS_SETUP, true);
        if speed.parse::<f64>().is_ok_and(|s| s > 0.0) {
            format!("map({speed}, 0, 255, 100, 255)")
        } else {
            speed
        }
    }

    pub(super) fn original_set_led(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let red = self.value_or(block, "LED_RED", Order::Atomic, "0")?;
        let green = self.value_or(block, "LED_GREEN", Order::Atomic, "0")?;
        let blue = self.value_or(block, "LED_BLUE", Order::Atomic, "0")?;

        let (r, g, b) = if self.config.robot.is_nano() {
            // The original nano robots use 9-11 for the motors.
            let pins = if self.config.robot.is_original() {
                (5, 6, 7)
            } else {
                (11, 10, 9)
            };
            if self.builder.instance("rgb").is_none() {
                let led = self.builder.add("rgb", ComponentKind::RgbFlitz);
                self.builder
                    .wire((MURPHY, &pins.0.to_string()), (&led, "R"), WireColor::Data1)?;
                self.builder
                    .wire((MURPHY, &pins.1.to_string()), (&led, "G"), WireColor::Data2)?;
                self.builder
                    .wire((MURPHY, &pins.2.to_string()), (&led, "B"), WireColor::Data3)?;
                self.builder
                    .wire((MURPHY, "D8"), (&led, "GND"), WireColor::Gnd)?;
            }
            // The LED's ground sits on pin 8.
            self.registry.add_setup(
                "setup_nano_rgb",
                "pinMode(8, OUTPUT);\n  digitalWrite(8, LOW);",
                false,
            );
            pins
        } else {
            (6, 5, 3)
        };

        stmt(format!(
            "analogWrite({r}, {red});\nanalogWrite({g}, {green});\nanalogWrite({b}, {blue});\n"
        ))
    }

    pub(super) fn original_set_motor(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let motor = self.field(block, "MOTOR_TYPE");
        let speed = self.value_or(block, "MOTOR_SPEED", Order::Atomic, "100")?;
        self.include_original_library();
        let speed = self.nano_motor_speed(speed);
        stmt(format!("setMotor({motor}, {speed});\n"))
    }

    pub(super) fn original_move_motors(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let mut direction = self.field(block, "MOTOR_DIRECTION");
        let speed = self.value_or(block, "MOTOR_SPEED", Order::Atomic, "100")?;
        self.include_original_library();
        if self.config.robot.is_nano() {
            // Motors are mounted mirrored on the nano chassis.
            direction = match direction.as_str() {
                "1" => "2",
                "2" => "1",
                "3" => "4",
                "4" => "3",
                other => other,
            }
            .to_string();
        }
        let speed = self.nano_motor_speed(speed);
        stmt(format!("moveMotors({direction}, {speed});\n"))
    }

    pub(super) fn original_buzz(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.registry.add_include("arduino", "#include <Arduino.h>");
        self.registry.add_setup("tone", "pinMode(4, OUTPUT);", false);
        let frequency = self.value_or(block, "FREQUENCY", Order::Atomic, "0")?;
        let duration = self.value_or(block, "DURATION", Order::Atomic, "0")?;
        stmt(format!("tone(4, {frequency}, {duration});\n"))
    }

    fn setup_starling_servos(&mut self, block: BlockId) -> Result<()> {
        self.include_servo_header();
        for (side, pin) in [("left", "12"), ("right", "13")] {
            let name = format!("servo_{side}");
            self.registry
                .add_declaration(&name, format!("Servo {name};"), false, 0);
            self.registry
                .add_setup(&name, format!("{name}.attach({pin});"), false);
            self.reserve_pin(block, pin, PinType::Servo, "Servo Set");

            if self.builder.instance(&name).is_some() {
                continue;
            }
            let servo = self.builder.add(&name, ComponentKind::Servo);
            self.builder
                .wire((MURPHY, &format!("D{pin}")), (&servo, "pulse"), WireColor::Data1)?;
            self.builder
                .wire((MURPHY, &format!("D{pin}.3V3")), (&servo, "vcc"), WireColor::Vcc)?;
            self.builder
                .wire((MURPHY, &format!("D{pin}.GND")), (&servo, "gnd"), WireColor::Gnd)?;
        }
        Ok(())
    }

    pub(super) fn original_servo_set(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.setup_starling_servos(block)?;
        let motor = self.field(block, "MOTOR");
        let speed = self.value_or(block, "SPEED", Order::Atomic, "100")?;
        let direction = if motor == "left" { 1 } else { -1 };
        stmt(format!(
            "servo_{motor}.write(90 + 90*{speed}/100*{direction});\n"
        ))
    }

    pub(super) fn original_servo_move(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.setup_starling_servos(block)?;
        let (left, right) = match self.field(block, "DIRECTION").as_str() {
            "backward" => (-1, 1),
            "left" => (-1, -1),
            "right" => (1, 1),
            _ => (1, -1),
        };
        let speed = self.value_or(block, "SPEED", Order::Atomic, "100")?;
        stmt(format!(
            "servo_left.write(90 + 90*{speed}/100*{left});\nservo_right.write(90 + 90*{speed}/100*{right});\n"
        ))
    }
}
