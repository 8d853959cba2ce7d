//! Distance, colour and gas sensors.

use crate::error::Result;
use crate::registry::Dependency;
use crate::schematic::{ComponentKind, MURPHY_I2C, WireColor};
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr};

const TCS_SETUP: &str = "if (tcs.begin()) {\n    Serial.println(\"RGB-sensor gevonden!\");\n  } else {\n    \
                         Serial.println(\"Geen RGB-sensor gevonden... check je verbindingen...\");\n  }\n";

const GAS_READ: &str = "  switch (kind) {
    case 0:
      return sgp.IAQmeasure() ? sgp.TVOC : -1;
    case 1:
      return sgp.IAQmeasure() ? sgp.eCO2 : -1;
    case 2:
      return sgp.IAQmeasureRaw() ? sgp.rawH2 : -1;
    case 3:
      return sgp.IAQmeasureRaw() ? sgp.rawEthanol : -1;
  }
  return -1;
}
";

impl ArduinoGenerator<'_> {
    /// Register the VL53L0X globals and return the read expression.
    pub(super) fn tof_read(&mut self) -> String {
        self.registry.add_dependency(&[Dependency::AdafruitVl53l0xTof]);
        self.registry
            .add_include("leaphy_tof", "#include <Adafruit_VL53L0X.h>");
        self.registry
            .add_declaration("leaphy_tof", "Adafruit_VL53L0X i2c_distance;", false, 0);
        let setup = self.add_i2c_setup(
            "tof",
            "i2c_distance.begin();\n      i2c_distance.setMeasurementTimingBudgetMicroSeconds(20000);\n",
        );
        self.registry.add_declaration(
            "leaphy_tof_read",
            format!(
                "int getTOF() {{\n    {setup}\n    VL53L0X_RangingMeasurementData_t measure;\n    \
                 i2c_distance.rangingTest(&measure, false);\n    if (measure.RangeStatus == 4) return -1;\n    \
                 delay(33);\n    return measure.RangeMilliMeter;\n}}"
            ),
            false,
            0,
        );
        "getTOF()".to_string()
    }

    pub(super) fn tof_get_distance(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let code = self.tof_read();
        self.add_i2c_device("tof", block, ComponentKind::Tof)?;
        expr(code, Order::Atomic)
    }

    pub(super) fn sonar_distance(&mut self, trig: &str, echo: &str) -> String {
        self.registry.add_dependency(&[Dependency::LeaphyExtensions]);
        self.registry
            .add_include("leaphy_extra", "#include \"Leaphy_Extra.h\"");
        format!("getDistanceSonar({trig}, {echo})")
    }

    pub(super) fn sonar_read(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let trig = self.field(block, "TRIG_PIN");
        let echo = self.field(block, "ECHO_PIN");
        let code = self.sonar_distance(&trig, &echo);

        if self.builder.instance("sonar").is_none() {
            let sonar = self.builder.add("sonar", ComponentKind::Ultrasonic);
            self.builder
                .wire((MURPHY_I2C, "TRIG"), (&sonar, "TRIG"), WireColor::Data1)?;
            self.builder
                .wire((MURPHY_I2C, "ECHO"), (&sonar, "ECHO"), WireColor::Data2)?;
            self.builder
                .wire((MURPHY_I2C, "VCC"), (&sonar, "VCC"), WireColor::Vcc)?;
            self.builder
                .wire((MURPHY_I2C, "GND"), (&sonar, "GND"), WireColor::Gnd)?;
        }
        expr(code, Order::Atomic)
    }

    /// Register the TCS34725 globals and the `getColor` helper.
    fn rgb_color_definitions(&mut self) {
        let setup = self.add_i2c_setup("rgb_color", TCS_SETUP);
        self.registry
            .add_include("define_leaphy_rgb", "#include \"Adafruit_TCS34725.h\"");
        self.registry.add_include(
            "define_leaphy_rgb_var",
            "Adafruit_TCS34725 tcs = Adafruit_TCS34725(TCS34725_INTEGRATIONTIME_24MS, TCS34725_GAIN_16X);\n",
        );
        self.registry.add_declaration(
            "define_get_color",
            format!(
                "double getColor(int colorCode, bool isRaw) {{\n  {setup}  \
                 uint16_t RawColor_Red, RawColor_Green, RawColor_Blue, RawColor_Clear;\n  \
                 byte Color_Red, Color_Green, Color_Blue, Color_Clear;\n  \
                 tcs.getRawData(&RawColor_Red, &RawColor_Green, &RawColor_Blue, &RawColor_Clear);\n  \
                 Color_Red = min(RawColor_Red/5,255); Color_Green = min(RawColor_Green/5,255); Color_Blue = min(RawColor_Blue/5,255);\n  \
                 switch(colorCode) {{\n    case 0:\n      return (isRaw) ? RawColor_Red : Color_Red;\n    \
                 case 1:\n      return (isRaw) ? RawColor_Green : Color_Green;\n    \
                 case 2:\n      return (isRaw) ? RawColor_Blue : Color_Blue;\n  }}\n  return 0;\n}}\n"
            ),
            false,
            0,
        );
    }

    pub(super) fn rgb_color(&mut self, block: BlockId, raw: bool) -> Result<ArduinoCode> {
        self.rgb_color_definitions();
        let slot = if raw { "COLOR_TYPE_RAW" } else { "COLOR_TYPE" };
        let color = self.field(block, slot);
        expr(format!("getColor({color}, {raw})"), Order::Atomic)
    }

    /// Raw reading of one colour channel: 0 red, 1 green, 2 blue.
    pub(super) fn rgb_raw_channel(&mut self, channel: u8) -> Result<ArduinoCode> {
        self.rgb_color_definitions();
        expr(format!("getColor({channel}, true)"), Order::Atomic)
    }

    pub(super) fn gas_sensor(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.registry.add_dependency(&[Dependency::AdafruitSgp30Gas]);
        self.registry
            .add_include("leaphy_gas", "#include \"Adafruit_SGP30.h\"");
        self.registry
            .add_declaration("leaphy_gas", "Adafruit_SGP30 sgp;", false, 0);
        let setup = self.add_i2c_setup("gas", "sgp.begin();\n");
        self.registry.add_declaration(
            "leaphy_gas_read",
            format!("int getGasValue(int kind) {{\n  {setup}{GAS_READ}"),
            false,
            0,
        );
        self.add_i2c_device("gas", block, ComponentKind::Gas)?;

        let kind = match self.field(block, "GAS").as_str() {
            "eCO2" => 1,
            "Raw H2" => 2,
            "RAWETHANOL" => 3,
            _ => 0,
        };
        expr(format!("getGasValue({kind})"), Order::Atomic)
    }
}
