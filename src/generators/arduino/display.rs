//! 128x32 SSD1306 and 128x64 SH1106 OLED displays. Every block first calls
//! the display's per-channel setup so it works behind the multiplexer.

use crate::error::Result;
use crate::registry::Dependency;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, stmt};

/// Pixel height of one text row at text size 1.
const ROW_HEIGHT: i64 = 12;

impl ArduinoGenerator<'_> {
    fn display_setup(&mut self, large: bool) -> String {
        let (begin, white) = if large {
            ("0x3C, true", "SH110X_WHITE")
        } else {
            ("SSD1306_SWITCHCAPVCC, 0x3C", "SSD1306_WHITE")
        };
        let code = format!(
            "if (!display.begin({begin})) {{\n        \
             Serial.println(F(\"Contact with the display failed: Check the connections\"));\n      }}\n\n      \
             display.clearDisplay();\n      display.setTextSize(1);\n      display.setTextColor({white});\n      \
             display.setCursor(0, 0);\n      display.println(F(\"Leaphy OLED\"));\n      display.display();\n"
        );
        let setup = self.add_i2c_setup("oled", &code);

        if large {
            self.registry.add_dependency(&[Dependency::AdafruitSh110xOled]);
            self.registry
                .add_include("include_display", "#include <Adafruit_SH110X.h>");
            self.registry.add_include(
                "define_display",
                "Adafruit_SH1106G display(128, 64, &Wire, -1);",
            );
        } else {
            self.registry.add_dependency(&[Dependency::AdafruitSsd1306Oled]);
            self.registry
                .add_include("include_display", "#include <Adafruit_SSD1306.h>");
            self.registry.add_include(
                "define_display",
                "Adafruit_SSD1306 display(128, 32, &Wire, -1);",
            );
        }
        self.registry
            .add_setup("serial", "Serial.begin(115200);", false);
        setup
    }

    fn cursor_height(&self, block: BlockId) -> i64 {
        let row = self
            .graph
            .field(block, "DISPLAY_ROW")
            .and_then(|r| r.parse::<i64>().ok())
            .unwrap_or(0);
        row * ROW_HEIGHT
    }

    pub(super) fn display_clear(&mut self, _block: BlockId, large: bool) -> Result<ArduinoCode> {
        let setup = self.display_setup(large);
        stmt(format!("{setup}display.clearDisplay();\n"))
    }

    pub(super) fn display_set_text_size(&mut self, block: BlockId, large: bool) -> Result<ArduinoCode> {
        let setup = self.display_setup(large);
        let size = self.value_or(block, "NUM", Order::Atomic, "0")?;
        stmt(format!("{setup}display.setTextSize({size});\n"))
    }

    pub(super) fn display_print_line(&mut self, block: BlockId, large: bool) -> Result<ArduinoCode> {
        let setup = self.display_setup(large);
        let value = self.value_or(block, "VALUE", Order::Atomic, "0")?;
        let height = self.cursor_height(block);
        stmt(format!(
            "{setup}display.setCursor(0, {height});\ndisplay.println({value});\n"
        ))
    }

    pub(super) fn display_print_value(&mut self, block: BlockId, large: bool) -> Result<ArduinoCode> {
        let setup = self.display_setup(large);
        let name = self.value_or(block, "NAME", Order::Atomic, "0")?;
        let value = self.value_or(block, "VALUE", Order::Atomic, "0")?;
        let height = self.cursor_height(block);
        stmt(format!(
            "{setup}display.setCursor(0, {height});\ndisplay.print({name});\ndisplay.print(\" = \");\ndisplay.println({value});\n"
        ))
    }

    pub(super) fn display_display(&mut self, _block: BlockId, large: bool) -> Result<ArduinoCode> {
        let setup = self.display_setup(large);
        stmt(format!("{setup}display.display();\n"))
    }
}
