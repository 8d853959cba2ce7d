//! Program structure: the start block, delays and the serial monitor.

use crate::error::Result;
use crate::registry::USER_SETUP_TAG;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

impl ArduinoGenerator<'_> {
    /// The start block's stack becomes `leaphyProgram()`, called once at the
    /// end of `setup()`.
    pub(super) fn leaphy_start(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let branch = self.statement_to_code(block, "STACK")?;
        self.registry.add_declaration(
            "leaphy_program",
            format!("void leaphyProgram() {{\n{branch}}}\n"),
            false,
            0,
        );
        self.registry
            .add_setup(USER_SETUP_TAG, "leaphyProgram();", false);
        stmt("")
    }

    pub(super) fn time_delay(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let ms = self.value_or(block, "DELAY_TIME_MILI", Order::Atomic, "0")?;
        stmt(format!("delay({ms});\n"))
    }

    pub(super) fn serial_print_line(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = self.value_or(block, "VALUE", Order::None, "\"\"")?;
        stmt(format!("Serial.println({value});\n"))
    }

    pub(super) fn serial_print_value(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let name = self.value_or(block, "NAME", Order::None, "\"\"")?;
        let value = self.value_or(block, "VALUE", Order::None, "0")?;
        stmt(format!(
            "Serial.print({name});\nSerial.print(\" = \");\nSerial.println({value});\n"
        ))
    }

    pub(super) fn serial_available(&mut self) -> Result<ArduinoCode> {
        expr("Serial.available()", Order::UnaryPostfix)
    }

    pub(super) fn serial_read_line(&mut self) -> Result<ArduinoCode> {
        expr("Serial.readStringUntil('\\n')", Order::UnaryPostfix)
    }
}
