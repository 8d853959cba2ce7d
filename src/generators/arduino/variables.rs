use crate::error::Result;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

impl ArduinoGenerator<'_> {
    pub(super) fn variables_get(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let id = self.field(block, "VAR");
        expr(self.variable_name(&id), Order::Atomic)
    }

    pub(super) fn variables_set(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let id = self.field(block, "VAR");
        let value = self.value_or(block, "VALUE", Order::Assignment, "0")?;
        let name = self.variable_name(&id);
        stmt(format!("{name} = {value};\n"))
    }
}
