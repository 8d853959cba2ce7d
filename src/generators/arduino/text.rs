use crate::error::Result;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr, quote};

impl ArduinoGenerator<'_> {
    pub(super) fn text(&mut self, block: BlockId) -> Result<ArduinoCode> {
        expr(quote(&self.field(block, "TEXT")), Order::Atomic)
    }

    pub(super) fn text_join(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let a = self.value_or(block, "ADD0", Order::None, "\"\"")?;
        let b = self.value_or(block, "ADD1", Order::None, "\"\"")?;
        expr(format!("String({a}) + String({b})"), Order::Atomic)
    }

    pub(super) fn text_length(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = self.value_or(block, "VALUE", Order::None, "\"\"")?;
        expr(format!("String({value}).length()"), Order::Atomic)
    }

    pub(super) fn text_char_at(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let at = self.value_or(block, "AT", Order::None, "0")?;
        let value = self.value_or(block, "VALUE", Order::None, "\"\"")?;
        expr(format!("String({value}[{at}])"), Order::Atomic)
    }

    pub(super) fn text_includes(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = self.value_or(block, "VALUE", Order::None, "\"\"")?;
        let check = self.value_or(block, "CHECK", Order::None, "\"\"")?;
        expr(format!("String({value}).indexOf({check}) != -1"), Order::Atomic)
    }

    pub(super) fn text_to_double(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = self.value_or(block, "VALUE", Order::UnaryPostfix, "\"0\"")?;
        expr(format!("String({value}).toDouble()"), Order::Atomic)
    }
}
