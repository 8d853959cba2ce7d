//! List blocks, backed by the `List` Arduino library.

use crate::error::Result;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

impl ArduinoGenerator<'_> {
    /// Identifier of the list a block points at, `None` when it is gone.
    fn list_name(&mut self, block: BlockId) -> Option<String> {
        let id = self.field(block, "LIST");
        let Some(name) = self.graph.lists().item(&id).map(|l| l.ident()) else {
            tracing::warn!(list = %id, "block refers to a deleted list");
            return None;
        };
        Some(self.names.get(&format!("list:{id}"), &name))
    }

    pub(super) fn lists_add(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let Some(name) = self.list_name(block) else {
            return stmt("");
        };
        let value = self.value_or(block, "VALUE", Order::Atomic, "0")?;
        stmt(format!("{name}.add({value});\n"))
    }

    pub(super) fn lists_delete(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let Some(name) = self.list_name(block) else {
            return stmt("");
        };
        let index = self.value_or(block, "INDEX", Order::Atomic, "0")?;
        stmt(format!("{name}.remove({index});\n"))
    }

    pub(super) fn lists_clear(&mut self, block: BlockId) -> Result<ArduinoCode> {
        match self.list_name(block) {
            Some(name) => stmt(format!("{name}.clear();\n")),
            None => stmt(""),
        }
    }

    pub(super) fn lists_insert(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let Some(name) = self.list_name(block) else {
            return stmt("");
        };
        let value = self.value_or(block, "VALUE", Order::Atomic, "0")?;
        let index = self.value_or(block, "INDEX", Order::Atomic, "0")?;
        stmt(format!("{name}.addAtIndex({index}, {value});\n"))
    }

    pub(super) fn lists_get(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let Some(name) = self.list_name(block) else {
            return expr("0", Order::Atomic);
        };
        let index = self.value_or(block, "INDEX", Order::Atomic, "0")?;
        expr(format!("{name}.get({index})"), Order::Atomic)
    }

    pub(super) fn lists_replace(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let Some(name) = self.list_name(block) else {
            return stmt("");
        };
        let value = self.value_or(block, "VALUE", Order::Atomic, "0")?;
        let index = self.value_or(block, "INDEX", Order::Atomic, "0")?;
        stmt(format!(
            "{name}.remove({index});\n{name}.addAtIndex({index}, {value});\n"
        ))
    }

    pub(super) fn lists_length(&mut self, block: BlockId) -> Result<ArduinoCode> {
        match self.list_name(block) {
            Some(name) => expr(format!("{name}.getSize()"), Order::Atomic),
            None => expr("0", Order::Atomic),
        }
    }
}
