use crate::error::Result;
use crate::workspace::{BlockGraph, BlockId};

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

/// Number of `IFn` branches: the mutator count when present, otherwise
/// whatever inputs the block carries.
fn branch_count(graph: &dyn BlockGraph, block: BlockId) -> usize {
    let from_state = graph
        .extra_state(block)
        .and_then(|s| s.get("elseIfCount"))
        .and_then(|n| n.as_u64())
        .map(|n| n as usize + 1)
        .unwrap_or(1);
    let from_inputs = graph
        .block(block)
        .inputs
        .keys()
        .filter_map(|k| k.strip_prefix("IF").or_else(|| k.strip_prefix("DO")))
        .filter_map(|n| n.parse::<usize>().ok())
        .map(|n| n + 1)
        .max()
        .unwrap_or(0);
    from_state.max(from_inputs)
}

impl ArduinoGenerator<'_> {
    pub(super) fn controls_if(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let mut code = String::new();
        for n in 0..branch_count(&*self.graph, block) {
            let cond = self.value_or(block, &format!("IF{n}"), Order::None, "false")?;
            let branch = self.statement_to_code(block, &format!("DO{n}"))?;
            if n > 0 {
                code.push_str(" else ");
            }
            code.push_str(&format!("if ({cond}) {{\n{branch}}}"));
        }
        let has_else = self
            .graph
            .extra_state(block)
            .and_then(|s| s.get("hasElse"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if has_else || self.graph.statement_target(block, "ELSE").is_some() {
            let branch = self.statement_to_code(block, "ELSE")?;
            code.push_str(&format!(" else {{\n{branch}}}"));
        }
        code.push('\n');
        stmt(code)
    }

    pub(super) fn logic_compare(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let (op, order, right) = match self.field(block, "OP").as_str() {
            "NEQ" => ("!=", Order::Equality, Order::Relational),
            "LT" => ("<", Order::Relational, Order::Shift),
            "LTE" => ("<=", Order::Relational, Order::Shift),
            "GT" => (">", Order::Relational, Order::Shift),
            "GTE" => (">=", Order::Relational, Order::Shift),
            _ => ("==", Order::Equality, Order::Relational),
        };
        let a = self.value_or(block, "A", order, "0")?;
        let b = self.value_or(block, "B", right, "0")?;
        expr(format!("{a} {op} {b}"), order)
    }

    pub(super) fn logic_operation(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let (op, order) = if self.field(block, "OP") == "OR" {
            ("||", Order::LogicalOr)
        } else {
            ("&&", Order::LogicalAnd)
        };
        let mut a = self.value_to_code(block, "A", order)?;
        let mut b = self.value_to_code(block, "B", order)?;
        if a.is_empty() && b.is_empty() {
            a = "false".into();
            b = "false".into();
        } else {
            // A missing operand must not change the result.
            let neutral = if op == "&&" { "true" } else { "false" };
            if a.is_empty() {
                a = neutral.into();
            }
            if b.is_empty() {
                b = neutral.into();
            }
        }
        expr(format!("{a} {op} {b}"), order)
    }

    pub(super) fn logic_negate(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = self.value_or(block, "BOOL", Order::UnaryPrefix, "true")?;
        expr(format!("!{value}"), Order::UnaryPrefix)
    }

    pub(super) fn logic_boolean(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let value = if self.field(block, "BOOL") == "TRUE" { "true" } else { "false" };
        expr(value, Order::Atomic)
    }

    pub(super) fn logic_ternary(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let cond = self.value_or(block, "IF", Order::LogicalOr, "false")?;
        let then = self.value_or(block, "THEN", Order::Conditional, "0")?;
        let otherwise = self.value_or(block, "ELSE", Order::Conditional, "0")?;
        expr(format!("{cond} ? {then} : {otherwise}"), Order::Conditional)
    }
}
