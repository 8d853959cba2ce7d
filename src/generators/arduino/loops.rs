use crate::error::Result;
use crate::workspace::{BlockGraph, BlockId, BlockKind};

use super::{ArduinoCode, ArduinoGenerator, Order, stmt};

const LOOP_KINDS: [BlockKind; 4] = [
    BlockKind::ControlsRepeatExt,
    BlockKind::ControlsRepeatForever,
    BlockKind::ControlsWhileUntil,
    BlockKind::ControlsFor,
];

fn enclosing_loop(graph: &dyn BlockGraph, block: BlockId) -> Option<BlockId> {
    let mut current = graph.surround_parent(block);
    while let Some(parent) = current {
        if LOOP_KINDS.contains(&graph.kind(parent)) {
            return Some(parent);
        }
        current = graph.surround_parent(parent);
    }
    None
}

impl ArduinoGenerator<'_> {
    pub(super) fn controls_repeat_ext(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let times = self.value_or(block, "TIMES", Order::Assignment, "0")?;
        let branch = self.statement_to_code(block, "DO")?;
        let counter = self.names.get(&format!("loop:{}", block.0), "count");
        stmt(format!(
            "for (int {counter} = 0; {counter} < {times}; {counter}++) {{\n{branch}}}\n"
        ))
    }

    pub(super) fn controls_repeat_forever(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let branch = self.statement_to_code(block, "DO")?;
        stmt(format!("while (true) {{\n{branch}}}\n"))
    }

    pub(super) fn controls_while_until(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let until = self.field(block, "MODE") == "UNTIL";
        let cond = if until {
            let c = self.value_or(block, "BOOL", Order::UnaryPrefix, "false")?;
            format!("!{c}")
        } else {
            self.value_or(block, "BOOL", Order::None, "false")?
        };
        let branch = self.statement_to_code(block, "DO")?;
        stmt(format!("while ({cond}) {{\n{branch}}}\n"))
    }

    pub(super) fn controls_for(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let var_id = self.field(block, "VAR");
        let var = self.variable_name(&var_id);
        let from = self.value_or(block, "FROM", Order::Assignment, "0")?;
        let to = self.value_or(block, "TO", Order::Assignment, "0")?;
        let by = self.value_or(block, "BY", Order::Assignment, "1")?;
        let branch = self.statement_to_code(block, "DO")?;

        let literal = |s: &str| s.parse::<f64>().ok();
        let head = match (literal(&from), literal(&to), literal(&by)) {
            (Some(f), Some(t), Some(step)) => {
                let up = f <= t;
                let step = step.abs();
                let cmp = if up { "<=" } else { ">=" };
                let inc = match (up, step == 1.0) {
                    (true, true) => format!("{var}++"),
                    (false, true) => format!("{var}--"),
                    (true, false) => format!("{var} += {step}"),
                    (false, false) => format!("{var} -= {step}"),
                };
                format!("for ({var} = {from}; {var} {cmp} {to}; {inc})")
            }
            // Direction only known at run time.
            _ => format!(
                "for ({var} = {from}; ({from}) <= ({to}) ? {var} <= ({to}) : {var} >= ({to}); \
                 {var} += ({from}) <= ({to}) ? abs({by}) : -abs({by}))"
            ),
        };
        stmt(format!("{head} {{\n{branch}}}\n"))
    }

    pub(super) fn controls_flow_statements(&mut self, block: BlockId) -> Result<ArduinoCode> {
        if enclosing_loop(&*self.graph, block).is_none() {
            self.warn(
                block,
                "flow",
                Some("This block may only be used within a loop.".to_string()),
            );
            return stmt("");
        }
        self.warn(block, "flow", None);
        match self.field(block, "FLOW").as_str() {
            "CONTINUE" => stmt("continue;\n"),
            _ => stmt("break;\n"),
        }
    }
}
