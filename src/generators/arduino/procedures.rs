//! User-defined functions. Parameters and the procedure name come from the
//! serialized mutator state; return types come from type inference.

use serde_json::Value;

use crate::error::Result;
use crate::inference::procedure_name;
use crate::workspace::{BlockGraph, BlockId, BlockKind, ValueType};

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

/// `(id, name)` of each parameter. Older serializations list bare names.
fn params(graph: &dyn BlockGraph, block: BlockId) -> Vec<(String, String)> {
    let Some(list) = graph
        .extra_state(block)
        .and_then(|s| s.get("params"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|p| match p {
            Value::String(name) => Some((name.clone(), name.clone())),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str)?.to_string();
                let id = map
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| name.clone());
                Some((id, name))
            }
            _ => None,
        })
        .collect()
}

impl ArduinoGenerator<'_> {
    fn procedure_ident(&mut self, block: BlockId) -> String {
        let name = procedure_name(&*self.graph, block).unwrap_or_default();
        self.names.get(&format!("proc:{name}"), &name)
    }

    fn param_ident(&mut self, id: &str, name: &str) -> String {
        if self.graph.variables().item(id).is_some() {
            self.variable_name(id)
        } else {
            self.names.get(&format!("var:{id}"), name)
        }
    }

    pub(super) fn procedures_def(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let ident = self.procedure_ident(block);
        let args: Vec<String> = params(&*self.graph, block)
            .into_iter()
            .map(|(id, name)| {
                let ty = self.types.variable(&id).arduino_type();
                format!("{ty} {}", self.param_ident(&id, &name))
            })
            .collect();

        let body = self.statement_to_code(block, "STACK")?;
        let (ret_type, ret) = if self.graph.kind(block) == BlockKind::ProceduresDefReturn {
            let name = procedure_name(&*self.graph, block).unwrap_or_default();
            let ty = self
                .types
                .procedures
                .get(&name)
                .copied()
                .unwrap_or(ValueType::Number);
            let value = self.value_or(block, "RETURN", Order::None, ty.arduino_default())?;
            (ty.arduino_type(), format!("  return {value};\n"))
        } else {
            ("void", String::new())
        };

        let code = format!("{ret_type} {ident}({}) {{\n{body}{ret}}}\n", args.join(", "));
        self.registry
            .add_declaration(&format!("proc_{ident}"), code, true, 0);
        stmt("")
    }

    fn call_args(&mut self, block: BlockId) -> Result<String> {
        let mut count = params(&*self.graph, block).len();
        while self.graph.input_target(block, &format!("ARG{count}")).is_some() {
            count += 1;
        }
        let mut args = Vec::with_capacity(count);
        for n in 0..count {
            args.push(self.value_or(block, &format!("ARG{n}"), Order::None, "0")?);
        }
        Ok(args.join(", "))
    }

    pub(super) fn procedures_call_no_return(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let ident = self.procedure_ident(block);
        let args = self.call_args(block)?;
        stmt(format!("{ident}({args});\n"))
    }

    pub(super) fn procedures_call_return(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let ident = self.procedure_ident(block);
        let args = self.call_args(block)?;
        expr(format!("{ident}({args})"), Order::UnaryPostfix)
    }

    pub(super) fn procedures_if_return(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let cond = self.value_or(block, "CONDITION", Order::None, "false")?;
        let root = self.graph.root(block);
        let ret = if self.graph.kind(root) == BlockKind::ProceduresDefReturn {
            let value = self.value_or(block, "VALUE", Order::None, "0")?;
            format!("return {value};")
        } else {
            "return;".to_string()
        };
        stmt(format!("if ({cond}) {{\n  {ret}\n}}\n"))
    }
}
