//! Type inference over user variables, lists and value-returning procedures.
//!
//! Runs once at the start of every pass. Writer sites decide the type of a
//! variable or list; reader sites get their output check set to it so the
//! editor can type-check whatever is plugged into them. Disagreeing writers
//! get a warning and the type falls back to `Number`.

use indexmap::IndexMap;

use crate::workspace::{BlockGraph, BlockId, BlockKind, ValueType};

const LIST_WRITERS: [BlockKind; 3] = [
    BlockKind::ListsAdd,
    BlockKind::ListsInsert,
    BlockKind::ListsReplace,
];

/// Inferred types, keyed by variable id, list id and procedure name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceResult {
    pub variables: IndexMap<String, ValueType>,
    pub lists: IndexMap<String, ValueType>,
    pub procedures: IndexMap<String, ValueType>,
}

impl InferenceResult {
    pub fn variable(&self, id: &str) -> ValueType {
        self.variables.get(id).copied().unwrap_or(ValueType::Number)
    }

    pub fn list(&self, id: &str) -> ValueType {
        self.lists.get(id).copied().unwrap_or(ValueType::Number)
    }
}

pub fn infer(graph: &mut dyn BlockGraph) -> InferenceResult {
    let mut result = InferenceResult::default();
    infer_variables(graph, &mut result);
    infer_procedures(graph, &mut result);
    infer_lists(graph, &mut result);
    tracing::debug!(
        variables = result.variables.len(),
        lists = result.lists.len(),
        procedures = result.procedures.len(),
        "type inference done"
    );
    result
}

fn type_list(types: &[Option<ValueType>]) -> String {
    types
        .iter()
        .map(|t| t.map(ValueType::as_str).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Settle the type written by `writers` through their `VALUE` slots.
/// Disagreeing writers all get a warning and the type falls back to `Number`.
fn resolve_writers(graph: &mut dyn BlockGraph, writers: &[BlockId], what: &str) -> ValueType {
    let types: Vec<Option<ValueType>> = writers
        .iter()
        .map(|w| graph.target_check(*w, "VALUE"))
        .collect();

    let first = types.iter().flatten().next().copied();
    let conflict = types.iter().flatten().any(|t| Some(*t) != first);
    let warning = conflict.then(|| format!("{what} has conflicting types: {}", type_list(&types)));
    for w in writers {
        graph.set_warning(*w, warning.clone(), "");
    }

    if conflict {
        ValueType::Number
    } else {
        first.unwrap_or(ValueType::Number)
    }
}

fn infer_variables(graph: &mut dyn BlockGraph, result: &mut InferenceResult) {
    let setters = graph.blocks_of_kind(BlockKind::VariablesSet);
    let getters = graph.blocks_of_kind(BlockKind::VariablesGet);
    let ids: Vec<String> = graph.variables().items().map(|v| v.id.clone()).collect();

    for id in ids {
        let writers: Vec<BlockId> = setters
            .iter()
            .copied()
            .filter(|b| graph.field(*b, "VAR") == Some(id.as_str()))
            .collect();
        let ty = resolve_writers(graph, &writers, "Variable");
        for g in &getters {
            if graph.field(*g, "VAR") == Some(id.as_str()) {
                graph.set_output_check(*g, Some(ty));
            }
        }
        result.variables.insert(id, ty);
    }
}

fn infer_lists(graph: &mut dyn BlockGraph, result: &mut InferenceResult) {
    // Writers pointing at a list the manager no longer knows still get checked.
    let mut writers: IndexMap<String, Vec<BlockId>> = graph
        .lists()
        .items()
        .map(|l| (l.id.clone(), Vec::new()))
        .collect();
    for kind in LIST_WRITERS {
        for block in graph.blocks_of_kind(kind) {
            let list = graph.field(block, "LIST").unwrap_or_default().to_string();
            writers.entry(list).or_default().push(block);
        }
    }

    let getters = graph.blocks_of_kind(BlockKind::ListsGet);
    for (id, sites) in writers {
        let ty = resolve_writers(graph, &sites, "List");
        for g in &getters {
            if graph.field(*g, "LIST") == Some(id.as_str()) {
                graph.set_output_check(*g, Some(ty));
            }
        }
        result.lists.insert(id, ty);
    }
}

/// Name of the procedure a definition declares or a call site invokes.
pub fn procedure_name(graph: &dyn BlockGraph, block: BlockId) -> Option<String> {
    if let Some(name) = graph.field(block, "NAME") {
        return Some(name.to_string());
    }
    graph
        .extra_state(block)
        .and_then(|s| s.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string)
}

fn infer_procedures(graph: &mut dyn BlockGraph, result: &mut InferenceResult) {
    let calls = graph.blocks_of_kind(BlockKind::ProceduresCallReturn);
    let returns = graph.blocks_of_kind(BlockKind::ProceduresIfReturn);

    for def in graph.blocks_of_kind(BlockKind::ProceduresDefReturn) {
        let ty = graph.target_check(def, "RETURN").unwrap_or(ValueType::Number);
        let name = procedure_name(graph, def).unwrap_or_default();

        for call in &calls {
            if procedure_name(graph, *call).as_deref() == Some(name.as_str()) {
                graph.set_output_check(*call, Some(ty));
            }
        }
        for ret in &returns {
            if graph.root(*ret) == def {
                graph.set_input_check(*ret, "VALUE", Some(ty));
            }
        }
        result.procedures.insert(name, ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;
    use pretty_assertions::assert_eq;

    fn setter(ws: &mut Workspace, var: &str, value: Option<BlockKind>) -> BlockId {
        let s = ws.add_block(BlockKind::VariablesSet);
        ws.set_field(s, "VAR", var);
        if let Some(kind) = value {
            let v = ws.add_block(kind);
            ws.connect_input(s, "VALUE", v);
        }
        s
    }

    fn workspace_with_var() -> Workspace {
        let mut ws = Workspace::new();
        ws.variables.add("x", "x");
        ws
    }

    #[test]
    fn test_agreeing_writers() {
        let mut ws = workspace_with_var();
        let a = setter(&mut ws, "x", Some(BlockKind::MathNumber));
        let b = setter(&mut ws, "x", Some(BlockKind::MathArithmetic));
        let g = ws.add_block(BlockKind::VariablesGet);
        ws.set_field(g, "VAR", "x");

        let result = infer(&mut ws);
        assert_eq!(result.variable("x"), ValueType::Number);
        assert_eq!(ws.block(a).warning_text(), None);
        assert_eq!(ws.block(b).warning_text(), None);
        assert_eq!(ws.output_check(g), Some(ValueType::Number));
    }

    #[test]
    fn test_conflicting_writers() {
        let mut ws = workspace_with_var();
        let a = setter(&mut ws, "x", Some(BlockKind::MathNumber));
        let b = setter(&mut ws, "x", Some(BlockKind::Text));

        let result = infer(&mut ws);
        assert_eq!(result.variable("x"), ValueType::Number);
        for w in [a, b] {
            assert_eq!(
                ws.block(w).warning_text().as_deref(),
                Some("Variable has conflicting types: Number, String")
            );
        }
    }

    #[test]
    fn test_string_variable_flows_to_getter() {
        let mut ws = workspace_with_var();
        setter(&mut ws, "x", None);
        setter(&mut ws, "x", Some(BlockKind::Text));
        let g = ws.add_block(BlockKind::VariablesGet);
        ws.set_field(g, "VAR", "x");

        let result = infer(&mut ws);
        assert_eq!(result.variable("x"), ValueType::String);
        assert_eq!(ws.output_check(g), Some(ValueType::String));
    }

    #[test]
    fn test_second_pass_is_stable() {
        let mut ws = workspace_with_var();
        setter(&mut ws, "x", Some(BlockKind::LogicBoolean));
        let first = infer(&mut ws);
        let second = infer(&mut ws);
        assert_eq!(first, second);
        assert_eq!(second.variable("x"), ValueType::Boolean);
    }

    #[test]
    fn test_conflict_cleared_after_fix() {
        let mut ws = workspace_with_var();
        let a = setter(&mut ws, "x", Some(BlockKind::MathNumber));
        let b = setter(&mut ws, "x", Some(BlockKind::Text));
        infer(&mut ws);
        assert!(ws.block(a).warning_text().is_some());

        let n = ws.add_block(BlockKind::MathNumber);
        ws.connect_input(b, "VALUE", n);
        infer(&mut ws);
        assert_eq!(ws.block(a).warning_text(), None);
        assert_eq!(ws.block(b).warning_text(), None);
    }

    #[test]
    fn test_list_conflict_falls_back_to_number() {
        let mut ws = Workspace::new();
        ws.lists.add("l", "scores");
        let add = ws.add_block(BlockKind::ListsAdd);
        ws.set_field(add, "LIST", "l");
        let t = ws.add_block(BlockKind::Text);
        ws.connect_input(add, "VALUE", t);
        let ins = ws.add_block(BlockKind::ListsInsert);
        ws.set_field(ins, "LIST", "l");
        let n = ws.add_block(BlockKind::MathNumber);
        ws.connect_input(ins, "VALUE", n);
        let get = ws.add_block(BlockKind::ListsGet);
        ws.set_field(get, "LIST", "l");

        let result = infer(&mut ws);
        assert_eq!(result.list("l"), ValueType::Number);
        for writer in [add, ins] {
            assert_eq!(
                ws.block(writer).warning_text().as_deref(),
                Some("List has conflicting types: String, Number")
            );
        }
        assert_eq!(ws.output_check(get), Some(ValueType::Number));
    }

    #[test]
    fn test_agreeing_list_writers_set_reader_type() {
        let mut ws = Workspace::new();
        ws.lists.add("l", "names");
        let add = ws.add_block(BlockKind::ListsAdd);
        ws.set_field(add, "LIST", "l");
        let t = ws.add_block(BlockKind::Text);
        ws.connect_input(add, "VALUE", t);
        let get = ws.add_block(BlockKind::ListsGet);
        ws.set_field(get, "LIST", "l");

        let result = infer(&mut ws);
        assert_eq!(result.list("l"), ValueType::String);
        assert_eq!(ws.block(add).warning_text(), None);
        assert_eq!(ws.output_check(get), Some(ValueType::String));
    }

    #[test]
    fn test_procedure_return_type() {
        let mut ws = Workspace::new();
        let def = ws.add_block(BlockKind::ProceduresDefReturn);
        ws.set_field(def, "NAME", "greeting");
        let t = ws.add_block(BlockKind::Text);
        ws.connect_input(def, "RETURN", t);
        let ret = ws.add_block(BlockKind::ProceduresIfReturn);
        ws.connect_input(def, "STACK", ret);
        let call = ws.add_block(BlockKind::ProceduresCallReturn);
        ws.set_extra_state(call, serde_json::json!({ "name": "greeting" }));
        let other = ws.add_block(BlockKind::ProceduresCallReturn);
        ws.set_extra_state(other, serde_json::json!({ "name": "elsewhere" }));

        let result = infer(&mut ws);
        assert_eq!(result.procedures.get("greeting"), Some(&ValueType::String));
        assert_eq!(ws.output_check(call), Some(ValueType::String));
        assert_eq!(ws.output_check(other), None);
        assert_eq!(ws.input_check(ret, "VALUE"), Some(ValueType::String));
    }
}
