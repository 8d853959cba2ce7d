//! painlessMesh networking. Signals are plain strings sent between nodes.

use crate::error::Result;
use crate::registry::Dependency;
use crate::workspace::{BlockId, BlockKind};

use super::{ArduinoCode, ArduinoGenerator, Order, quote, stmt};

impl ArduinoGenerator<'_> {
    /// Current name of the signal a block points at.
    fn signal_name(&self, block: BlockId) -> Option<String> {
        let id = self.graph.field(block, "SIGNAL")?;
        let name = self.graph.signals().item(id).map(|s| s.name.clone());
        if name.is_none() {
            tracing::warn!(signal = id, "block refers to a deleted signal");
        }
        name
    }

    pub(super) fn mesh_setup(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.registry
            .add_dependency(&[Dependency::PainlessMesh, Dependency::AsyncTcp]);
        self.registry.add_include("mesh", "#include <painlessMesh.h>");
        self.registry
            .add_declaration("mesh", "painlessMesh mesh;", true, 3);
        self.registry
            .add_declaration("node_sender", "uint32_t node_sender;", true, 3);

        let mut callback =
            String::from("void receivedCallback(uint32_t from, String &msg) {\n  node_sender = from;\n");
        for handler in self.graph.blocks_of_kind(BlockKind::MeshOnSignal) {
            let Some(signal) = self.signal_name(handler) else {
                continue;
            };
            let body = self.statement_to_code(handler, "STACK")?;
            let body: Vec<String> = body.split('\n').map(|line| format!("  {line}")).collect();
            callback.push_str(&format!(
                "  if (msg == {}) {{\n{}}}\n",
                quote(&signal),
                body.join("\n")
            ));
        }
        callback.push_str("}\n");
        self.registry
            .add_declaration("mesh_receiver", callback, true, 1);

        let name = self.field(block, "NAME");
        self.registry.add_setup(
            "MESH",
            format!(
                "mesh.init({}, \"Leaphy123\");\n  mesh.onReceive(&receivedCallback);",
                quote(&name)
            ),
            false,
        );
        stmt("")
    }

    pub(super) fn mesh_call_signal(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let Some(signal) = self.signal_name(block) else {
            return stmt("");
        };
        let recipient = self.value_to_code(block, "RECIPIENT", Order::None)?;
        stmt(format!("mesh.sendSingle({recipient}, {});\n", quote(&signal)))
    }

    pub(super) fn mesh_broadcast_signal(&mut self, block: BlockId) -> Result<ArduinoCode> {
        match self.signal_name(block) {
            Some(signal) => stmt(format!("mesh.sendBroadcast({});\n", quote(&signal))),
            None => stmt(""),
        }
    }
}
