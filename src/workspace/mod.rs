//! The block graph: an arena of blocks with value and statement slots.
//!
//! The editor owns the structure; generation only reads it and writes
//! warnings and type constraints back. `BlockGraph` is the interface the
//! inference pass and generators program against; `Workspace` is the
//! in-memory implementation loaded from the editor's JSON serialization.

pub mod items;
pub mod kind;
pub mod serialization;

use indexmap::IndexMap;
use serde_json::Value;

pub use items::{Item, ItemManager, MlSensor, SensorKind};
pub use kind::{BlockKind, Output, ValueType};

// ─── Block ───────────────────────────────────────────────────────────────────

/// Arena index of a block inside its workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// How a block is attached to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLink {
    /// Plugged into the named input (value or statement) of the parent.
    Input(BlockId, String),
    /// Chained after the parent statement.
    Next(BlockId),
}

/// A named input slot.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub target: Option<BlockId>,
    /// Type constraint on the slot, written by type inference.
    pub check: Option<ValueType>,
}

#[derive(Debug, Clone)]
pub struct Block {
    /// Editor-assigned identifier.
    pub id: String,
    pub kind: BlockKind,
    pub fields: IndexMap<String, String>,
    pub inputs: IndexMap<String, Input>,
    pub next: Option<BlockId>,
    pub parent: Option<ParentLink>,
    /// Serialized mutator state (`extraState`).
    pub extra_state: Option<Value>,
    pub comment: Option<String>,
    /// Current output check; statement blocks have none.
    pub output_check: Option<ValueType>,
    /// Warning texts keyed by tag; the empty tag is the default slot.
    pub warnings: IndexMap<String, String>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        let output_check = match kind.output() {
            Output::Value(check) => check,
            Output::Statement => None,
        };
        Self {
            id: id.into(),
            kind,
            fields: IndexMap::new(),
            inputs: IndexMap::new(),
            next: None,
            parent: None,
            extra_state: None,
            comment: None,
            output_check,
            warnings: IndexMap::new(),
        }
    }

    pub fn warning(&self, tag: &str) -> Option<&str> {
        self.warnings.get(tag).map(String::as_str)
    }

    /// All warnings joined the way the editor shows them.
    pub fn warning_text(&self) -> Option<String> {
        if self.warnings.is_empty() {
            None
        } else {
            Some(self.warnings.values().cloned().collect::<Vec<_>>().join("\n"))
        }
    }
}

// ─── BlockGraph ──────────────────────────────────────────────────────────────

/// Read access to the block structure plus the few annotations the
/// generator may write (warnings and type checks).
pub trait BlockGraph {
    fn block(&self, id: BlockId) -> &Block;
    fn block_mut(&mut self, id: BlockId) -> &mut Block;
    /// Every block id in creation order.
    fn block_ids(&self) -> Vec<BlockId>;
    /// Heads of the top-level chains, in workspace order.
    fn top_blocks(&self) -> Vec<BlockId>;

    fn variables(&self) -> &ItemManager;
    fn lists(&self) -> &ItemManager;
    fn signals(&self) -> &ItemManager;
    fn ml_classes(&self) -> &ItemManager;
    fn ml_sensors(&self) -> &[MlSensor];

    fn kind(&self, id: BlockId) -> BlockKind {
        self.block(id).kind
    }

    fn field(&self, id: BlockId, name: &str) -> Option<&str> {
        self.block(id).fields.get(name).map(String::as_str)
    }

    fn input_target(&self, id: BlockId, name: &str) -> Option<BlockId> {
        self.block(id).inputs.get(name).and_then(|i| i.target)
    }

    fn statement_target(&self, id: BlockId, name: &str) -> Option<BlockId> {
        self.input_target(id, name)
    }

    fn next(&self, id: BlockId) -> Option<BlockId> {
        self.block(id).next
    }

    fn parent(&self, id: BlockId) -> Option<BlockId> {
        match self.block(id).parent {
            Some(ParentLink::Input(p, _)) | Some(ParentLink::Next(p)) => Some(p),
            None => None,
        }
    }

    /// The block whose input (directly or through a statement chain) holds `id`.
    fn surround_parent(&self, id: BlockId) -> Option<BlockId> {
        let mut current = id;
        loop {
            match &self.block(current).parent {
                Some(ParentLink::Input(p, _)) => return Some(*p),
                Some(ParentLink::Next(prev)) => current = *prev,
                None => return None,
            }
        }
    }

    fn root(&self, id: BlockId) -> BlockId {
        let mut current = id;
        while let Some(p) = self.parent(current) {
            current = p;
        }
        current
    }

    fn blocks_of_kind(&self, kind: BlockKind) -> Vec<BlockId> {
        self.block_ids()
            .into_iter()
            .filter(|id| self.kind(*id) == kind)
            .collect()
    }

    /// Value blocks plugged into an input are emitted inline.
    fn is_inline(&self, id: BlockId) -> bool {
        self.kind(id).is_value() && self.parent(id).is_some()
    }

    fn comment(&self, id: BlockId) -> Option<&str> {
        self.block(id).comment.as_deref()
    }

    fn extra_state(&self, id: BlockId) -> Option<&Value> {
        self.block(id).extra_state.as_ref()
    }

    /// Set (`Some`) or clear (`None`) the warning stored under `tag`.
    fn set_warning(&mut self, id: BlockId, text: Option<String>, tag: &str) {
        let block = self.block_mut(id);
        match text {
            Some(text) => {
                tracing::debug!(block = %block.id, tag, "{}", text);
                block.warnings.insert(tag.to_string(), text);
            }
            None => {
                block.warnings.shift_remove(tag);
            }
        }
    }

    fn output_check(&self, id: BlockId) -> Option<ValueType> {
        self.block(id).output_check
    }

    fn set_output_check(&mut self, id: BlockId, check: Option<ValueType>) {
        self.block_mut(id).output_check = check;
    }

    fn input_check(&self, id: BlockId, name: &str) -> Option<ValueType> {
        self.block(id).inputs.get(name).and_then(|i| i.check)
    }

    fn set_input_check(&mut self, id: BlockId, name: &str, check: Option<ValueType>) {
        self.block_mut(id)
            .inputs
            .entry(name.to_string())
            .or_default()
            .check = check;
    }

    /// Output check of whatever is plugged into `name`, if anything.
    fn target_check(&self, id: BlockId, name: &str) -> Option<ValueType> {
        self.input_target(id, name).and_then(|t| self.output_check(t))
    }
}

// ─── Workspace ───────────────────────────────────────────────────────────────

/// In-memory block graph.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    blocks: Vec<Block>,
    top: Vec<BlockId>,
    /// Editor id → arena index.
    index: IndexMap<String, BlockId>,
    pub variables: ItemManager,
    pub lists: ItemManager,
    pub signals: ItemManager,
    pub ml_classes: ItemManager,
    pub ml_sensors: Vec<MlSensor>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the editor's JSON serialization.
    pub fn from_json(src: &str) -> crate::Result<Self> {
        serialization::load(src)
    }

    /// Add a detached block. A duplicate or empty editor id is replaced with a fresh one.
    pub fn add_block(&mut self, kind: BlockKind) -> BlockId {
        let id = format!("b{}", self.blocks.len());
        self.add_block_with_id(id, kind)
    }

    pub fn add_block_with_id(&mut self, id: impl Into<String>, kind: BlockKind) -> BlockId {
        let mut id = id.into();
        if id.is_empty() {
            id = format!("b{}", self.blocks.len());
        }
        while self.index.contains_key(&id) {
            id.push('_');
        }
        let bid = BlockId(self.blocks.len());
        self.index.insert(id.clone(), bid);
        self.blocks.push(Block::new(id, kind));
        self.top.push(bid);
        bid
    }

    pub fn find(&self, editor_id: &str) -> Option<BlockId> {
        self.index.get(editor_id).copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn set_field(&mut self, id: BlockId, name: &str, value: impl Into<String>) -> &mut Self {
        self.blocks[id.0]
            .fields
            .insert(name.to_string(), value.into());
        self
    }

    pub fn set_comment(&mut self, id: BlockId, comment: impl Into<String>) {
        self.blocks[id.0].comment = Some(comment.into());
    }

    pub fn set_extra_state(&mut self, id: BlockId, state: Value) {
        self.blocks[id.0].extra_state = Some(state);
    }

    /// Plug `child` into `input` of `parent` (value or statement slot).
    pub fn connect_input(&mut self, parent: BlockId, input: &str, child: BlockId) {
        self.detach(child);
        self.blocks[parent.0]
            .inputs
            .entry(input.to_string())
            .or_default()
            .target = Some(child);
        self.blocks[child.0].parent = Some(ParentLink::Input(parent, input.to_string()));
    }

    /// Chain `next` after `prev`.
    pub fn connect_next(&mut self, prev: BlockId, next: BlockId) {
        self.detach(next);
        self.blocks[prev.0].next = Some(next);
        self.blocks[next.0].parent = Some(ParentLink::Next(prev));
    }

    /// Chain a list of statements and return the head.
    pub fn chain(&mut self, blocks: &[BlockId]) -> Option<BlockId> {
        for pair in blocks.windows(2) {
            self.connect_next(pair[0], pair[1]);
        }
        blocks.first().copied()
    }

    fn detach(&mut self, id: BlockId) {
        match self.blocks[id.0].parent.take() {
            Some(ParentLink::Input(p, name)) => {
                if let Some(input) = self.blocks[p.0].inputs.get_mut(&name) {
                    input.target = None;
                }
            }
            Some(ParentLink::Next(p)) => self.blocks[p.0].next = None,
            None => {}
        }
        self.top.retain(|t| *t != id);
    }
}

impl BlockGraph for Workspace {
    fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    fn block_ids(&self) -> Vec<BlockId> {
        (0..self.blocks.len()).map(BlockId).collect()
    }

    fn top_blocks(&self) -> Vec<BlockId> {
        self.top.clone()
    }

    fn variables(&self) -> &ItemManager {
        &self.variables
    }

    fn lists(&self) -> &ItemManager {
        &self.lists
    }

    fn signals(&self) -> &ItemManager {
        &self.signals
    }

    fn ml_classes(&self) -> &ItemManager {
        &self.ml_classes
    }

    fn ml_sensors(&self) -> &[MlSensor] {
        &self.ml_sensors
    }
}
