//! Loader for the editor's JSON workspace serialization.
//!
//! ```json
//! { "blocks": { "blocks": [ { "type": "leaphy_start", "inputs": { "STACK": { "block": {...} } } } ] },
//!   "variables": [ { "id": "v1", "name": "x" } ],
//!   "lists": [], "signals": [], "ml": { "classes": [], "sensors": [] } }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::items::{Item, ItemManager, MlSensor};
use super::kind::BlockKind;
use super::{BlockId, Workspace};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawWorkspace {
    #[serde(default)]
    blocks: Option<RawTopBlocks>,
    #[serde(default)]
    variables: Vec<RawVariable>,
    #[serde(default)]
    lists: Vec<Item>,
    #[serde(default)]
    signals: Vec<Item>,
    #[serde(default)]
    ml: Option<RawMl>,
}

#[derive(Debug, Deserialize)]
struct RawTopBlocks {
    #[serde(default)]
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    id: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawMl {
    #[serde(default)]
    classes: Vec<Item>,
    #[serde(default)]
    sensors: Vec<MlSensor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    fields: IndexMap<String, Value>,
    #[serde(default)]
    inputs: IndexMap<String, RawConnection>,
    #[serde(default)]
    next: Option<RawConnection>,
    #[serde(default)]
    extra_state: Option<Value>,
    #[serde(default)]
    icons: Option<RawIcons>,
}

/// A connection holds a real block, a shadow block, or both; the real block wins.
#[derive(Debug, Deserialize)]
struct RawConnection {
    #[serde(default)]
    block: Option<Box<RawBlock>>,
    #[serde(default)]
    shadow: Option<Box<RawBlock>>,
}

impl RawConnection {
    fn into_block(self) -> Option<RawBlock> {
        self.block.or(self.shadow).map(|b| *b)
    }
}

#[derive(Debug, Deserialize)]
struct RawIcons {
    #[serde(default)]
    comment: Option<RawComment>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    text: String,
}

/// Field values arrive as strings, numbers, booleans, or `{ "id": ... }`
/// references for variable fields.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::Null | Value::Array(_) => String::new(),
    }
}

/// Parse a serialized workspace.
pub fn load(src: &str) -> Result<Workspace> {
    let raw: RawWorkspace = serde_json::from_str(src)?;
    let mut ws = Workspace::new();

    ws.variables = raw
        .variables
        .into_iter()
        .map(|v| Item {
            id: v.id,
            name: v.name,
        })
        .collect();
    ws.lists = raw.lists.into_iter().collect();
    ws.signals = raw.signals.into_iter().collect();
    let ml = raw.ml.unwrap_or_default();
    ws.ml_classes = ml.classes.into_iter().collect::<ItemManager>();
    ws.ml_sensors = ml.sensors;

    if let Some(top) = raw.blocks {
        for block in top.blocks {
            insert_chain(&mut ws, block)?;
        }
    }

    tracing::debug!(blocks = ws.len(), "workspace loaded");
    Ok(ws)
}

/// Insert a block and everything hanging off it; returns the new block id.
fn insert_chain(ws: &mut Workspace, raw: RawBlock) -> Result<BlockId> {
    let kind = BlockKind::from_tag(&raw.kind).ok_or_else(|| Error::UnknownBlockType {
        tag: raw.kind.clone(),
    })?;
    let id = ws.add_block_with_id(raw.id, kind);

    for (name, value) in &raw.fields {
        // Variable fields may carry the variable definition inline.
        if let Value::Object(map) = value
            && let (Some(vid), Some(vname)) = (
                map.get("id").and_then(Value::as_str),
                map.get("name").and_then(Value::as_str),
            )
            && ws.variables.item(vid).is_none()
        {
            ws.variables.add(vid, vname);
        }
        ws.set_field(id, name, field_text(value));
    }

    if let Some(state) = raw.extra_state {
        ws.set_extra_state(id, state);
    }
    if let Some(comment) = raw.icons.and_then(|i| i.comment) {
        ws.set_comment(id, comment.text);
    }

    for (name, connection) in raw.inputs {
        if let Some(child) = connection.into_block() {
            let child_id = insert_chain(ws, child)?;
            ws.connect_input(id, &name, child_id);
        }
    }

    if let Some(next) = raw.next.and_then(RawConnection::into_block) {
        let next_id = insert_chain(ws, next)?;
        ws.connect_next(id, next_id);
    }

    Ok(id)
}
