//! Dynamic item collections owned by the editor: user variables, lists,
//! mesh signals and ML classes, plus the ML sensor configuration.
//!
//! Blocks reference items by id. Names can change or items can disappear
//! without the blocks being touched, so every lookup is fallible and callers
//! emit a safe default when a reference has gone stale.

use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
}

impl Item {
    /// Name usable as a C identifier fragment (spaces become underscores).
    pub fn ident(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// Ordered id → item map with the editor's rename/delete operations.
#[derive(Debug, Clone, Default)]
pub struct ItemManager {
    items: IndexMap<String, Item>,
}

impl ItemManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item; an existing id keeps its position and takes the new name.
    pub fn add(&mut self, id: impl Into<String>, name: impl Into<String>) -> &Item {
        let id = id.into();
        let name = name.into();
        let entry = self
            .items
            .entry(id.clone())
            .or_insert_with(|| Item {
                id,
                name: String::new(),
            });
        entry.name = name;
        entry
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.get_index_of(id)
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.items.shift_remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for ItemManager {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        let mut manager = ItemManager::new();
        for item in iter {
            manager.add(item.id, item.name);
        }
        manager
    }
}

// ─── ML sensors ──────────────────────────────────────────────────────────────

fn default_trig() -> String {
    "A3".to_string()
}

fn default_echo() -> String {
    "A2".to_string()
}

fn no_channel() -> i32 {
    -1
}

/// Hardware source of one ML input feature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorKind {
    Digital {
        pin: String,
    },
    Analog {
        pin: String,
    },
    Ultrasonic {
        #[serde(default = "default_trig")]
        trig: String,
        #[serde(default = "default_echo")]
        echo: String,
    },
    #[serde(rename = "ToF", alias = "tof")]
    Tof {
        /// Multiplexer channel, `-1` when wired straight to the board.
        #[serde(default = "no_channel")]
        channel: i32,
    },
}

impl SensorKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SensorKind::Digital { .. } => "digital",
            SensorKind::Analog { .. } => "analog",
            SensorKind::Ultrasonic { .. } => "ultrasonic",
            SensorKind::Tof { .. } => "ToF",
        }
    }

    /// Number of input nodes this sensor feeds.
    pub fn values(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MlSensor {
    pub id: String,
    #[serde(flatten)]
    pub kind: SensorKind,
}

impl MlSensor {
    /// Global name of the BLE characteristic streaming this sensor.
    pub fn ident(&self) -> String {
        format!("sensor_{}_{}", self.kind.type_name(), self.id.replace('-', "_"))
    }
}
