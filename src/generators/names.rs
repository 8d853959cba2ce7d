//! Identifier database: turns user-chosen names into legal, distinct
//! identifiers that never collide with reserved words.

use std::collections::{HashMap, HashSet};

/// Words a sketch identifier must avoid: C++ keywords and the Arduino core API.
pub const ARDUINO_RESERVED: &[&str] = &[
    "setup", "loop", "if", "else", "for", "switch", "case", "while", "do", "break",
    "continue", "return", "goto", "define", "include", "HIGH", "LOW", "INPUT", "OUTPUT",
    "INPUT_PULLUP", "true", "false", "integer", "constants", "floating", "point", "void",
    "boolean", "char", "unsigned", "byte", "int", "word", "long", "float", "double", "string",
    "String", "array", "static", "volatile", "const", "sizeof", "pinMode", "digitalWrite",
    "digitalRead", "analogReference", "analogRead", "analogWrite", "tone", "noTone",
    "shiftOut", "shitIn", "pulseIn", "millis", "micros", "delay", "delayMicroseconds", "min",
    "max", "abs", "constrain", "map", "pow", "sqrt", "sin", "cos", "tan", "randomSeed",
    "random", "lowByte", "highByte", "bitRead", "bitWrite", "bitSet", "bitClear", "bit",
    "attachInterrupt", "detachInterrupt", "interrupts", "noInterrupts",
];

pub const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield", "print", "range", "str", "float", "int", "len", "sleep", "sleep_ms",
];

/// Maps (namespace key → identifier) for one generation pass.
#[derive(Debug, Clone, Default)]
pub struct NameDb {
    reserved: HashSet<String>,
    assigned: HashMap<String, String>,
    used: HashSet<String>,
}

impl NameDb {
    pub fn new(reserved: &[&str]) -> Self {
        Self {
            reserved: reserved.iter().map(|w| w.to_string()).collect(),
            assigned: HashMap::new(),
            used: HashSet::new(),
        }
    }

    /// Replace anything that is not `[A-Za-z0-9_]` and make sure the result
    /// does not start with a digit.
    pub fn safe_name(raw: &str) -> String {
        let mut name: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if name.is_empty() {
            name = "unnamed".to_string();
        } else if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert_str(0, "my_");
        }
        name
    }

    /// Identifier for `key`, created from `raw` the first time the key is seen.
    ///
    /// Later calls with the same key return the same identifier even if
    /// `raw` differs.
    pub fn get(&mut self, key: &str, raw: &str) -> String {
        if let Some(name) = self.assigned.get(key) {
            return name.clone();
        }
        let base = Self::safe_name(raw);
        let mut name = base.clone();
        let mut n = 2;
        while self.reserved.contains(&name) || self.used.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.used.insert(name.clone());
        self.assigned.insert(key.to_string(), name.clone());
        name
    }
}
