//! DS3231 real-time clock: reading, setting and formatting the date.

use serde_json::Value;

use crate::error::Result;
use crate::registry::Dependency;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, expr, quote, stmt};

const RTC_HELPERS: &str = "String rtcPad(int value) {
  if (value < 10) return \"0\" + String(value);
  return String(value);
}

String rtcWeekday(int day, bool full) {
  const char* names[] = {\"Monday\", \"Tuesday\", \"Wednesday\", \"Thursday\", \"Friday\", \"Saturday\", \"Sunday\"};
  String name = names[(day + 6) % 7];
  return full ? name : name.substring(0, 3);
}
";

/// Getter for one date component, `None` for unknown components.
fn getter(item: &str) -> Option<&'static str> {
    Some(match item.to_ascii_lowercase().as_str() {
        "year" => "rtc.getYear()",
        "month" => "rtc.getMonth(century)",
        "day" => "rtc.getDate()",
        "weekday" => "rtc.getDoW()",
        "hour" => "rtc.getHour(h12Flag, pmFlag)",
        "minute" => "rtc.getMinute()",
        "second" => "rtc.getSecond()",
        _ => return None,
    })
}

/// One piece of a date format: literal text or a formatted component.
#[derive(Debug, Clone, PartialEq)]
enum DatePart {
    Text(String),
    Item { item: String, fmt: String },
}

/// Parse the format structure stored in the block's mutator state. Both a
/// bare array and `{"items": [...]}` are accepted.
fn date_parts(state: Option<&Value>) -> Vec<DatePart> {
    let list = match state {
        Some(Value::Array(list)) => list,
        Some(Value::Object(map)) => match map.get("items") {
            Some(Value::Array(list)) => list,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    list.iter()
        .filter_map(|entry| {
            let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
            match entry.get("type").and_then(Value::as_str) {
                Some("text") => Some(DatePart::Text(text("value").unwrap_or_default())),
                Some("item") => Some(DatePart::Item {
                    item: text("item")?,
                    fmt: text("fmt").unwrap_or_default(),
                }),
                // Bare strings name a component or are literal text.
                None => entry.as_str().map(|s| match getter(s) {
                    Some(_) => DatePart::Item {
                        item: s.to_string(),
                        fmt: "numeric".to_string(),
                    },
                    None => DatePart::Text(s.to_string()),
                }),
                Some(_) => None,
            }
        })
        .collect()
}

fn format_part(part: &DatePart) -> String {
    match part {
        DatePart::Text(text) => format!("String({})", quote(text)),
        DatePart::Item { item, fmt } => {
            let Some(value) = getter(item) else {
                return format!("String({})", quote(item));
            };
            match (item.to_ascii_lowercase().as_str(), fmt.as_str()) {
                ("year", "full") => format!("String(2000 + {value})"),
                ("weekday", "long") => format!("rtcWeekday({value}, true)"),
                ("weekday", "short") => format!("rtcWeekday({value}, false)"),
                (_, "2-digit") => format!("rtcPad({value})"),
                _ => format!("String({value})"),
            }
        }
    }
}

impl ArduinoGenerator<'_> {
    fn include_rtc(&mut self) {
        self.include_i2c();
        self.registry.add_dependency(&[Dependency::Ds3231Rtc]);
        self.registry.add_include("rtc", "#include <DS3231.h>");
        self.registry.add_declaration(
            "rtc",
            "DS3231 rtc;\nbool h12Flag;\nbool pmFlag;\nbool century = false;",
            false,
            2,
        );
    }

    pub(super) fn rtc_get(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.include_rtc();
        let item = self.field(block, "ITEM");
        match getter(&item) {
            Some(code) => expr(code, Order::UnaryPostfix),
            None => {
                tracing::warn!(item = %item, "unknown clock component");
                expr("0", Order::Atomic)
            }
        }
    }

    pub(super) fn rtc_set(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.include_rtc();
        let mut code = String::new();
        for (slot, setter) in [
            ("YEAR", "setYear"),
            ("MONTH", "setMonth"),
            ("DAY", "setDate"),
            ("HOUR", "setHour"),
            ("MINUTE", "setMinute"),
            ("SECOND", "setSecond"),
        ] {
            let value = self.value_to_code(block, slot, Order::None)?;
            if !value.is_empty() {
                code.push_str(&format!("rtc.{setter}({value});\n"));
            }
        }
        stmt(code)
    }

    pub(super) fn rtc_format(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.include_rtc();
        let parts = date_parts(self.graph.extra_state(block));
        if parts.is_empty() {
            return expr("String(\"\")", Order::UnaryPostfix);
        }
        self.registry
            .add_declaration("rtc_helpers", RTC_HELPERS, false, 1);
        let code: Vec<String> = parts.iter().map(format_part).collect();
        let order = if code.len() == 1 {
            Order::UnaryPostfix
        } else {
            Order::Additive
        };
        expr(code.join(" + "), order)
    }
}
