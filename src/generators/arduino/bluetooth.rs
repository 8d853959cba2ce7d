//! Bluetooth LE remote control through ArduinoBLE.
//!
//! Every remote key becomes a writable byte characteristic whose UUID is
//! the key name itself, hex encoded, so the app can address keys by name.

use indexmap::IndexSet;

use crate::error::Result;
use crate::registry::Dependency;
use crate::workspace::{BlockId, BlockKind};

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

/// Leaphy's control service.
pub const SERVICE_UUID: &str = "33c7afab-1609-4a7e-861d-9cfbefb33541";

/// Hex-encode `s` into a UUID shaped string, zero padded or truncated to 128 bits.
pub fn encode_uuid(s: &str) -> String {
    let mut hex: String = s.chars().map(|c| format!("{:02x}", c as u32)).collect();
    while hex.len() < 32 {
        hex.push('0');
    }
    hex.truncate(32);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Inverse of [`encode_uuid`] for keys of at most 16 ASCII characters.
pub fn decode_uuid(uuid: &str) -> String {
    let hex: Vec<u8> = uuid.bytes().filter(|b| *b != b'-').collect();
    let decoded: String = hex
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
        .map(char::from)
        .collect();
    decoded.trim_end_matches('\0').to_string()
}

impl ArduinoGenerator<'_> {
    fn include_ble(&mut self) {
        self.registry.add_dependency(&[Dependency::ArduinoBle]);
        self.registry
            .add_include("bluetooth", "#include <ArduinoBLE.h>");
    }

    pub(super) fn ble_setup(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.include_ble();

        let keys: IndexSet<String> = self
            .graph
            .blocks_of_kind(BlockKind::BleIsPressed)
            .into_iter()
            .map(|b| self.field(b, "KEY"))
            .collect();

        let characteristics: Vec<String> = keys
            .iter()
            .map(|key| {
                format!(
                    "BLEByteCharacteristic {key}Characteristic(\"{}\", BLEWrite);",
                    encode_uuid(key)
                )
            })
            .collect();
        self.registry.add_definition(
            "BLE",
            format!(
                "BLEService controlService(\"{SERVICE_UUID}\");\n\n{}",
                characteristics.join("\n")
            ),
            false,
        );

        let name = self.value_to_code(block, "NAME", Order::None)?;
        let added: Vec<String> = keys
            .iter()
            .map(|key| format!("controlService.addCharacteristic({key}Characteristic);"))
            .collect();
        stmt(format!(
            "if (!BLE.begin()) {{\n  Serial.println(\"starting Bluetooth® Low Energy module failed!\");\n\n  while (1);\n}}\n\n\
             BLE.setLocalName({name});\nBLE.setAdvertisedService(controlService);\n\n{}\n\
             BLE.addService(controlService);\n\nBLE.advertise();\n",
            added.join("\n")
        ))
    }

    pub(super) fn ble_update(&mut self) -> Result<ArduinoCode> {
        self.include_ble();
        stmt("BLE.poll();\n")
    }

    pub(super) fn ble_is_pressed(&mut self, block: BlockId) -> Result<ArduinoCode> {
        self.include_ble();
        let key = self.field(block, "KEY");
        expr(format!("({key}Characteristic.value() == 1)"), Order::Atomic)
    }
}
