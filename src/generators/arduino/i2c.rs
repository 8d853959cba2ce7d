//! I2C multiplexer channels.
//!
//! Devices behind the multiplexer are set up lazily, once per channel: each
//! sensor gets a `setup<name>()` function that remembers which channels it
//! already initialised. Nested channel blocks restore the outer channel on
//! exit through a small stack kept on the board.

use crate::error::Result;
use crate::schematic::{ComponentKind, MURPHY, MURPHY_I2C};
use crate::workspace::{BlockId, BlockKind};

use super::{ArduinoCode, ArduinoGenerator, stmt};

const CHANNEL_HELPERS: &str = "#define I2C_MULTIPLEXER_ADDRESS 0x70
uint8_t i2cChannel = 0;
uint8_t i2cChannelStack[8];
uint8_t i2cChannelDepth = 0;

uint8_t i2cGetChannel() {
  return i2cChannel;
}

void i2cWriteChannel(uint8_t channel) {
  Wire.beginTransmission(I2C_MULTIPLEXER_ADDRESS);
  Wire.write(1 << channel);
  Wire.endTransmission();
}

void i2cSelectChannel(uint8_t channel) {
  if (i2cChannelDepth < 8) {
    i2cChannelStack[i2cChannelDepth++] = i2cChannel;
  }
  i2cChannel = channel;
  i2cWriteChannel(channel);
}

void i2cRestoreChannel() {
  if (i2cChannelDepth == 0) return;
  i2cChannel = i2cChannelStack[--i2cChannelDepth];
  i2cWriteChannel(i2cChannel);
}
";

impl ArduinoGenerator<'_> {
    pub(super) fn include_i2c(&mut self) {
        self.registry.add_include("wire", "#include <Wire.h>");
        self.registry.add_setup("i2c", "Wire.begin();", false);
        self.registry
            .add_declaration("i2c_channels", CHANNEL_HELPERS, false, 2);
    }

    /// Register the per-channel setup function for `name` and return the
    /// statement that calls it.
    pub(super) fn add_i2c_setup(&mut self, name: &str, code: &str) -> String {
        self.include_i2c();
        self.registry.add_declaration(
            &format!("setup_{name}"),
            format!(
                "bool {name}Setup[8];\nvoid setup{name}() {{\n    uint8_t channel = i2cGetChannel();\n    \
                 if (!{name}Setup[channel]) {{\n      {code}      {name}Setup[channel] = true;\n    }}\n}}\n"
            ),
            false,
            1,
        );
        format!("setup{name}();\n")
    }

    /// Multiplexer channel selected around `block`, if any.
    pub(super) fn i2c_channel(&self, block: BlockId) -> Option<u8> {
        let mut current = self.graph.surround_parent(block);
        while let Some(parent) = current {
            if self.graph.kind(parent) == BlockKind::I2cUseChannel {
                return self.graph.field(parent, "CHANNEL")?.parse().ok();
            }
            current = self.graph.surround_parent(parent);
        }
        None
    }

    /// Place an I2C device in the schematic, once per channel.
    pub(super) fn add_i2c_device(
        &mut self,
        prefix: &str,
        block: BlockId,
        kind: ComponentKind,
    ) -> Result<()> {
        let channel = self.i2c_channel(block);
        let id = match channel {
            Some(c) => format!("{prefix}-{c}"),
            None => format!("{prefix}-null"),
        };
        if self.builder.instance(&id).is_some() {
            return Ok(());
        }
        self.builder.add(&id, kind);
        match channel {
            Some(c) => self.builder.connect_i2c(MURPHY_I2C, &id, Some(c)),
            None => self.builder.connect_i2c(MURPHY, &id, None),
        }
    }

    pub(super) fn i2c_use_channel(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let channel = self.field(block, "CHANNEL");
        self.include_i2c();
        let body = self.statement_to_code(block, "DO")?;
        stmt(format!(
            "{{\n  i2cSelectChannel({channel});\n{body}  i2cRestoreChannel();\n}}\n"
        ))
    }
}
