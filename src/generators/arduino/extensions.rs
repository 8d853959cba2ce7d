//! Peripherals shipped with the Leaphy Extensions library.
//!
//! Each init block only declares its driver object; the blocks that use
//! it refer to the fixed global names.

use crate::error::Result;
use crate::registry::Dependency;
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, stmt};

const MATRIX_SETUP: &str = "matrix.shutdown(0, false);\n  matrix.setIntensity(0, 8);\n  matrix.clearDisplay(0);";

impl ArduinoGenerator<'_> {
    pub(super) fn segment_init(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let clk = self.field(block, "CLK");
        let dio = self.field(block, "DIO");
        self.registry.add_dependency(&[Dependency::LeaphyExtensions]);
        self.registry
            .add_include("tm1637", "#include <SegmentDisplay.h>");
        self.registry.add_declaration(
            "segment",
            format!("TM1637Display segment_display({clk}, {dio});"),
            false,
            0,
        );
        self.registry
            .add_setup("segment", "segment_display.setBrightness(255);\n", false);
        stmt("")
    }

    pub(super) fn matrix_init(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let din = self.field(block, "DIN");
        let clk = self.field(block, "CLK");
        let cs = self.field(block, "CS");
        self.registry.add_dependency(&[Dependency::LeaphyExtensions]);
        self.registry.add_include("matrix", "#include <LedControl.h>");
        self.registry.add_declaration(
            "matrix",
            format!("LedControl matrix = LedControl({din}, {clk}, {cs}, 1);"),
            false,
            0,
        );
        self.registry.add_setup("matrix", MATRIX_SETUP, false);
        stmt("")
    }

    pub(super) fn sound_init(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let rx = self.field(block, "RX");
        let tx = self.field(block, "TX");
        self.registry.add_dependency(&[Dependency::LeaphyExtensions]);
        self.registry.add_include("sound", "#include <RedMP3.h>");
        self.registry
            .add_declaration("sound", format!("MP3 mp3({rx}, {tx});"), false, 0);
        stmt("")
    }
}
