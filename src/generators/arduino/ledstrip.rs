//! WS2812 LED strips driven through FastLED.

use crate::error::Result;
use crate::registry::{Dependency, PinType};
use crate::workspace::BlockId;

use super::{ArduinoCode, ArduinoGenerator, Order, stmt};

const BREATHE: &str = "void ledstripBreathe(uint8_t r, uint8_t g, uint8_t b) {
    int pause = map(LEDSTRIP_SPEED, 0, 100, 20, 0);
    fill_solid(ledstrip, NUM_LEDS, CRGB(r, g, b));
    for (int brightness = 1; brightness <= 255; brightness++) {
        FastLED.setBrightness(brightness);
        FastLED.show();
        FastLED.delay(pause);
    }
    for (int brightness = 255; brightness >= 1; brightness--) {
        FastLED.setBrightness(brightness);
        FastLED.show();
        FastLED.delay(pause);
    }
}
";

const RAINBOW: &str = "void ledstripRainbow() {
    int pause = map(LEDSTRIP_SPEED, 0, 100, 20, 0);
    FastLED.setBrightness(255);
    for (int hue = 0; hue <= 255; hue++) {
        fill_rainbow(ledstrip, NUM_LEDS, hue, 255 / NUM_LEDS);
        FastLED.show();
        FastLED.delay(pause);
    }
}
";

const WAVE: &str = "void ledstripWave(uint8_t r, uint8_t g, uint8_t b) {
    int pause = map(LEDSTRIP_SPEED, 0, 100, 200, 20);
    uint8_t startIndex = 0;
    FastLED.setBrightness(255);
    for (int times = 0; times < NUM_LEDS * 4; times++) {
        FastLED.clear();
        for (int i = 0; i < NUM_LEDS / 2; i++) {
            int currentLed = (startIndex + i) % NUM_LEDS;
            CRGB color = CRGB(r, g, b);
            uint8_t fraction = map(i, 0, NUM_LEDS / 2, 0, 255);
            color.nscale8(fraction);
            ledstrip[currentLed] = color;
        }
        startIndex++;
        FastLED.show();
        FastLED.delay(pause);
    }
}
";

const RAINBOW_WAVE: &str = "void ledstripRainbowWave() {
    int pause = map(LEDSTRIP_SPEED, 0, 100, 200, 20);
    uint8_t startIndex = 0;
    FastLED.setBrightness(255);
    for (int times = 0; times < NUM_LEDS * 4; times++) {
        FastLED.clear();
        for (int i = 0; i < NUM_LEDS / 2; i++) {
            int currentLed = (startIndex + i) % NUM_LEDS;
            uint8_t hue = map(i, 0, NUM_LEDS / 2, 0, 255);
            uint8_t brightness = map(i, 0, NUM_LEDS / 2, 10, 255);
            ledstrip[currentLed] = CHSV(hue, 255, brightness);
        }
        startIndex++;
        FastLED.show();
        FastLED.delay(pause);
    }
}
";

impl ArduinoGenerator<'_> {
    pub(super) fn led_set_strip(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let pin = self.value_or(block, "LED_SET_PIN", Order::Atomic, "0")?;
        let leds = self.value_or(block, "LED_SET_LEDS", Order::Atomic, "0")?;

        self.registry.add_dependency(&[Dependency::FastLed]);
        self.registry.add_include("fastled", "#include \"FastLED.h\"");
        self.registry.add_declaration(
            &format!("ledstrip{pin}"),
            format!("#define NUM_LEDS {leds}\nCRGB ledstrip[NUM_LEDS];\n"),
            false,
            0,
        );
        self.registry.add_setup(
            "ledstrip",
            format!("FastLED.addLeds<WS2812, {pin}, GRB>(ledstrip, NUM_LEDS); "),
            false,
        );
        self.reserve_pin(block, &pin, PinType::LedStrip, "Led Strip");
        stmt("")
    }

    pub(super) fn led_set_basic(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let led = self.value_or(block, "LED_SET_LED", Order::Atomic, "0")?;
        let [r, g, b] = self.rgb_inputs(block, "LED_BASIC")?;
        stmt(format!(
            "ledstrip[{led}] = CRGB({r}, {g}, {b}); FastLED.show();\n"
        ))
    }

    pub(super) fn led_set_speed(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let speed = self.value_or(block, "LED_SET_SPEEDVALUE", Order::Atomic, "0")?;
        self.registry.add_declaration(
            "ledstrip_speed",
            format!("#define LEDSTRIP_SPEED {speed}\n"),
            false,
            0,
        );
        stmt("")
    }

    pub(super) fn led_strip_demo(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let demo = self.field(block, "DEMO_TYPE");
        let [r, g, b] = self.rgb_inputs(block, "LED_STRIP_DEMO")?;

        let code = match demo.as_str() {
            "0" => format!("fill_solid(ledstrip, NUM_LEDS, CRGB({r}, {g}, {b})); FastLED.show();\n"),
            "1" => {
                self.registry
                    .add_declaration("ledstrip_breathe", BREATHE, false, 0);
                format!("ledstripBreathe({r}, {g}, {b});\n")
            }
            "3" => {
                self.registry
                    .add_declaration("ledstrip_rainbow_wave", RAINBOW_WAVE, false, 0);
                "ledstripRainbowWave();\n".to_string()
            }
            "4" => {
                self.registry
                    .add_declaration("ledstrip_rainbow", RAINBOW, false, 0);
                "ledstripRainbow();\n".to_string()
            }
            "5" => {
                self.registry.add_declaration("ledstrip_wave", WAVE, false, 0);
                format!("ledstripWave({r}, {g}, {b});\n")
            }
            other => {
                tracing::debug!(demo = other, "unknown led strip effect");
                String::new()
            }
        };
        stmt(code)
    }

    /// `<prefix>_RED`, `<prefix>_GREEN` and `<prefix>_BLUE`, zero when empty.
    fn rgb_inputs(&mut self, block: BlockId, prefix: &str) -> Result<[String; 3]> {
        Ok([
            self.value_or(block, &format!("{prefix}_RED"), Order::Atomic, "0")?,
            self.value_or(block, &format!("{prefix}_GREEN"), Order::Atomic, "0")?,
            self.value_or(block, &format!("{prefix}_BLUE"), Order::Atomic, "0")?,
        ])
    }
}
