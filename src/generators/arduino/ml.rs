//! Machine-learning classification.
//!
//! Two modes: stream the configured sensors over BLE to a host that runs the
//! model and writes the winning class back, or run a TensorFlow Lite model on
//! the board itself.

use crate::error::Result;
use crate::registry::Dependency;
use crate::workspace::{BlockId, Item, MlSensor, SensorKind};

use super::{ArduinoCode, ArduinoGenerator, Order, expr, stmt};

const ML_SERVICE_UUID: &str = "071bbd8f-5002-440f-b2e5-bee56f630d2b";

const TFLITE_INCLUDES: [&str; 5] = [
    "#include <TensorFlowLite_ESP32.h>",
    "#include \"tensorflow/lite/micro/all_ops_resolver.h\"",
    "#include \"tensorflow/lite/micro/micro_error_reporter.h\"",
    "#include \"tensorflow/lite/micro/micro_interpreter.h\"",
    "#include \"tensorflow/lite/schema/schema_generated.h\"",
];

const TFLITE_GLOBALS: &str = "tflite::ErrorReporter* error_reporter = nullptr;
const tflite::Model* model = nullptr;
tflite::MicroInterpreter* interpreter = nullptr;
TfLiteTensor* input = nullptr;
TfLiteTensor* output = nullptr;
constexpr int kTensorArenaSize = 250 * 1024;
uint8_t tensor_arena[kTensorArenaSize];";

const TFLITE_SETUP: &str = r#"bool setupTensorFlow() {
    static tflite::MicroErrorReporter micro_error_reporter;
    error_reporter = &micro_error_reporter;

    model = tflite::GetModel(model_data);
    if (model == nullptr) {
        Serial.println("ERROR: Failed to load model!");
        return false;
    }

    if (model->version() != TFLITE_SCHEMA_VERSION) {
        Serial.printf("ERROR: Model schema version mismatch! Model: %d, Expected: %d\n",
                      model->version(), TFLITE_SCHEMA_VERSION);
        return false;
    }
    Serial.println("Schema version OK");

    static tflite::AllOpsResolver resolver;

    static tflite::MicroInterpreter static_interpreter(
        model, resolver, tensor_arena, kTensorArenaSize, error_reporter);
    interpreter = &static_interpreter;

    TfLiteStatus allocate_status = interpreter->AllocateTensors();
    if (allocate_status != kTfLiteOk) {
        Serial.printf("ERROR: AllocateTensors() failed with status: %d\n", allocate_status);
        Serial.printf("Free heap after failed allocation: %d bytes\n", ESP.getFreeHeap());
        return false;
    }
    input = interpreter->input(0);
    output = interpreter->output(0);

    return true;
}"#;

fn class_name(class: &Item) -> String {
    format!("class_{}", class.ident())
}

/// Scale a distance reading into the 0..1 range the model was trained on.
fn normalize_distance(reading: &str) -> String {
    format!("max(0.0f, min(1.0f, {reading} / 256.0f))")
}

impl ArduinoGenerator<'_> {
    /// Code reading every value of `sensor`, passing each to `set_node`
    /// together with its node offset within the sensor.
    fn sensor_values(
        &mut self,
        sensor: &MlSensor,
        set_node: &dyn Fn(usize, &str) -> String,
    ) -> String {
        match &sensor.kind {
            SensorKind::Digital { pin } => {
                self.registry.add_setup(
                    &format!("setup_input_{pin}"),
                    format!("pinMode({pin}, INPUT);"),
                    false,
                );
                set_node(0, &format!("digitalRead({pin})"))
            }
            SensorKind::Analog { pin } => set_node(0, &format!("analogRead({pin}) / 4095.0f")),
            SensorKind::Ultrasonic { trig, echo } => {
                let reading = self.sonar_distance(trig, echo);
                set_node(0, &normalize_distance(&reading))
            }
            SensorKind::Tof { channel } if *channel < 0 => {
                let reading = self.tof_read();
                set_node(0, &reading)
            }
            SensorKind::Tof { channel } => {
                let reading = self.tof_read();
                format!(
                    "i2cSelectChannel({channel});\n{}i2cRestoreChannel();\n",
                    set_node(0, &normalize_distance(&reading))
                )
            }
        }
    }

    fn add_bluetooth_details(&mut self, sensors: &[MlSensor], classes: &[Item]) {
        self.registry.add_dependency(&[Dependency::ArduinoBle]);
        self.registry
            .add_include("bluetooth", "#include <ArduinoBLE.h>");

        let mut definition = format!("BLEService controlService(\"{ML_SERVICE_UUID}\");\n");
        let mut setup = String::from(
            "BLE.begin();\n  BLE.setLocalName(\"Leaphy Starling AI\");\n  BLE.setAdvertisedService(controlService);\n",
        );
        for sensor in sensors {
            definition.push_str(&format!(
                "BLEFloatCharacteristic {}(\"{}\", BLERead | BLENotify);\n",
                sensor.ident(),
                sensor.id
            ));
            setup.push_str(&format!(
                "  controlService.addCharacteristic({});\n",
                sensor.ident()
            ));
        }
        for class in classes {
            definition.push_str(&format!(
                "BLEBooleanCharacteristic {}(\"{}\", BLEWrite);\n",
                class_name(class),
                class.id
            ));
            setup.push_str(&format!(
                "  controlService.addCharacteristic({});\n",
                class_name(class)
            ));
        }
        setup.push_str("  BLE.addService(controlService);\n  BLE.advertise();");

        self.registry.add_definition("bluetooth", definition, false);
        self.registry.add_setup("bluetooth", setup, false);
    }

    fn add_tensorflow_details(&mut self) {
        self.registry.add_dependency(&[Dependency::TensorflowEsp32]);
        self.registry
            .add_include("tensorflow", TFLITE_INCLUDES.join("\n"));
        let model = self.config.ml.model_headers.clone().unwrap_or_default();
        self.registry.add_definition("tensorflow_model", model, false);
        self.registry
            .add_definition("tensorflow", TFLITE_GLOBALS, false);
        self.registry
            .add_declaration("tensorflow", TFLITE_SETUP, false, 0);
        self.registry
            .add_setup("tensorflow", "setupTensorFlow();", false);
    }

    pub(super) fn ml_classify(&mut self) -> Result<ArduinoCode> {
        let sensors = self.graph.ml_sensors().to_vec();
        let classes: Vec<Item> = self.graph.ml_classes().items().cloned().collect();

        if !self.config.ml.generate_inference {
            self.add_bluetooth_details(&sensors, &classes);
            let mut code = String::from("BLE.poll();\ndelay(10);\n");
            for sensor in &sensors {
                let ident = sensor.ident();
                let write = move |_: usize, value: &str| format!("{ident}.writeValue({value});\n");
                code.push_str(&self.sensor_values(sensor, &write));
            }
            return stmt(code);
        }

        self.add_tensorflow_details();
        let mut code = String::new();
        let mut offset = 0;
        for sensor in &sensors {
            let base = offset;
            let set = move |node: usize, value: &str| {
                format!("input->data.f[{}] = {value};\n", base + node)
            };
            code.push_str(&self.sensor_values(sensor, &set));
            offset += sensor.kind.values();
        }
        code.push_str("interpreter->Invoke();\n\n");
        for (i, class) in classes.iter().enumerate() {
            code.push_str(&format!(
                "float {}_prob = output->data.f[{i}];\n",
                class_name(class)
            ));
        }
        code.push_str("\nint predicted_class = 0;\nfloat max_prob = 0;\n\n");
        for (i, class) in classes.iter().enumerate() {
            let name = class_name(class);
            code.push_str(&format!(
                "if ({name}_prob > max_prob) {{\n  predicted_class = {i};\n  max_prob = {name}_prob;\n}}\n"
            ));
        }
        stmt(code)
    }

    pub(super) fn ml_certainty(&mut self, block: BlockId) -> Result<ArduinoCode> {
        let id = self.field(block, "CLASS");
        let classes = self.graph.ml_classes();
        let (Some(class), Some(index)) = (classes.item(&id), classes.index_of(&id)) else {
            tracing::warn!(class = %id, "block refers to a deleted class");
            return expr("false", Order::Atomic);
        };

        if self.config.ml.generate_inference {
            expr(format!("(predicted_class == {index})"), Order::Atomic)
        } else {
            expr(format!("{}.value()", class_name(class)), Order::Atomic)
        }
    }
}
