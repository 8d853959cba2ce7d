//! End-to-end tests: fixture workspaces through the public library API.

use std::fs;
use std::path::PathBuf;

use blockwire::schematic::{BuiltinLoader, MemoryLoader};
use blockwire::{Dependency, Error, GeneratorConfig, LayoutConfig, Target, compile, render_schematic};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {path:?}: {e}"))
}

#[test]
fn test_blink_sketch() {
    let out = compile(&fixture("blink.json"), &GeneratorConfig::new()).unwrap();
    assert!(out.code.contains("void leaphyProgram() {\n  digitalWrite(13, true);\n  delay(1000);\n}\n"));
    assert!(out.code.contains("  pinMode(13, OUTPUT);\n"));
    assert!(out.code.ends_with("void loop() {\n}\n"));
    assert_eq!(out.code.matches("pinMode(13, OUTPUT);").count(), 1);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_compile_is_deterministic() {
    let config = GeneratorConfig::new().with_robot("l_nano_esp32");
    let first = compile(&fixture("sensors.json"), &config).unwrap();
    let second = compile(&fixture("sensors.json"), &config).unwrap();
    assert_eq!(first.code, second.code);
    assert_eq!(first.dependencies, second.dependencies);
}

#[test]
fn test_sensors_dependencies_and_circuit() {
    let out = compile(&fixture("sensors.json"), &GeneratorConfig::new()).unwrap();
    assert!(out.dependencies.contains(&Dependency::LeaphyExtensions));
    assert!(out.dependencies.contains(&Dependency::AdafruitVl53l0xTof));
    assert!(out.code.contains("i2cSelectChannel(2);"));

    let circuit = out.circuit.expect("arduino pass builds a circuit");
    assert!(circuit.instance("sonar").is_some());
    assert!(circuit.instance("tof-2").is_some());

    let svg = render_schematic(&circuit, &BuiltinLoader, &LayoutConfig::default()).unwrap();
    assert!(svg.starts_with("<svg"));
    let again = render_schematic(&circuit, &BuiltinLoader, &LayoutConfig::default()).unwrap();
    assert_eq!(svg, again);
}

#[test]
fn test_missing_asset_is_an_error() {
    let out = compile(&fixture("sensors.json"), &GeneratorConfig::new()).unwrap();
    let circuit = out.circuit.unwrap();
    let empty = MemoryLoader::new();
    assert!(matches!(
        render_schematic(&circuit, &empty, &LayoutConfig::default()),
        Err(Error::Asset { .. })
    ));
}

#[test]
fn test_variables_arduino() {
    let out = compile(&fixture("variables.json"), &GeneratorConfig::new()).unwrap();
    assert!(out.code.starts_with("double count = 0;\n"));
    assert!(out.code.contains("  count = 0;\n  while (true) {\n    count = count + 1;\n  }\n"));
}

#[test]
fn test_variables_micropython() {
    let config = GeneratorConfig::new().with_target(Target::MicroPython);
    let out = compile(&fixture("variables.json"), &config).unwrap();
    assert_eq!(
        out.code,
        "count = None\n\n\
         def leaphy_program():\n  global count\n  count = 0\n  while True:\n    count = count + 1\n\n\n\
         leaphy_program()\n"
    );
    assert!(out.circuit.is_none());
}

#[test]
fn test_micropython_warns_for_arduino_only_blocks() {
    let config = GeneratorConfig::new().with_target(Target::MicroPython);
    let out = compile(&fixture("sensors.json"), &config).unwrap();
    assert!(out.code.contains("print(read_distance(\"8\",\"7\"))"));
    assert!(out.code.contains("print(TOF_2.get_distance())"));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_unknown_block_type() {
    match compile(&fixture("unknown_block.json"), &GeneratorConfig::new()) {
        Err(Error::UnknownBlockType { tag }) => assert_eq!(tag, "leaphy_teleport"),
        other => panic!("expected UnknownBlockType, got {other:?}"),
    }
}
