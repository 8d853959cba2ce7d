//! Integration tests for the blockwire binary.
//!
//! These run the compiled binary over the fixture workspaces.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn run(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_blockwire"))
        .args(args)
        .env_remove("BLOCKWIRE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run binary");
    if let Some(input) = stdin
        && let Some(ref mut pipe) = child.stdin
    {
        pipe.write_all(input.as_bytes()).expect("write stdin");
    }
    drop(child.stdin.take());
    child.wait_with_output().expect("binary finishes")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "binary exited with {:?}:\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

#[test]
fn test_file_input() {
    let blink = fixture("blink.json");
    let out = stdout(&run(&[blink.to_str().unwrap()], None));
    assert!(out.contains("digitalWrite(13, true);"));
    assert!(out.contains("void loop() {"));
}

#[test]
fn test_stdin_input_matches_file_input() {
    let blink = fixture("blink.json");
    let text = fs::read_to_string(&blink).unwrap();
    let from_stdin = stdout(&run(&[], Some(&text)));
    let from_file = stdout(&run(&[blink.to_str().unwrap()], None));
    assert_eq!(from_stdin, from_file);
}

#[test]
fn test_micropython_target() {
    let blink = fixture("blink.json");
    let out = stdout(&run(&[blink.to_str().unwrap(), "--target", "micropython"], None));
    assert!(out.contains("pin_13.value(True)"));
    assert!(out.ends_with("leaphy_program()\n"));
}

#[test]
fn test_deps_and_schematic() {
    let dir = tempfile::tempdir().unwrap();
    let svg = dir.path().join("circuit.svg");
    let code = dir.path().join("sketch.ino");
    let sensors = fixture("sensors.json");
    let out = run(
        &[
            sensors.to_str().unwrap(),
            "--deps",
            "-o",
            code.to_str().unwrap(),
            "--schematic",
            svg.to_str().unwrap(),
        ],
        None,
    );
    assert!(stdout(&out).is_empty());

    let sketch = fs::read_to_string(&code).unwrap();
    assert!(sketch.contains("Adafruit_VL53L0X@1.2.4\n"));
    let drawing = fs::read_to_string(&svg).unwrap();
    assert!(drawing.starts_with("<svg"));
}

#[test]
fn test_bad_input_exits_with_error() {
    let out = run(&[fixture("unknown_block.json").to_str().unwrap()], None);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: unknown block type 'leaphy_teleport'"));
}

#[test]
fn test_unknown_target_is_rejected() {
    let blink = fixture("blink.json");
    let out = run(&[blink.to_str().unwrap(), "--target", "basic"], None);
    assert!(!out.status.success());
}
