//! blockwire CLI entry point.

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blockwire::schematic::{AssetLoader, BuiltinLoader, FsLoader, render_schematic};
use blockwire::{GeneratorConfig, LayoutConfig, Target, compile};

/// Block workspace to Arduino C++ / MicroPython, with wiring schematic.
#[derive(Parser, Debug)]
#[command(
    name = "blockwire",
    version = env!("BLOCKWIRE_VERSION"),
    about = "Block workspace to Arduino C++ / MicroPython, with wiring schematic"
)]
struct Cli {
    /// Workspace JSON file (reads from stdin if not provided)
    input: Option<String>,

    /// Robot identifier, e.g. l_uno, l_nano_esp32, l_original_nano
    #[arg(short = 'r', long = "robot", default_value = "l_uno")]
    robot: String,

    /// Output language: arduino or micropython
    #[arg(short = 't', long = "target", default_value = "arduino")]
    target: Target,

    /// Write code to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Also render the wiring schematic to this SVG file
    #[arg(short = 's', long = "schematic")]
    schematic: Option<String>,

    /// Directory with component drawings (builtin drawings otherwise)
    #[arg(long = "assets")]
    assets: Option<String>,

    /// Print the library dependencies, one per line, after the code
    #[arg(long = "deps")]
    deps: bool,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BLOCKWIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let text = if let Some(ref path) = cli.input {
        fs::read_to_string(path).unwrap_or_else(|e| fail(format!("cannot read '{path}': {e}")))
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(format!("cannot read stdin: {e}"));
        }
        buf
    };

    let config = GeneratorConfig::new()
        .with_robot(cli.robot.as_str())
        .with_target(cli.target);
    let program = compile(&text, &config).unwrap_or_else(|e| fail(e));

    for warning in &program.warnings {
        eprintln!("warning: block {}: {}", warning.block, warning.text);
    }

    let mut out = program.code.clone();
    if cli.deps {
        for dep in &program.dependencies {
            out.push_str(&format!("{dep}\n"));
        }
    }

    if let Some(ref path) = cli.output {
        if let Err(e) = fs::write(path, &out) {
            fail(format!("cannot write '{path}': {e}"));
        }
    } else {
        print!("{out}");
        if let Err(e) = io::stdout().flush() {
            fail(format!("cannot flush stdout: {e}"));
        }
    }

    if let Some(ref path) = cli.schematic {
        let Some(circuit) = program.circuit.as_ref() else {
            fail("the micropython target has no schematic");
        };
        let loader: Box<dyn AssetLoader> = match cli.assets {
            Some(ref dir) => Box::new(FsLoader::new(dir)),
            None => Box::new(BuiltinLoader),
        };
        let svg = render_schematic(circuit, loader.as_ref(), &LayoutConfig::default())
            .unwrap_or_else(|e| fail(e));
        if let Err(e) = fs::write(path, svg) {
            fail(format!("cannot write '{path}': {e}"));
        }
    }
}
