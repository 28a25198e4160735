//! Latte CLI
//!
//! Usage:
//!   latte [OPTIONS] [DOCUMENT]
//!
//! Options:
//!   -d, --data <FILE>     JSON data object bindings read from
//!   -c, --config <FILE>   Render configuration (TOML format)
//!   -s, --solve <WxH>     Preview frames in a container of this size
//!   --set <PATH=JSON>     Change a data value after rendering and invalidate it
//!   -v, --verbose         More log output (repeat for more)
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use latte::template::BindingPath;
use latte::{DocumentEngine, MarkupError, RenderConfig};

#[derive(Parser)]
#[command(name = "latte")]
#[command(about = "Build view hierarchies from JSON markup")]
struct Cli {
    /// Document file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// JSON data object that templates read from
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Render configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Solve frames in a WIDTHxHEIGHT container, e.g. 320x480
    #[arg(short, long, value_parser = parse_size)]
    solve: Option<(f64, f64)>,

    /// Set PATH to a JSON value after rendering, then invalidate it
    #[arg(long = "set", value_name = "PATH=JSON")]
    sets: Vec<String>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", v))
    };
    Ok((parse(w)?, parse(h)?))
}

fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("latte={}", level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => RenderConfig::from_file(path).unwrap_or_else(|e| {
            fail(format!("loading config '{}': {}", path.display(), e))
        }),
        None => RenderConfig::default(),
    };

    let (filename, source) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (path.display().to_string(), content),
            Err(e) => fail(format!("reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                fail(format!("reading from stdin: {}", e));
            }
            ("<stdin>".to_string(), buffer)
        }
    };

    let mut data: Value = match &cli.data {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| fail(format!("reading data '{}': {}", path.display(), e))),
        None => Value::Object(Default::default()),
    };

    let root = config.data_root.clone();
    let engine = DocumentEngine::new().with_config(config);
    let mut rendered = match engine.render_str(&source, &data) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprint!("{}", e.format(&filename));
            std::process::exit(1);
        }
    };

    println!("views:");
    print!("{}", rendered.tree().outline());
    println!("constraints:");
    for descriptor in rendered.constraints() {
        println!("  {}", descriptor);
    }

    if let Some((width, height)) = cli.solve {
        match rendered.solve_frames(width, height) {
            Ok(frames) => {
                println!("frames:");
                for (id, rect) in &frames.frames {
                    println!(
                        "  {}: x={} y={} w={} h={}",
                        id, rect.x, rect.y, rect.width, rect.height
                    );
                }
            }
            Err(e) => fail(e),
        }
    }

    for set in &cli.sets {
        let (path, value) = set
            .split_once('=')
            .unwrap_or_else(|| fail(format!("--set expects PATH=JSON, got '{}'", set)));
        if let Err(e) = set_value(&mut data, path, value, &root) {
            fail(e);
        }
        println!("set {}:", path);
        for update in rendered.invalidate(path, &data) {
            match update {
                Ok(update) if update.changed => {
                    println!("  {}.{} = {:?}", update.target, update.attribute, update.value)
                }
                Ok(update) => println!("  {}.{} unchanged", update.target, update.attribute),
                Err(e) => eprint!("{}", e.format(&filename)),
            }
        }
    }
}

/// Write a JSON value at a dotted path, creating objects along the way
fn set_value(data: &mut Value, path: &str, raw: &str, root: &str) -> Result<(), MarkupError> {
    let path = BindingPath::parse(path)?;
    // Bare words are taken as strings
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut current = data;
    for segment in path.relative_to(root) {
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
            other => other,
        };
    }
    *current = value;
    Ok(())
}
