use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use timeline_engine::{Command, Engine, EngineConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: timeline-cli [script.json] [--config config.json]";

#[derive(Debug, Default)]
struct Args {
    script: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("timeline-cli: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" => {
                let path = raw.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(String::from("scripted timeline session")),
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            _ if args.script.is_some() => return Err(format!("unexpected argument: {arg}")),
            _ => args.script = Some(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::new(config)?;

    let script = match &args.script {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let commands: Vec<Command> = serde_json::from_str(&script)?;

    let mut failed = 0usize;
    for (index, command) in commands.into_iter().enumerate() {
        if let Err(error) = engine.handle_command(command) {
            failed += 1;
            warn!(index, %error, "command rejected");
        }
    }
    info!(failed, clips = engine.timeline().clip_count(), "script applied");

    let snapshot = engine.snapshot();
    let output = serde_json::json!({
        "summary": snapshot.summary(),
        "timeline": snapshot.timeline.as_ref(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
