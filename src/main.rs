use anyhow::{Context, Result};
use clap::Parser;
use poset_store::config::{Config, LogConfig, LogFormat};
use poset_store::{PosetHandle, Registry};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Run a script of poset calls read from stdin (NDJSON or a JSON array)"
)]
struct Cli {
    /// TOML config file; defaults apply when absent.
    #[arg(long, default_value = "poset.toml")]
    config: PathBuf,

    /// Log output format on stderr: compact or json.
    #[arg(long)]
    log_format: Option<String>,

    /// Re-check invariants after every mutation.
    #[arg(long)]
    verify: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    New,
    Delete { poset: PosetHandle },
    Size { poset: PosetHandle },
    Insert { poset: PosetHandle, label: String },
    Remove { poset: PosetHandle, label: String },
    Add { poset: PosetHandle, a: String, b: String },
    Del { poset: PosetHandle, a: String, b: String },
    Test { poset: PosetHandle, a: String, b: String },
    Clear { poset: PosetHandle },
    Show { poset: PosetHandle },
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_new(&log.filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        LogFormat::Compact => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn parse_script(buf: &str) -> Result<Vec<Command>> {
    let s = buf.trim();
    if s.starts_with('[') {
        return serde_json::from_str(s).context("invalid command array");
    }
    buf.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| {
            serde_json::from_str(l).with_context(|| format!("invalid command on line {}", n + 1))
        })
        .collect()
}

fn show(reg: &Registry, poset: PosetHandle) -> Value {
    let p = match reg.get(poset) {
        Ok(p) => p,
        Err(e) => return json!({ "op": "show", "poset": poset, "error": e.code() }),
    };
    let order = match p.linear_extension() {
        Ok(order) => json!(order),
        Err(v) => json!({ "error": v.to_string() }),
    };
    json!({
        "op": "show",
        "poset": poset,
        "snapshot": p.snapshot(),
        "linear_extension": order,
        "incomparable": p.incomparable_pairs(),
    })
}

fn execute(reg: &mut Registry, cmd: Command) -> Value {
    match cmd {
        Command::New => json!({ "op": "new", "poset": reg.new_poset() }),
        Command::Delete { poset } => {
            reg.delete(poset);
            json!({ "op": "delete", "poset": poset })
        }
        Command::Size { poset } => json!({ "op": "size", "poset": poset, "result": reg.size(poset) }),
        Command::Insert { poset, label } => {
            json!({ "op": "insert", "poset": poset, "result": reg.insert(poset, &label) })
        }
        Command::Remove { poset, label } => {
            json!({ "op": "remove", "poset": poset, "result": reg.remove(poset, &label) })
        }
        Command::Add { poset, a, b } => {
            json!({ "op": "add", "poset": poset, "result": reg.add(poset, &a, &b) })
        }
        Command::Del { poset, a, b } => {
            json!({ "op": "del", "poset": poset, "result": reg.del(poset, &a, &b) })
        }
        Command::Test { poset, a, b } => {
            json!({ "op": "test", "poset": poset, "result": reg.test(poset, &a, &b) })
        }
        Command::Clear { poset } => {
            reg.clear(poset);
            json!({ "op": "clear", "poset": poset })
        }
        Command::Show { poset } => show(reg, poset),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?.apply_env();
    if let Some(format) = cli.log_format.as_deref() {
        config.log.format = LogFormat::parse(format);
    }
    if cli.verify {
        config.registry.verify_invariants = true;
    }
    init_tracing(&config.log);

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let script = parse_script(&buf)?;
    tracing::info!(commands = script.len(), "running script");

    let mut reg = Registry::with_config(config.registry);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for cmd in script {
        let line = execute(&mut reg, cmd);
        writeln!(out, "{line}")?;
    }
    Ok(())
}
