use anyhow::Context;
use clap::Parser;
use dealrun_core::{GameConfig, Run};
use dealrun_data::{load_config_path, load_game_config};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

mod auto;
mod commands;
mod render;

use commands::{execute, parse_command, Command, Flow};

const DEFAULT_RUN_SEED: u64 = 0xC0FFEE;

#[derive(Parser, Debug)]
#[command(name = "dealrun")]
#[command(author, version, about = "Poker roguelike run in the terminal", long_about = None)]
struct Args {
    /// Run seed; the same seed and commands replay the same run
    #[arg(short, long, default_value_t = DEFAULT_RUN_SEED)]
    seed: u64,

    /// Config directory (split files) or single JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Let the greedy autoplayer finish the run
    #[arg(long)]
    auto: bool,

    /// Step limit for --auto
    #[arg(long, default_value_t = 1_000)]
    max_steps: usize,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let config = resolve_config(args.config.as_deref())?;

    if args.auto {
        let mut run = Run::new(config, args.seed).context("start run")?;
        let report = auto::run_auto(&mut run, args.max_steps);
        for event in run.drain_events() {
            println!("event: {event:?}");
        }
        println!(
            "auto: {} steps, phase {:?}, money {}",
            report.steps, report.phase, report.money
        );
        if args.json {
            let json = serde_json::to_string_pretty(&report).context("serialize report")?;
            println!("{json}");
            print_json(&run)?;
        }
        return Ok(());
    }

    interactive(config, args.seed, args.json)
}

fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// `--config` wins, then `./assets`, then the built-in tuning.
fn resolve_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    if let Some(path) = path {
        return load_config_path(path).with_context(|| format!("load {}", path.display()));
    }
    let assets = Path::new("assets");
    if assets.is_dir() {
        return load_game_config(assets).context("load assets");
    }
    Ok(GameConfig::default())
}

fn print_json(run: &Run) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&run.snapshot()).context("serialize snapshot")?;
    println!("{json}");
    Ok(())
}

fn interactive(config: GameConfig, seed: u64, json: bool) -> anyhow::Result<()> {
    let mut run = Run::new(config.clone(), seed).context("start run")?;
    render::print_help();
    render::print_state(&run);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} > ", render::phase_label(run.phase));
        io::stdout().flush().context("flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read command")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("error: {err}");
                continue;
            }
        };
        if let Command::New(next_seed) = command {
            run = Run::new(config.clone(), next_seed.unwrap_or(seed)).context("start run")?;
            render::print_state(&run);
            continue;
        }
        match execute(&mut run, command) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => println!("error: {err}"),
        }
        for event in run.drain_events() {
            println!("{}", render::format_event(&event));
        }
    }

    if json {
        print_json(&run)?;
    }
    Ok(())
}
