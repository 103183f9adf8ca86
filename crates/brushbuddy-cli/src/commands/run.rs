use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use brushbuddy_core::{Command, Config, RoutineSession, Setup, Ticker};
use clap::Args;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::terminal::{OutputMode, TerminalPort};

#[derive(Args)]
pub struct RunArgs {
    /// Avatar to brush with (defaults to setup.default_avatar)
    #[arg(long)]
    avatar: Option<String>,
    /// Built-in background track, by title or file name
    #[arg(long, conflicts_with = "music")]
    track: Option<String>,
    /// Custom music file
    #[arg(long)]
    music: Option<PathBuf>,
    /// Tick period in milliseconds (defaults to routine.tick_interval_ms)
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Emit events as JSON lines
    #[arg(long)]
    json: bool,
    /// Exit as soon as the routine completes
    #[arg(long)]
    once: bool,
}

fn parse_key(line: &str) -> &'static [Command] {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "resume" => &[Command::TogglePause],
        "s" | "skip" => &[Command::Skip],
        "x" | "stop" => &[Command::Stop],
        "r" | "restart" => &[Command::Reset, Command::Start],
        "q" | "quit" => &[Command::Stop, Command::Quit],
        _ => &[],
    }
}

fn build_setup(args: &RunArgs, config: &Config) -> Result<Setup, Box<dyn std::error::Error>> {
    let mut setup = Setup::new();
    if let Some(avatar) = args.avatar.clone().or_else(|| config.setup.default_avatar.clone()) {
        setup.select_identity(avatar)?;
    }
    if let Some(path) = &args.music {
        setup.select_file(path.clone());
    } else if let Some(track) = args.track.as_ref().or(config.setup.default_track.as_ref()) {
        setup.select_track(track)?;
    }
    Ok(setup)
}

/// Forward stdin lines as commands. Runs on a plain thread so a pending read
/// never holds up runtime shutdown.
fn spawn_stdin_reader(commands: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for command in parse_key(&line) {
                if commands.blocking_send(*command).is_err() {
                    return;
                }
            }
        }
        debug!("stdin closed");
    });
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let setup = build_setup(&args, &config)?;
    let catalog = config.catalog();
    let period = args
        .tick_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.tick_interval());

    let (tx, rx) = mpsc::channel(16);
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let port = TerminalPort::new(
        std::io::stdout(),
        mode,
        config.assets(),
        config.ring(),
        config.track_dir(),
        catalog.len(),
    )
    .restart_hint(!args.once);

    let mut session = RoutineSession::new(catalog, setup, port);
    session.start()?;
    info!(period_ms = period.as_millis() as u64, "routine running");

    spawn_stdin_reader(tx);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let ticker = Ticker::new(period).exit_on_complete(args.once);
    runtime.block_on(ticker.run(&mut session, rx));
    Ok(())
}
