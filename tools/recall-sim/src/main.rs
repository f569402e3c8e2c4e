//! Play the memory game on a desktop.
//!
//! Keys come from stdin (one line at a time, `,` pauses for a second) or from
//! `--script`. The display and LED are logged, and the DAC output can be
//! dumped as raw 20kHz 16-bit little-endian codes with `--audio-out`.
//!
//! ```text
//! recall-sim --levels 3 --script '#,,,,,1' --audio-out game.raw
//! ```

mod audio;
mod board;
mod clock;
mod input;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use recall::random::StdRandom;
use recall::{DebouncePolicy, Game, GameConfig, GameOverPolicy, Shared};
use tracing::{Level, info};
use tracing_subscriber::util::SubscriberInitExt;

use crate::audio::AudioBridge;
use crate::board::{HostDelay, Matrix, TraceDisplay, TraceLed};
use crate::input::Source;

#[derive(Copy, Clone, ValueEnum)]
enum Debounce {
    /// press after two open samples then a closed one
    RisingEdge,
    /// press and release after five agreeing samples
    Stable,
}

impl From<Debounce> for DebouncePolicy {
    fn from(debounce: Debounce) -> Self {
        match debounce {
            Debounce::RisingEdge => DebouncePolicy::RisingEdge,
            Debounce::Stable => DebouncePolicy::Stable,
        }
    }
}

#[derive(Parser)]
#[command(name = "recall-sim")]
#[command(version, about = "Play the recall memory game in a terminal", long_about = None)]
struct Cli {
    /// Type these keys instead of reading stdin
    #[arg(short, long)]
    script: Option<String>,

    /// Dump every DAC code to this file
    #[arg(short, long)]
    audio_out: Option<PathBuf>,

    /// Pattern seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Levels to clear before winning
    #[arg(short, long, default_value_t = recall::config::MAX_SEQUENCE as u8)]
    levels: u8,

    #[arg(long, value_enum, default_value_t = Debounce::Stable)]
    debounce: Debounce,

    /// Hold "OVER" until a key is pressed
    #[arg(long)]
    wait_for_key: bool,

    /// Output volume, 0 to 4095
    #[arg(long, default_value_t = recall::synth::DEFAULT_VOLUME)]
    volume: u16,

    /// Keep running this long after the last key was typed
    #[arg(long, default_value_t = 3000)]
    linger_ms: u64,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let game_over = if cli.wait_for_key {
        GameOverPolicy::WaitForKey
    } else {
        GameOverPolicy::AutoAdvance
    };
    let config = GameConfig::builder()
        .seed(cli.seed)
        .max_sequence(cli.levels)
        .debounce(cli.debounce.into())
        .game_over(game_over)
        .volume(cli.volume)
        .build()
        .context("invalid game settings")?;

    let shared: &'static Shared = Box::leak(Box::new(Shared::new(&config)));
    let matrix: &'static Matrix = Box::leak(Box::<Matrix>::default());
    let running = Arc::new(AtomicBool::new(true));

    let mut port = matrix.port();
    let scanner = clock::spawn_ticker("scan", running.clone(), move || {
        shared.keys.on_scan_tick(&mut port);
    });
    let audio = AudioBridge::start(&shared.synth, cli.audio_out.as_deref(), running.clone())?;

    // the game never returns; it goes down with the process
    let _game: thread::JoinHandle<()> = thread::Builder::new()
        .name("game".into())
        .spawn(move || {
            let mut game = Game::new(
                config,
                shared,
                TraceDisplay::default(),
                TraceLed::default(),
                HostDelay,
                StdRandom::new(),
            );
            game.run()
        })
        .context("starting game thread")?;

    let source = match cli.script {
        Some(script) => Source::Script(script),
        None => Source::Stdin,
    };
    let _ = input::spawn(source, matrix).join();
    info!("input finished");
    thread::sleep(Duration::from_millis(cli.linger_ms));

    running.store(false, Ordering::Release);
    let _ = scanner.join();
    audio.finish()
}
