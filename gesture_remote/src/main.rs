//! gesture_remote: command line entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use gesture_remote::{run, AppConfig, DispatchConfig, PlayerKind, SourceKind};
use hand_gesture::{GestureConfig, HandPolicy};

#[derive(Parser, Debug)]
#[command(name = "gesture_remote", version, about = "Control a media player with hand gestures")]
struct Args {
    /// Where hand landmarks come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Sim, env = "GESTURE_SOURCE")]
    source: SourceKind,

    /// JSON-lines trace to replay with `--source trace`.
    #[arg(long, env = "GESTURE_TRACE")]
    trace: Option<PathBuf>,

    /// Replay the trace at its recorded pace instead of as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Record every frame to this trace file.
    #[arg(long, env = "GESTURE_RECORD")]
    record: Option<PathBuf>,

    /// Player backend.
    #[arg(long, value_enum, default_value_t = PlayerKind::Sim, env = "GESTURE_PLAYER")]
    player: PlayerKind,

    /// Use the first MIDI output port whose name contains this text.
    #[arg(long, env = "GESTURE_MIDI_PORT")]
    midi_port: Option<String>,

    /// Seconds before a held gesture may fire again.
    #[arg(long, default_value_t = 2.0, env = "GESTURE_COOLDOWN")]
    cooldown: f64,

    /// Max thumb-index distance per axis that counts as a pinch.
    #[arg(long, default_value_t = 0.05, env = "GESTURE_PINCH_THRESHOLD")]
    pinch_threshold: f32,

    /// Volume change per gesture, in percent.
    #[arg(long, default_value_t = 10, env = "GESTURE_VOLUME_STEP")]
    volume_step: u8,

    /// Seconds to seek per swipe.
    #[arg(long, default_value_t = 10.0, env = "GESTURE_SEEK_STEP")]
    seek_step: f64,

    /// Which hand decides when several are in view: first or last.
    #[arg(long, default_value_t = HandPolicy::First, env = "GESTURE_HAND_POLICY")]
    hand_policy: HandPolicy,

    /// Length of the simulated stream in seconds.
    #[arg(long, default_value_t = 600.0, env = "GESTURE_LENGTH")]
    length: f64,

    /// Run without a window (trace or leap sources only).
    #[arg(long)]
    headless: bool,

    /// Debug logging (RUST_LOG overrides).
    #[arg(short, long)]
    verbose: bool,
}

fn secs(value: f64, flag: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid {flag}: {value}"))
}

impl Args {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let gesture = GestureConfig::new()
            .with_cooldown(secs(self.cooldown, "--cooldown")?)
            .with_pinch_threshold(self.pinch_threshold)
            .with_hand_policy(self.hand_policy);
        gesture.validate().context("invalid gesture configuration")?;

        let dispatch = DispatchConfig::default()
            .with_volume_step(self.volume_step)
            .with_seek_step(secs(self.seek_step, "--seek-step")?);

        Ok(AppConfig {
            source:    self.source,
            trace:     self.trace,
            realtime:  self.realtime,
            record:    self.record,
            player:    self.player,
            midi_port: self.midi_port,
            length:    secs(self.length, "--length")?,
            gesture,
            dispatch,
            headless:  self.headless,
        })
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let headless = args.headless;
    let cfg = args.into_config()?;

    if !headless {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║            Gesture Remote: hand-gesture media control        ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("  Source: {}   Player: {}", cfg.source, cfg.player);
        if cfg.source == SourceKind::Sim {
            println!("  Hold O/F/U/J for palm/fist/two/one, arrows to pinch-swipe, Q to quit");
        }
        println!();
    }

    let source = cfg.source;
    let summary = run(cfg).with_context(|| format!("gesture remote failed (source: {source})"))?;

    if headless {
        println!(
            "{} frames, {} gestures, {} commands",
            summary.frames, summary.events, summary.commands
        );
    }
    Ok(())
}
