//! Top-level application loop.
//!
//! `AppState` owns the `GestureSession`, the `Dispatcher` and the media
//! player. It consumes one `Frame` at a time and keeps what the visualizer
//! needs to draw.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use hand_gesture::{Frame, Gesture, GestureConfig, GestureSession};
use tracing::{debug, info};

use crate::dispatch::{Command, DispatchConfig, Dispatcher};
use crate::error::{Error, Result};
use crate::player::{open_player, MediaPlayer, PlayerKind, DEFAULT_LENGTH};
use crate::source::{
    spawn_landmark_source, LandmarkSource, SimInput, SimLandmarkSource, SourceHandle, SourceKind,
};
use crate::trace::{TraceLandmarkSource, TraceWriter};
use crate::visualizer::{Hud, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub source:    SourceKind,
    /// Trace to replay when `source` is [`SourceKind::Trace`].
    pub trace:     Option<PathBuf>,
    /// Replay traces at their recorded pace.
    pub realtime:  bool,
    /// Record every frame seen to this trace file.
    pub record:    Option<PathBuf>,
    pub player:    PlayerKind,
    /// Substring of the MIDI output port to use.
    pub midi_port: Option<String>,
    /// Length of the simulated stream.
    pub length:    Duration,
    pub gesture:   GestureConfig,
    pub dispatch:  DispatchConfig,
    /// Run without a window.
    pub headless:  bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source:    SourceKind::Sim,
            trace:     None,
            realtime:  false,
            record:    None,
            player:    PlayerKind::Sim,
            midi_port: None,
            length:    DEFAULT_LENGTH,
            gesture:   GestureConfig::default(),
            dispatch:  DispatchConfig::default(),
            headless:  false,
        }
    }
}

/// What a finished run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames:   u64,
    /// Gestures that made it through the debouncer.
    pub events:   u64,
    /// Events that changed the player.
    pub commands: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── gesture pipeline ─────────────────────────────────────────────────
    session:    GestureSession,
    dispatcher: Dispatcher,
    player:     Box<dyn MediaPlayer>,

    // ── latest frame / outcome ───────────────────────────────────────────
    last_frame:     Option<Frame>,
    last_event:     Option<Gesture>,
    last_command:   Option<Command>,
    prev_timestamp: Option<Duration>,
    summary:        RunSummary,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(
        gesture:  &GestureConfig,
        dispatch: DispatchConfig,
        player:   Box<dyn MediaPlayer>,
    ) -> Self {
        AppState {
            session:        GestureSession::new(gesture),
            dispatcher:     Dispatcher::new(dispatch),
            player,
            last_frame:     None,
            last_event:     None,
            last_command:   None,
            prev_timestamp: None,
            summary:        RunSummary::default(),
            status:         "Ready, show a hand".to_string(),
        }
    }

    // ── process one Frame ─────────────────────────────────────────────────

    /// Run one frame through the session and the dispatcher.
    ///
    /// The player clock advances by the gap to the previous frame's
    /// timestamp; a timestamp going backwards advances it by nothing.
    pub fn handle_frame(&mut self, frame: Frame) -> Option<Command> {
        if let Some(prev) = self.prev_timestamp {
            self.player.advance(frame.timestamp.saturating_sub(prev));
        }
        self.prev_timestamp = Some(frame.timestamp);
        self.summary.frames += 1;

        let mut command = None;
        if let Some(gesture) = self.session.process_frame(&frame) {
            self.summary.events += 1;
            self.last_event = Some(gesture);
            command = self.dispatcher.dispatch(gesture, self.player.as_mut());
            match command {
                Some(c) => {
                    self.summary.commands += 1;
                    self.last_command = Some(c);
                    self.status = format!("{gesture} -> {c}");
                }
                None => self.status = format!("{gesture} (no change)"),
            }
        }

        self.last_frame = Some(frame);
        command
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn session(&self)     -> &GestureSession   { &self.session }
    pub fn dispatcher(&self)  -> &Dispatcher       { &self.dispatcher }
    pub fn player(&self)      -> &dyn MediaPlayer  { self.player.as_ref() }
    pub fn last_frame(&self)  -> Option<&Frame>    { self.last_frame.as_ref() }
    pub fn last_event(&self)  -> Option<Gesture>   { self.last_event }
    pub fn summary(&self)     -> RunSummary        { self.summary }

    pub fn hud<'a>(&'a self, source: &'a str) -> Hud<'a> {
        Hud {
            source,
            player:       self.player.name(),
            raw:          self.session.last_raw(),
            last_event:   self.last_event,
            last_command: self.last_command,
            playing:      self.player.is_playing(),
            volume:       self.player.volume(),
            position:     self.player.position(),
            length:       self.player.length(),
            swiping:      self.session.classifier().swipe().is_tracking(),
            active_hand:  self.session.active_hand(),
            frames:       self.summary.frames,
            status:       &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Builds the landmark source and player from `cfg`, then feeds every frame
/// through an [`AppState`] until the source runs dry (headless) or the
/// window is closed.
pub fn run(cfg: AppConfig) -> Result<RunSummary> {
    cfg.gesture.validate()?;

    if cfg.headless && cfg.source == SourceKind::Sim {
        return Err(Error::Source(
            "the keyboard simulator needs a window; use --source trace for headless runs".into(),
        ));
    }

    if let (SourceKind::Trace, Some(trace), Some(record)) = (cfg.source, &cfg.trace, &cfg.record) {
        if same_file(trace, record) {
            return Err(Error::Source(format!(
                "--record {} would overwrite the trace being replayed",
                record.display()
            )));
        }
    }

    // ── Landmark source (+ sim input channel when simulating) ────────────
    let (source, sim_tx): (Box<dyn LandmarkSource>, Option<mpsc::Sender<SimInput>>) = match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            (Box::new(SimLandmarkSource::new(rx)) as Box<dyn LandmarkSource>, Some(tx))
        }
        SourceKind::Trace => {
            let path = cfg.trace.as_ref().ok_or_else(|| {
                Error::Source("--trace <path> is required for the trace source".into())
            })?;
            let source = TraceLandmarkSource::open(path, cfg.realtime)?;
            (Box::new(source) as Box<dyn LandmarkSource>, None)
        }
        SourceKind::Leap => (leap_source()?, None),
    };

    let mut recorder = cfg.record.as_deref().map(TraceWriter::create).transpose()?;

    // Window before the source thread, so a failure leaves no thread behind.
    let vis = if cfg.headless { None } else { Some(Visualizer::new(sim_tx)?) };

    let player = open_player(cfg.player, cfg.length, cfg.midi_port.as_deref());
    let mut app = AppState::new(&cfg.gesture, cfg.dispatch, player);

    let handle = spawn_landmark_source(source);
    info!(
        source = handle.name(),
        player = app.player().name(),
        policy = %cfg.gesture.hand_policy,
        "session started"
    );

    let outcome = match vis {
        Some(vis) => run_windowed(&mut app, &handle, vis, recorder.as_mut()),
        None      => run_headless(&mut app, &handle, recorder.as_mut()),
    };
    handle.shutdown();

    if let Some(rec) = recorder.as_mut() {
        rec.flush()?;
        info!(frames = rec.frames_written(), "trace recorded");
    }
    outcome?;

    let summary = app.summary();
    info!(
        frames = summary.frames,
        events = summary.events,
        commands = summary.commands,
        "session ended"
    );
    Ok(summary)
}

/// Same path, or two paths that resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    a == b || matches!((fs::canonicalize(a), fs::canonicalize(b)), (Ok(x), Ok(y)) if x == y)
}

#[cfg(feature = "leap")]
fn leap_source() -> Result<Box<dyn LandmarkSource>> {
    Ok(Box::new(crate::source::LeapLandmarkSource))
}

#[cfg(not(feature = "leap"))]
fn leap_source() -> Result<Box<dyn LandmarkSource>> {
    Err(Error::Source(
        "built without LeapMotion support; rebuild with --features leap".into(),
    ))
}

fn consume(app: &mut AppState, recorder: Option<&mut TraceWriter>, frame: Frame) -> Result<()> {
    if let Some(rec) = recorder {
        rec.write_frame(&frame)?;
    }
    app.handle_frame(frame);
    Ok(())
}

/// Drain frames until the source hangs up.
fn run_headless(
    app:          &mut AppState,
    handle:       &SourceHandle,
    mut recorder: Option<&mut TraceWriter>,
) -> Result<()> {
    for frame in handle.frames().iter() {
        consume(app, recorder.as_deref_mut(), frame)?;
    }
    Ok(())
}

/// Poll input, drain frames, render; ~60 fps until the window closes.
fn run_windowed(
    app:          &mut AppState,
    handle:       &SourceHandle,
    mut vis:      Visualizer,
    mut recorder: Option<&mut TraceWriter>,
) -> Result<()> {
    let mut source_done = false;

    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        while !source_done {
            match handle.frames().try_recv() {
                Ok(frame) => consume(app, recorder.as_deref_mut(), frame)?,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("landmark source finished");
                    app.status = format!("{} source finished, Q to quit", handle.name());
                    source_done = true;
                }
            }
        }

        vis.render(app.last_frame(), &app.hud(handle.name()))?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::io::BufRead;

    use hand_gesture::synthetic::HandPose;

    use super::*;
    use crate::player::SimPlayer;

    fn make_app() -> AppState {
        AppState::new(
            &GestureConfig::default(),
            DispatchConfig::default(),
            Box::new(SimPlayer::new(Duration::from_secs(120))),
        )
    }

    fn at(ms: u64, pose: HandPose) -> Frame {
        Frame::new(Duration::from_millis(ms), vec![pose.detection()])
    }

    #[test]
    fn play_while_playing_changes_nothing() {
        let mut app = make_app();
        assert_eq!(app.handle_frame(at(0, HandPose::OpenPalm)), None);
        assert_eq!(app.last_event(), Some(Gesture::Play));
        assert_eq!(app.summary().events, 1);
        assert_eq!(app.summary().commands, 0);
    }

    #[test]
    fn fist_pauses_and_palm_resumes() {
        let mut app = make_app();
        assert_eq!(app.handle_frame(at(0, HandPose::Fist)), Some(Command::Pause));
        assert!(!app.player().is_playing());
        assert_eq!(app.handle_frame(at(100, HandPose::OpenPalm)), Some(Command::Resume));
        assert!(app.player().is_playing());
    }

    #[test]
    fn two_fingers_raise_volume() {
        let mut app = make_app();
        assert_eq!(app.handle_frame(at(0, HandPose::TwoFingers)), Some(Command::SetVolume(60)));
        // Held: suppressed by the cooldown.
        assert_eq!(app.handle_frame(at(500, HandPose::TwoFingers)), None);
        assert_eq!(app.player().volume(), 60);
    }

    #[test]
    fn swipe_seeks_from_current_position() {
        let mut app = make_app();
        app.handle_frame(Frame::empty(Duration::ZERO));
        app.handle_frame(at(20_000, HandPose::pinch(0.40)));
        // Player has run for 20 s.
        assert_eq!(app.player().position(), Duration::from_secs(20));
        let cmd = app.handle_frame(at(20_000, HandPose::pinch(0.30)));
        assert_eq!(cmd, Some(Command::Seek(Duration::from_secs(30))));
    }

    #[test]
    fn paused_player_does_not_advance() {
        let mut app = make_app();
        app.handle_frame(at(0, HandPose::Fist));
        app.handle_frame(Frame::empty(Duration::from_secs(10)));
        assert_eq!(app.player().position(), Duration::ZERO);
    }

    #[test]
    fn backwards_timestamp_does_not_move_player() {
        let mut app = make_app();
        app.handle_frame(Frame::empty(Duration::from_secs(5)));
        app.handle_frame(Frame::empty(Duration::from_secs(2)));
        assert_eq!(app.player().position(), Duration::ZERO);
    }

    #[test]
    fn hud_reflects_state() {
        let mut app = make_app();
        app.handle_frame(at(0, HandPose::pinch(0.4)));
        let hud = app.hud("test");
        assert!(hud.swiping);
        assert_eq!(hud.raw, None);
        assert_eq!(hud.volume, 50);
        assert_eq!(hud.frames, 1);
    }

    #[test]
    fn headless_sim_is_rejected() {
        let cfg = AppConfig { headless: true, ..AppConfig::default() };
        assert!(matches!(run(cfg), Err(Error::Source(_))));
    }

    #[test]
    fn trace_without_path_is_rejected() {
        let cfg = AppConfig {
            source: SourceKind::Trace,
            headless: true,
            ..AppConfig::default()
        };
        assert!(matches!(run(cfg), Err(Error::Source(_))));
    }

    #[test]
    fn invalid_pinch_threshold_is_rejected() {
        let cfg = AppConfig {
            gesture: GestureConfig::default().with_pinch_threshold(0.0),
            headless: true,
            ..AppConfig::default()
        };
        assert!(matches!(run(cfg), Err(Error::Config(_))));
    }

    #[test]
    fn recording_over_the_replayed_trace_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let mut w = TraceWriter::create(&input).unwrap();
        w.write_frame(&at(0, HandPose::Fist)).unwrap();
        w.flush().unwrap();

        for record in [input.clone(), dir.path().join(".").join("in.jsonl")] {
            let cfg = AppConfig {
                source:   SourceKind::Trace,
                trace:    Some(input.clone()),
                record:   Some(record),
                headless: true,
                ..AppConfig::default()
            };
            assert!(matches!(run(cfg), Err(Error::Source(_))));
        }

        // The trace is left as it was.
        let kept = std::fs::File::open(&input).unwrap();
        assert_eq!(std::io::BufReader::new(kept).lines().count(), 1);
    }

    #[test]
    fn hud_follows_the_classified_hand() {
        let mut app = AppState::new(
            &GestureConfig::default().with_hand_policy(hand_gesture::HandPolicy::Last),
            DispatchConfig::default(),
            Box::new(SimPlayer::new(Duration::from_secs(120))),
        );
        app.handle_frame(Frame::new(
            Duration::ZERO,
            vec![HandPose::Fist.detection(), HandPose::pinch(0.4).detection()],
        ));
        assert_eq!(app.hud("test").active_hand, Some(1));
    }

    #[test]
    fn headless_trace_replay_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out.jsonl");

        let mut w = TraceWriter::create(&input).unwrap();
        for f in [
            at(0,   HandPose::Fist),
            at(100, HandPose::TwoFingers),
            at(200, HandPose::pinch(0.40)),
            at(300, HandPose::pinch(0.30)),
            Frame::empty(Duration::from_millis(400)),
        ] {
            w.write_frame(&f).unwrap();
        }
        w.flush().unwrap();

        let summary = run(AppConfig {
            source:   SourceKind::Trace,
            trace:    Some(input),
            record:   Some(output.clone()),
            headless: true,
            ..AppConfig::default()
        })
        .unwrap();

        assert_eq!(summary, RunSummary { frames: 5, events: 3, commands: 3 });

        let recorded = std::fs::File::open(output).unwrap();
        assert_eq!(std::io::BufReader::new(recorded).lines().count(), 5);
    }
}
