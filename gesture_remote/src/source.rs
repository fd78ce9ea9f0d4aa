//! Landmark sources: LeapMotion hardware, keyboard simulation and trace
//! replay.
//!
//! Every source runs on its own thread and delivers [`Frame`]s over an
//! `mpsc` channel, so the app loop does not care where hands come from.
//! A source stops when its [`StopSignal`] fires or the receiving end is
//! dropped, whichever it notices first.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hand_gesture::synthetic::HandPose;
use hand_gesture::{Frame, HandDetection};
use tracing::{debug, warn};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for hw, sim and trace
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`Frame`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    /// Label for logs and the HUD.
    fn name(&self) -> &'static str;

    /// Produce frames until the source runs dry, `tx` is disconnected or
    /// `stop` fires. Long waits must go through `stop` so shutdown is prompt.
    fn run(self: Box<Self>, tx: Sender<Frame>, stop: StopSignal);
}

// ════════════════════════════════════════════════════════════════════════════
// StopSignal: interruptible waits for source threads
// ════════════════════════════════════════════════════════════════════════════

/// Fires once the paired [`Sender`] is dropped.
pub struct StopSignal {
    rx: Receiver<()>,
}

/// A stop sender and its signal. Drop the sender to stop the source.
pub fn stop_signal() -> (Sender<()>, StopSignal) {
    let (tx, rx) = mpsc::channel();
    (tx, StopSignal { rx })
}

impl StopSignal {
    /// Sleep for up to `timeout`, waking early on stop. Returns `true` once
    /// a stop has been requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Keyboard-held poses in the visualizer window.
    Sim,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
    /// Replay of a recorded JSON-lines trace.
    Trace,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Sim   => "sim",
            SourceKind::Leap  => "leap",
            SourceKind::Trace => "trace",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// A running source: the frame receiver, its stop sender and the thread
/// to join.
pub struct SourceHandle {
    name:   &'static str,
    rx:     Receiver<Frame>,
    stop:   Sender<()>,
    thread: JoinHandle<()>,
}

impl SourceHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn frames(&self) -> &Receiver<Frame> {
        &self.rx
    }

    /// Stop the source and wait for its thread to finish.
    pub fn shutdown(self) {
        let SourceHandle { name, rx, stop, thread } = self;
        drop(stop);
        drop(rx);
        if thread.join().is_err() {
            warn!(source = name, "landmark source thread panicked");
        } else {
            debug!(source = name, "landmark source stopped");
        }
    }
}

/// Spawn a landmark source on its own thread.
pub fn spawn_landmark_source(source: Box<dyn LandmarkSource>) -> SourceHandle {
    let name = source.name();
    let (tx, rx) = mpsc::channel();
    let (stop, signal) = stop_signal();
    let thread = thread::spawn(move || source.run(tx, signal));
    SourceHandle { name, rx, stop, thread }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Frame period of the simulator, about 30 fps.
pub const SIM_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// How far a drifting pinch moves per frame, in normalized units.
const PINCH_DRIFT: f32 = 0.01;
const PINCH_MIN_X: f32 = 0.05;
const PINCH_MAX_X: f32 = 0.95;
const PINCH_HOME_X: f32 = 0.5;

/// A pose the simulator can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    OpenPalm,
    Fist,
    TwoFingers,
    OneFinger,
    /// Pinch drifting toward smaller x.
    PinchLeft,
    /// Pinch drifting toward larger x.
    PinchRight,
    /// Pinch held in place.
    PinchStill,
}

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// Pose now held; `None` takes the hand out of view.
    Hold(Option<SimPose>),
    Quit,
}

/// The simulated hand: the held pose and where a pinch currently is.
#[derive(Clone, Debug)]
pub struct SimHand {
    pose:    Option<SimPose>,
    pinch_x: f32,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { pose: None, pinch_x: PINCH_HOME_X }
    }
}

impl SimHand {
    pub fn hold(&mut self, pose: Option<SimPose>) {
        self.pose = pose;
    }

    /// Hands for the next frame. Drifting pinches move one step per call;
    /// any other pose sends the pinch back home.
    pub fn next_hands(&mut self) -> Vec<HandDetection> {
        let pose = match self.pose {
            None => {
                self.pinch_x = PINCH_HOME_X;
                return Vec::new();
            }
            Some(SimPose::PinchLeft) => {
                self.pinch_x = (self.pinch_x - PINCH_DRIFT).max(PINCH_MIN_X);
                HandPose::pinch(self.pinch_x)
            }
            Some(SimPose::PinchRight) => {
                self.pinch_x = (self.pinch_x + PINCH_DRIFT).min(PINCH_MAX_X);
                HandPose::pinch(self.pinch_x)
            }
            Some(SimPose::PinchStill) => HandPose::pinch(self.pinch_x),
            Some(other) => {
                self.pinch_x = PINCH_HOME_X;
                match other {
                    SimPose::OpenPalm   => HandPose::OpenPalm,
                    SimPose::Fist       => HandPose::Fist,
                    SimPose::TwoFingers => HandPose::TwoFingers,
                    _                   => HandPose::OneFinger,
                }
            }
        };
        vec![pose.detection()]
    }
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
///
/// Emits a frame every [`SIM_FRAME_INTERVAL`] whether or not a key is held,
/// timestamped from when the source started.
pub struct SimLandmarkSource {
    rx:       Receiver<SimInput>,
    interval: Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx, interval: SIM_FRAME_INTERVAL }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn run(self: Box<Self>, tx: Sender<Frame>, stop: StopSignal) {
        let start = Instant::now();
        let mut hand = SimHand::default();
        let mut next_frame = start;

        loop {
            if stop.is_set() {
                return;
            }
            let wait = next_frame.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(SimInput::Hold(pose)) => {
                    debug!(?pose, "sim pose");
                    hand.hold(pose);
                    continue;
                }
                Ok(SimInput::Quit) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => {}
            }

            let frame = Frame::new(start.elapsed(), hand.next_hands());
            if tx.send(frame).is_err() {
                return;
            }
            next_frame += self.interval;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Half-width of the tracked volume above the device, in mm.
#[cfg(feature = "leap")]
const LEAP_HALF_WIDTH_MM: f32 = 200.0;
/// Height of the tracked volume above the device, in mm.
#[cfg(feature = "leap")]
const LEAP_HEIGHT_MM: f32 = 400.0;
/// Back-off after a failed poll, e.g. with the device unplugged.
#[cfg(feature = "leap")]
const LEAP_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Leap joints are projected onto the 21-point hand layout: x in
/// ±200 mm maps to 0..1, height 0..400 mm maps to y 1..0 (image y grows
/// downward).
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
fn project(v: &leaprs::LeapVectorRef) -> hand_gesture::Keypoint {
    hand_gesture::Keypoint::new(
        (v.x + LEAP_HALF_WIDTH_MM) / (2.0 * LEAP_HALF_WIDTH_MM),
        1.0 - v.y / LEAP_HEIGHT_MM,
    )
    .with_z(v.z / LEAP_HEIGHT_MM)
}

#[cfg(feature = "leap")]
fn leap_hand(hand: &leaprs::HandRef) -> HandDetection {
    let mut points = Vec::with_capacity(hand_gesture::LANDMARK_COUNT);
    points.push(project(&hand.arm().next_joint()));
    // thumb, index, middle, ring, pinky: base, two inner joints, tip
    for digit in hand.digits().into_iter() {
        points.push(project(&digit.proximal().prev_joint()));
        points.push(project(&digit.intermediate().prev_joint()));
        points.push(project(&digit.distal().prev_joint()));
        points.push(project(&digit.distal().next_joint()));
    }
    HandDetection::new(points)
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn name(&self) -> &'static str {
        "leap"
    }

    fn run(self: Box<Self>, tx: Sender<Frame>, stop: StopSignal) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = ?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::error!(error = ?e, "failed to open LeapMotion device");
            return;
        }
        tracing::info!("LeapMotion connected");

        let start = Instant::now();
        while !stop.is_set() {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(e) => {
                    debug!(error = ?e, "LeapC poll failed");
                    if stop.wait(LEAP_RETRY_INTERVAL) {
                        return;
                    }
                    continue;
                }
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame.hands().into_iter().map(|h| leap_hand(&h)).collect();
                if tx.send(Frame::new(start.elapsed(), hands)).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
