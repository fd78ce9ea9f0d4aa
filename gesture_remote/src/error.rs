//! Error type for the remote application.

/// Everything that can stop the remote from starting or running.
///
/// Per-frame problems never surface here: the gesture core turns input it
/// cannot read into "no gesture", and MIDI send failures are only logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The visualizer window could not be created or updated.
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// The MIDI subsystem could not be initialised.
    #[error("MIDI init error: {0}")]
    MidiInit(#[from] midir::InitError),

    /// Connecting to the selected MIDI output port failed.
    #[error("MIDI connect error: {0}")]
    MidiConnect(String),

    /// No MIDI output port matched.
    #[error("no MIDI output port found{}", port_filter(.0))]
    NoMidiPort(Option<String>),

    /// Reading or writing a landmark trace failed.
    #[error("trace io error: {0}")]
    Io(#[from] std::io::Error),

    /// A trace frame could not be encoded.
    #[error("trace json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid gesture configuration.
    #[error("config error: {0}")]
    Config(#[from] hand_gesture::ConfigError),

    /// The requested landmark source cannot run in this setup.
    #[error("landmark source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn port_filter(filter: &Option<String>) -> String {
    filter.as_ref().map(|p| format!(" matching {p:?}")).unwrap_or_default()
}
