//! Landmark traces: one JSON [`Frame`] per line.
//!
//! ```text
//! {"timestamp":0.0,"hands":[[{"x":0.5,"y":0.85},{"x":0.4,"y":0.78}, …]]}
//! {"timestamp":0.033,"hands":[]}
//! ```
//!
//! Traces let a session be recorded once (`--record`) and replayed without
//! hardware (`--source trace`).

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Instant;

use hand_gesture::Frame;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::source::{LandmarkSource, StopSignal};

// ════════════════════════════════════════════════════════════════════════════
// TraceReader
// ════════════════════════════════════════════════════════════════════════════

/// Iterates over the frames of a trace.
///
/// Blank lines are ignored. Lines that do not parse are logged and skipped;
/// a read error ends the trace.
pub struct TraceReader<R> {
    lines:   io::Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader { lines: reader.lines(), line_no: 0, skipped: 0 }
    }

    /// Lines skipped so far because they did not parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            let line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => {
                    warn!(line = self.line_no + 1, error = %e, "trace read failed, stopping");
                    return None;
                }
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "skipping bad trace line");
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TraceWriter
// ════════════════════════════════════════════════════════════════════════════

/// Records frames in the trace format.
pub struct TraceWriter<W: Write = BufWriter<File>> {
    out:    W,
    frames: u64,
}

impl TraceWriter {
    /// Create (or truncate) a trace file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        info!(path = %path.display(), "recording landmark trace");
        Ok(TraceWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        TraceWriter { out, frames: 0 }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        serde_json::to_writer(&mut self.out, frame)?;
        self.out.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TraceLandmarkSource
// ════════════════════════════════════════════════════════════════════════════

/// Replays a trace file, using the timestamps stored in it.
///
/// With `realtime` set, each frame is held back until its timestamp has
/// elapsed since replay started; otherwise frames go out as fast as the
/// receiver takes them. Either way replay ends as soon as a stop is
/// requested, even in the middle of a gap between frames.
pub struct TraceLandmarkSource {
    path:     PathBuf,
    reader:   TraceReader<BufReader<File>>,
    realtime: bool,
}

impl TraceLandmarkSource {
    /// Open the trace up front so a missing file is reported before any
    /// thread starts.
    pub fn open(path: impl Into<PathBuf>, realtime: bool) -> Result<Self> {
        let path = path.into();
        let reader = TraceReader::open(&path)?;
        Ok(TraceLandmarkSource { path, reader, realtime })
    }
}

impl LandmarkSource for TraceLandmarkSource {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn run(self: Box<Self>, tx: Sender<Frame>, stop: StopSignal) {
        let TraceLandmarkSource { path, mut reader, realtime } = *self;
        let start = Instant::now();
        let mut sent = 0u64;

        for frame in reader.by_ref() {
            let stopped = match frame.timestamp.checked_sub(start.elapsed()) {
                Some(wait) if realtime => stop.wait(wait),
                _ => stop.is_set(),
            };
            if stopped {
                debug!(path = %path.display(), frames = sent, "trace replay stopped");
                return;
            }
            if tx.send(frame).is_err() {
                return;
            }
            sent += 1;
        }

        info!(
            path = %path.display(),
            frames = sent,
            skipped = reader.skipped(),
            "trace replay finished"
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
