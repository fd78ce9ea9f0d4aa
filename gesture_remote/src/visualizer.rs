//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────┬────────────────┐
//! │                                          │  GESTURE       │
//! │   hand skeleton of the latest frame      │  REMOTE        │
//! │   (normalized coords → canvas pixels)    │                │
//! │                                          │  raw / event   │
//! │                                          │  command       │
//! │                                          │  play state    │
//! │                                          │  volume bar    │
//! │                                          │  position bar  │
//! │                                          │  key legend    │
//! ├──────────────────────────────────────────┴────────────────┤
//! │  status bar                                               │
//! └───────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use hand_gesture::landmark::HAND_CONNECTIONS;
use hand_gesture::{Frame, Gesture, Keypoint};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::dispatch::Command;
use crate::error::Result;
use crate::source::{SimInput, SimPose};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 960;
pub const WIN_H:       usize = 600;
const PANEL_W:         usize = 300;
const CANVAS_W:        usize = WIN_W - PANEL_W;
const STATUS_H:        usize = 40;
const CANVAS_H:        usize = WIN_H - STATUS_H;
const PANEL_X:         usize = CANVAS_W;
const BAR_W:           usize = PANEL_W - 40;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const PANEL_BG:        u32   = 0xFF16213E;
const TEXT_BG:         u32   = 0xFF0F3460;
const TITLE_COLOR:     u32   = 0xFFFFD700;
const TEXT_COLOR:      u32   = 0xFFEEEEEE;
const DIM_COLOR:       u32   = 0xFF888888;
const PLAYING_COLOR:   u32   = 0xFF66DD66;
const PAUSED_COLOR:    u32   = 0xFFDD6666;
const TIP_COLOR:       u32   = 0xFFFFFFFF;
const PINCH_COLOR:     u32   = 0xFFFFD700;

/// Skeleton colors, cycled per hand in the frame.
const HAND_COLORS: [u32; 3] = [0xFF4FC3F7, 0xFFFFB74D, 0xFFBA68C8];

// ════════════════════════════════════════════════════════════════════════════
// Hud: per-frame snapshot of the app state
// ════════════════════════════════════════════════════════════════════════════

/// Everything the side panel shows.
#[derive(Clone, Debug)]
pub struct Hud<'a> {
    pub source:       &'a str,
    pub player:       &'a str,
    pub raw:          Option<Gesture>,
    pub last_event:   Option<Gesture>,
    pub last_command: Option<Command>,
    pub playing:      bool,
    pub volume:       u8,
    pub position:     Duration,
    pub length:       Duration,
    pub swiping:      bool,
    /// Index into the frame's hands of the one that was classified.
    pub active_hand:  Option<usize>,
    pub frames:       u64,
    pub status:       &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:    Window,
    buf:       Vec<u32>,
    /// Present only when the keyboard simulator is the landmark source.
    sim_tx:    Option<Sender<SimInput>>,
    held:      Option<SimPose>,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Gesture Remote",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.set_target_fps(60);

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            held: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll the keyboard. Returns false when the user asked to quit.
    ///
    /// In simulation mode the currently held key selects the simulated pose;
    /// a [`SimInput::Hold`] is sent only when that selection changes.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            if let Some(tx) = &self.sim_tx {
                let _ = tx.send(SimInput::Quit);
            }
            return false;
        }

        let Some(tx) = &self.sim_tx else { return true };

        let down = |k: Key| self.window.is_key_down(k);
        let pose = if down(Key::O) {
            Some(SimPose::OpenPalm)
        } else if down(Key::F) {
            Some(SimPose::Fist)
        } else if down(Key::U) {
            Some(SimPose::TwoFingers)
        } else if down(Key::J) {
            Some(SimPose::OneFinger)
        } else if down(Key::Left) {
            Some(SimPose::PinchLeft)
        } else if down(Key::Right) {
            Some(SimPose::PinchRight)
        } else if down(Key::Down) {
            Some(SimPose::PinchStill)
        } else {
            None
        };

        if pose != self.held {
            self.held = pose;
            if tx.send(SimInput::Hold(pose)).is_err() {
                return false;
            }
        }
        true
    }

    /// Render one frame.
    pub fn render(&mut self, frame: Option<&Frame>, hud: &Hud<'_>) -> Result<()> {
        self.buf.fill(BG_COLOR);

        // ── Hand canvas ───────────────────────────────────────────────────
        if let Some(frame) = frame {
            for (i, hand) in frame.hands.iter().enumerate() {
                let color = HAND_COLORS[i % HAND_COLORS.len()];
                self.draw_hand(hand.keypoints(), color, hud.swiping && hud.active_hand == Some(i));
            }
            if frame.hands.is_empty() {
                self.draw_text("no hand", CANVAS_W / 2 - 28, CANVAS_H / 2, 2, DIM_COLOR);
            }
        }

        // ── Side panel ────────────────────────────────────────────────────
        self.fill_rect(PANEL_X, 0, PANEL_W, CANVAS_H, PANEL_BG);
        self.draw_panel(hud);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, CANVAS_H, WIN_W, STATUS_H, TEXT_BG);
        self.draw_text(hud.status, 10, CANVAS_H + 8, 2, TEXT_COLOR);
        self.draw_text(
            &format!("source: {}   player: {}   frames: {}", hud.source, hud.player, hud.frames),
            10,
            CANVAS_H + 28,
            1,
            DIM_COLOR,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H)?;
        Ok(())
    }

    // ── Hand ──────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, points: &[Keypoint], color: u32, swiping: bool) {
        let px: Vec<Option<(i32, i32)>> = points.iter().map(|k| to_canvas(*k)).collect();

        // Bones only make sense for a complete hand.
        if px.len() == hand_gesture::LANDMARK_COUNT {
            for [a, b] in HAND_CONNECTIONS {
                if let (Some(p0), Some(p1)) = (px[a], px[b]) {
                    self.draw_line(p0, p1, blend(color, BG_COLOR, 0.3));
                }
            }
        }

        for (i, p) in px.iter().enumerate() {
            let Some((x, y)) = *p else { continue };
            let tip = matches!(i, 4 | 8 | 12 | 16 | 20);
            let c = if tip { TIP_COLOR } else { color };
            self.fill_dot(x, y, if tip { 4 } else { 3 }, c);
        }

        // Highlight the pinch pair while a swipe is being tracked.
        if swiping && px.len() == hand_gesture::LANDMARK_COUNT {
            if let (Some(thumb), Some(index)) = (px[4], px[8]) {
                self.draw_line(thumb, index, PINCH_COLOR);
                self.fill_dot(index.0, index.1, 6, PINCH_COLOR);
            }
        }
    }

    // ── Side panel ────────────────────────────────────────────────────────

    fn draw_panel(&mut self, hud: &Hud<'_>) {
        let x = PANEL_X + 20;
        self.draw_text("GESTURE REMOTE", x, 16, 2, TITLE_COLOR);

        let label = |g: Option<Gesture>| g.map_or("-", |g| g.as_str());
        self.draw_text(&format!("raw:   {}", label(hud.raw)), x, 56, 2, TEXT_COLOR);
        self.draw_text(&format!("event: {}", label(hud.last_event)), x, 80, 2, TEXT_COLOR);
        let cmd = hud.last_command.map_or_else(|| "-".to_string(), |c| c.to_string());
        self.draw_text(&format!("cmd:   {cmd}"), x, 104, 2, TEXT_COLOR);

        let (state, color) = if hud.playing {
            ("PLAYING", PLAYING_COLOR)
        } else {
            ("PAUSED", PAUSED_COLOR)
        };
        self.draw_text(state, x, 144, 3, color);

        // Volume
        self.draw_text(&format!("volume {}%", hud.volume), x, 190, 2, TEXT_COLOR);
        self.draw_bar(x, 210, f32::from(hud.volume) / 100.0, TITLE_COLOR);

        // Position
        self.draw_text(
            &format!("{} / {}", clock(hud.position), clock(hud.length)),
            x,
            246,
            2,
            TEXT_COLOR,
        );
        let progress = if hud.length.is_zero() {
            0.0
        } else {
            (hud.position.as_secs_f64() / hud.length.as_secs_f64()) as f32
        };
        self.draw_bar(x, 266, progress, PLAYING_COLOR);

        let swipe = if hud.swiping { "swipe: tracking" } else { "swipe: idle" };
        self.draw_text(swipe, x, 302, 2, if hud.swiping { PINCH_COLOR } else { DIM_COLOR });

        // ── Key legend ────────────────────────────────────────────────────
        let legend = [
            "O=palm(play)  F=fist(pause)",
            "U=two(vol+)  J=one(vol-)",
            "<- / -> = pinch swipe (seek)",
            "Down = still pinch",
            "Q / Esc = quit",
        ];
        let mut y = CANVAS_H - 16 - legend.len() * 12;
        for line in legend {
            self.draw_text(line, x, y, 1, DIM_COLOR);
            y += 12;
        }
    }

    fn draw_bar(&mut self, x: usize, y: usize, fraction: f32, color: u32) {
        let filled = (BAR_W as f32 * fraction.clamp(0.0, 1.0)) as usize;
        self.fill_rect(x, y, BAR_W, 12, TEXT_BG);
        self.fill_rect(x, y, filled, 12, color);
        self.draw_border(x, y, BAR_W, 12, DIM_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..(x + w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Plot inside the hand canvas only.
    fn plot(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < CANVAS_W && (y as usize) < CANVAS_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn fill_dot(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.plot(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Bresenham line, clipped to the canvas per pixel.
    fn draw_line(&mut self, (mut x0, mut y0): (i32, i32), (x1, y1): (i32, i32), color: u32) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            self.plot(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Minimal bitmap font: 3×5 glyphs, magnified by `scale`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
    }
}

/// Normalized keypoint → canvas pixel. Non-finite coordinates are not drawn;
/// far out-of-range ones are pinned just outside the canvas.
fn to_canvas(k: Keypoint) -> Option<(i32, i32)> {
    if !k.x.is_finite() || !k.y.is_finite() {
        return None;
    }
    let x = (k.x.clamp(-1.0, 2.0) * CANVAS_W as f32) as i32;
    let y = (k.y.clamp(-1.0, 2.0) * CANVAS_H as f32) as i32;
    Some((x, y))
}

/// m:ss, or h:mm:ss past the hour.
fn clock(d: Duration) -> String {
    let s = d.as_secs();
    if s >= 3600 {
        format!("{}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
    } else {
        format!("{}:{:02}", s / 60, s % 60)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let channel = |c: u32, shift: u32| (c >> shift) & 0xFF;
    0xFF000000
        | (lerp(channel(a, 16), channel(b, 16)) << 16)
        | (lerp(channel(a, 8), channel(b, 8)) << 8)
        | lerp(channel(a, 0), channel(b, 0))
}
