//! Tunables for a gesture session.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Minimum time between two emissions of the same gesture.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);

/// Maximum per-axis thumb-to-index distance that still counts as a pinch.
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// HandPolicy
// ════════════════════════════════════════════════════════════════════════════

/// Which hand governs when a frame contains several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPolicy {
    /// Classify only the first usable detection; other hands are ignored.
    #[default]
    First,
    /// Classify every usable detection in order; the last label wins.
    Last,
}

impl HandPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last  => "last",
        }
    }
}

impl fmt::Display for HandPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last"  => Ok(Self::Last),
            other   => Err(ConfigError::UnknownHandPolicy(other.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for a [`GestureSession`](crate::GestureSession).
///
/// ```rust
/// use std::time::Duration;
/// use hand_gesture::{GestureConfig, HandPolicy};
///
/// let config = GestureConfig::new()
///     .with_cooldown(Duration::from_millis(1500))
///     .with_pinch_threshold(0.04)
///     .with_hand_policy(HandPolicy::Last);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Debounce window for repeated identical gestures.
    pub cooldown: Duration,
    /// Pinch distance in normalized units (strict inequality, per axis).
    pub pinch_threshold: f32,
    pub hand_policy: HandPolicy,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            cooldown:        DEFAULT_COOLDOWN,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            hand_policy:     HandPolicy::First,
        }
    }
}

impl GestureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_pinch_threshold(mut self, threshold: f32) -> Self {
        self.pinch_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_hand_policy(mut self, policy: HandPolicy) -> Self {
        self.hand_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pinch_threshold.is_finite() || self.pinch_threshold <= 0.0 {
            return Err(ConfigError::InvalidPinchThreshold(self.pinch_threshold));
        }
        Ok(())
    }
}
