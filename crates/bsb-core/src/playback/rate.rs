//! Playback speed multipliers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Speeds in cycle order: 1.00x → 1.25x → ... → 0.75x → 1.00x
pub const SPEEDS: [f64; 7] = [1.0, 1.25, 1.5, 1.75, 2.0, 0.5, 0.75];

/// One of the fixed playback speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "f64", from = "f64")]
pub struct PlaybackRate(usize);

impl PlaybackRate {
    pub const NORMAL: PlaybackRate = PlaybackRate(0);

    /// Match a multiplier to the known speeds (to two decimals).
    ///
    /// Unknown or non-finite values map to 1.00x.
    pub fn from_multiplier(value: f64) -> Self {
        if !value.is_finite() {
            return Self::NORMAL;
        }
        let hundredths = (value * 100.0).round();
        SPEEDS
            .iter()
            .position(|s| (s * 100.0).round() == hundredths)
            .map(PlaybackRate)
            .unwrap_or(Self::NORMAL)
    }

    /// Parse a stored value such as `"1.25"`, falling back to 1.00x
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(Self::from_multiplier)
            .unwrap_or(Self::NORMAL)
    }

    pub fn multiplier(self) -> f64 {
        SPEEDS[self.0]
    }

    /// The following speed in cycle order
    pub fn next(self) -> Self {
        PlaybackRate((self.0 + 1) % SPEEDS.len())
    }

    /// Value written to the preference store
    pub fn to_stored(self) -> String {
        self.multiplier().to_string()
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<f64> for PlaybackRate {
    fn from(value: f64) -> Self {
        Self::from_multiplier(value)
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.multiplier()
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.multiplier())
    }
}
