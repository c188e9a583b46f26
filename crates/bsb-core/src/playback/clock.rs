//! Elapsed/total time readout at the chosen speed

use super::PlaybackRate;

/// Placeholder shown when a time is unknown
pub const UNKNOWN_TIME: &str = "--:--";

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour on
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return UNKNOWN_TIME.to_string();
    }
    let total = seconds.floor() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Formatted clock for the audio panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeDisplay {
    pub elapsed: String,
    pub total: String,
}

impl Default for TimeDisplay {
    fn default() -> Self {
        Self {
            elapsed: format_time(0.0),
            total: UNKNOWN_TIME.to_string(),
        }
    }
}

/// Elapsed and total time converted to wall-clock time at `rate`.
///
/// Elapsed never exceeds total, so the readout cannot show `3:10 / 3:05`.
pub fn time_display(current_time: f64, duration: Option<f64>, rate: PlaybackRate) -> TimeDisplay {
    let rate = rate.multiplier();
    let duration = duration.filter(|d| d.is_finite() && *d >= 0.0);
    let current = if current_time.is_finite() { current_time.max(0.0) } else { 0.0 };

    let elapsed = current / rate;
    let total = duration.map(|d| d / rate);
    let elapsed = total.map_or(elapsed, |t| elapsed.min(t));

    TimeDisplay {
        elapsed: format_time(elapsed),
        total: total.map_or_else(|| UNKNOWN_TIME.to_string(), format_time),
    }
}
