//! Audio playback model: speed, time readout and chapter-synchronised resume

mod clock;
mod rate;
mod session;

pub use clock::{format_time, time_display, TimeDisplay, UNKNOWN_TIME};
pub use rate::{PlaybackRate, SPEEDS};
pub use session::{
    spawn_ticker, AudioSession, MediaEvent, PlaybackEngine, SourceChange, TickerHandle,
    TICK_INTERVAL,
};
