//! Audio tied to the current chapter

use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::clock::{time_display, TimeDisplay};
use super::PlaybackRate;

/// Display refresh period. Finer-grained progress events are ignored.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The native playback element
pub trait PlaybackEngine: Send {
    /// Load a new source, or unload with `None`
    fn set_source(&mut self, url: Option<&str>);

    /// Start playback. May be rejected (e.g. autoplay policy).
    fn play(&mut self) -> anyhow::Result<()>;

    fn set_rate(&mut self, rate: f64);

    /// Playback position in media seconds
    fn current_time(&self) -> f64;

    /// Media length in seconds, once known
    fn duration(&self) -> Option<f64>;
}

/// Notifications from the playback engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
    /// Enough media is buffered to start playing
    CanPlay,
    LoadedMetadata,
    DurationChange,
    RateChange(f64),
}

/// Result of switching the audio source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChange {
    /// Same source as before
    Unchanged,
    /// New source loaded, nothing was playing
    Loaded,
    /// Was playing; playback resumed on the new source
    Resumed,
    /// Was playing; resume was rejected and one retry waits for `CanPlay`
    RetryPending,
    /// No audio for this reference
    Unavailable,
}

/// Tracks the audio source for the current chapter and keeps playing across
/// chapter changes.
pub struct AudioSession<E> {
    engine: E,
    source: Option<String>,
    playing: bool,
    retry_pending: bool,
    rate: PlaybackRate,
}

impl<E: PlaybackEngine> AudioSession<E> {
    pub fn new(engine: E, rate: PlaybackRate) -> Self {
        Self {
            engine,
            source: None,
            playing: false,
            retry_pending: false,
            rate,
        }
    }

    /// Switch to the audio for a new chapter.
    ///
    /// If audio was playing, a resume is issued. A rejected resume is retried
    /// exactly once when the engine reports `CanPlay`.
    pub fn set_source(&mut self, url: Option<String>) -> SourceChange {
        if url == self.source {
            return SourceChange::Unchanged;
        }

        self.source = url;
        self.retry_pending = false;
        self.engine.set_source(self.source.as_deref());

        if self.source.is_none() {
            tracing::debug!("No audio for this chapter");
            return SourceChange::Unavailable;
        }

        self.engine.set_rate(self.rate.multiplier());

        if !self.playing {
            return SourceChange::Loaded;
        }

        match self.engine.play() {
            Ok(()) => SourceChange::Resumed,
            Err(e) => {
                tracing::debug!("Resume rejected, retrying when ready: {}", e);
                self.retry_pending = true;
                SourceChange::RetryPending
            }
        }
    }

    /// Apply an engine notification
    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::Play => self.playing = true,
            MediaEvent::Pause | MediaEvent::Ended => self.playing = false,
            MediaEvent::CanPlay => {
                // Some engines ignore the rate until media is ready
                self.engine.set_rate(self.rate.multiplier());
                if std::mem::take(&mut self.retry_pending) {
                    if let Err(e) = self.engine.play() {
                        tracing::debug!("Retry rejected, giving up: {}", e);
                    }
                }
            }
            MediaEvent::RateChange(rate) => self.rate = PlaybackRate::from_multiplier(rate),
            MediaEvent::LoadedMetadata | MediaEvent::DurationChange => {}
        }
    }

    pub fn set_rate(&mut self, rate: PlaybackRate) {
        self.rate = rate;
        self.engine.set_rate(rate.multiplier());
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether the panel has anything to play
    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Read the engine clock into a display value
    pub fn sample(&self) -> TimeDisplay {
        time_display(self.engine.current_time(), self.engine.duration(), self.rate)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

/// Periodic display refresh; stops when dropped.
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Sample the session once per second and hand the readout to `on_tick`
pub fn spawn_ticker<E, F>(session: Arc<Mutex<AudioSession<E>>>, on_tick: F) -> TickerHandle
where
    E: PlaybackEngine + 'static,
    F: Fn(TimeDisplay) + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let display = session.lock().sample();
            on_tick(display);
        }
    });
    TickerHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeEngine {
        source: Option<String>,
        rejections_left: usize,
        play_calls: usize,
        rate: f64,
        time: f64,
        duration: Option<f64>,
    }

    impl PlaybackEngine for FakeEngine {
        fn set_source(&mut self, url: Option<&str>) {
            self.source = url.map(str::to_string);
            self.time = 0.0;
        }

        fn play(&mut self) -> anyhow::Result<()> {
            self.play_calls += 1;
            if self.rejections_left > 0 {
                self.rejections_left -= 1;
                anyhow::bail!("autoplay blocked");
            }
            Ok(())
        }

        fn set_rate(&mut self, rate: f64) {
            self.rate = rate;
        }

        fn current_time(&self) -> f64 {
            self.time
        }

        fn duration(&self) -> Option<f64> {
            self.duration
        }
    }

    fn url(chapter: u32) -> Option<String> {
        Some(format!("https://audio.example/John_{:02}.mp3", chapter))
    }

    #[test]
    fn test_source_change_while_paused() {
        let mut session =
            AudioSession::new(FakeEngine::default(), PlaybackRate::from_multiplier(1.5));
        assert_eq!(session.set_source(url(1)), SourceChange::Loaded);
        assert_eq!(session.set_source(url(1)), SourceChange::Unchanged);
        assert_eq!(session.engine().play_calls, 0);
        assert_eq!(session.engine().rate, 1.5);
    }

    #[test]
    fn test_resume_across_chapters() {
        let mut session = AudioSession::new(FakeEngine::default(), PlaybackRate::NORMAL);
        session.set_source(url(1));
        session.handle_event(MediaEvent::Play);

        assert_eq!(session.set_source(url(2)), SourceChange::Resumed);
        assert_eq!(session.engine().play_calls, 1);
        assert_eq!(session.engine().source, url(2));
    }

    #[test]
    fn test_exactly_one_retry() {
        let engine = FakeEngine {
            rejections_left: 5,
            ..Default::default()
        };
        let mut session = AudioSession::new(engine, PlaybackRate::NORMAL);
        session.set_source(url(1));
        session.handle_event(MediaEvent::Play);

        assert_eq!(session.set_source(url(2)), SourceChange::RetryPending);
        session.handle_event(MediaEvent::CanPlay);
        assert!(!session.retry_pending());
        session.handle_event(MediaEvent::CanPlay);

        // Initial attempt plus one retry, then silence
        assert_eq!(session.engine().play_calls, 2);
    }

    #[test]
    fn test_retry_succeeds() {
        let engine = FakeEngine {
            rejections_left: 1,
            ..Default::default()
        };
        let mut session = AudioSession::new(engine, PlaybackRate::NORMAL);
        session.handle_event(MediaEvent::Play);

        assert_eq!(session.set_source(url(3)), SourceChange::RetryPending);
        session.handle_event(MediaEvent::CanPlay);
        assert_eq!(session.engine().play_calls, 2);
        assert!(session.is_playing());
    }

    #[test]
    fn test_unavailable_source() {
        let mut session = AudioSession::new(FakeEngine::default(), PlaybackRate::NORMAL);
        session.set_source(url(1));
        assert_eq!(session.set_source(None), SourceChange::Unavailable);
        assert!(!session.is_available());
        assert_eq!(session.engine().source, None);
    }

    #[test]
    fn test_pause_stops_resume() {
        let mut session = AudioSession::new(FakeEngine::default(), PlaybackRate::NORMAL);
        session.set_source(url(1));
        session.handle_event(MediaEvent::Play);
        session.handle_event(MediaEvent::Ended);
        assert_eq!(session.set_source(url(2)), SourceChange::Loaded);
    }

    #[test]
    fn test_rate_change_event_and_sample() {
        let engine = FakeEngine {
            duration: Some(600.0),
            ..Default::default()
        };
        let mut session = AudioSession::new(engine, PlaybackRate::NORMAL);
        session.set_source(url(1));
        session.engine_mut().time = 90.0;
        session.handle_event(MediaEvent::RateChange(2.0));

        let display = session.sample();
        assert_eq!(display.elapsed, "0:45");
        assert_eq!(display.total, "5:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_once_per_second() {
        let session = Arc::new(Mutex::new(AudioSession::new(
            FakeEngine::default(),
            PlaybackRate::NORMAL,
        )));
        let ticks = Arc::new(Mutex::new(Vec::new()));

        let sink = ticks.clone();
        let handle = spawn_ticker(session.clone(), move |d| sink.lock().push(d));

        // First tick fires immediately, then one per second
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.lock().len(), 4);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.lock().len(), 4);
    }
}
