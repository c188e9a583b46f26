//! Chapter audio for the terminal reader

use std::sync::Arc;

use anyhow::bail;
use bsb_core::events::events::ReferenceChanged;
use bsb_core::playback::{
    spawn_ticker, AudioSession, MediaEvent, PlaybackEngine, PlaybackRate, SourceChange,
    TickerHandle, TimeDisplay,
};
use bsb_core::{EventBus, Reference, Subscription};
use bsb_data::AudioIndex;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Playback clock without an audio device.
///
/// Media time advances with wall time scaled by the rate while playing.
#[derive(Debug)]
pub struct SimulatedEngine {
    source: Option<String>,
    rate: f64,
    position: f64,
    started: Option<Instant>,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self {
            source: None,
            rate: 1.0,
            position: 0.0,
            started: None,
        }
    }
}

impl SimulatedEngine {
    pub fn pause(&mut self) {
        self.position = self.current_time();
        self.started = None;
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn set_source(&mut self, url: Option<&str>) {
        self.source = url.map(str::to_string);
        self.position = 0.0;
        self.started = None;
    }

    fn play(&mut self) -> anyhow::Result<()> {
        if self.source.is_none() {
            bail!("no audio source");
        }
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) {
        self.position = self.current_time();
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
        self.rate = rate;
    }

    fn current_time(&self) -> f64 {
        match self.started {
            Some(start) => self.position + start.elapsed().as_secs_f64() * self.rate,
            None => self.position,
        }
    }

    fn duration(&self) -> Option<f64> {
        None
    }
}

type SharedSession = Arc<Mutex<AudioSession<SimulatedEngine>>>;

/// Audio kept on the chapter being read
pub struct ChapterAudio {
    session: SharedSession,
    display: Arc<Mutex<TimeDisplay>>,
    _subscription: Subscription,
    _ticker: TickerHandle,
}

impl ChapterAudio {
    /// Follow reference changes on `events` and refresh the clock once a second
    pub fn attach(events: &EventBus, index: Arc<AudioIndex>, rate: PlaybackRate) -> Self {
        let session: SharedSession =
            Arc::new(Mutex::new(AudioSession::new(SimulatedEngine::default(), rate)));

        let follower = session.clone();
        let subscription = events.subscribe_fn::<ReferenceChanged, _>(move |event| {
            let url = audio_url(&index, &event.current);
            let mut session = follower.lock();
            if session.set_source(url) == SourceChange::RetryPending {
                // The simulated engine is ready as soon as the source is set
                session.handle_event(MediaEvent::CanPlay);
            }
        });

        let display = Arc::new(Mutex::new(TimeDisplay::default()));
        let sink = display.clone();
        let ticker = spawn_ticker(session.clone(), move |readout| *sink.lock() = readout);

        Self {
            session,
            display,
            _subscription: subscription,
            _ticker: ticker,
        }
    }

    pub fn play(&self) -> anyhow::Result<()> {
        let mut session = self.session.lock();
        session.engine_mut().play()?;
        session.handle_event(MediaEvent::Play);
        Ok(())
    }

    pub fn pause(&self) {
        let mut session = self.session.lock();
        session.engine_mut().pause();
        session.handle_event(MediaEvent::Pause);
    }

    pub fn set_rate(&self, rate: PlaybackRate) {
        self.session.lock().set_rate(rate);
    }

    pub fn is_playing(&self) -> bool {
        self.session.lock().is_playing()
    }

    pub fn source(&self) -> Option<String> {
        self.session.lock().source().map(str::to_string)
    }

    /// One-line audio panel
    pub fn status(&self) -> String {
        let session = self.session.lock();
        if !session.is_available() {
            return "audio: unavailable".to_string();
        }
        let display = self.display.lock();
        format!(
            "audio: {} {} / {} at {}",
            if session.is_playing() { "playing" } else { "paused" },
            display.elapsed,
            display.total,
            session.rate()
        )
    }
}

fn audio_url(index: &AudioIndex, reference: &Reference) -> Option<String> {
    let book_id = reference.book_id()?;
    index.build_audio_url(book_id, reference.chapter)
}
