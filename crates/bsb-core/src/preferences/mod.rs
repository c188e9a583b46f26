//! Reader preferences: font size, theme, notes and playback speed
//!
//! Preferences live in an explicit [`Preferences`] context created at startup
//! with [`Preferences::init`] and closed with [`Preferences::shutdown`].
//! Components that need them receive the context; there is no global.

mod store;

pub use store::{MemoryPreferenceStore, PreferenceStore};

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::playback::PlaybackRate;

pub const FONT_SIZE_KEY: &str = "bsb:fontSize";
pub const THEME_KEY: &str = "theme";
pub const PLAYBACK_RATE_KEY: &str = "bsb_playback_rate";
pub const NOTES_KEY: &str = "bsb:notes";

/// Text size tiers, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Xs,
    Sm,
    #[default]
    Base,
    Lg,
    Xl,
    Xxl,
}

impl FontSize {
    pub const ORDER: [FontSize; 6] = [
        FontSize::Xs,
        FontSize::Sm,
        FontSize::Base,
        FontSize::Lg,
        FontSize::Xl,
        FontSize::Xxl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Xs => "xs",
            FontSize::Sm => "sm",
            FontSize::Base => "base",
            FontSize::Lg => "lg",
            FontSize::Xl => "xl",
            FontSize::Xxl => "xxl",
        }
    }

    /// Style class applied to chapter text
    pub fn text_class(self) -> String {
        format!("text-size-{}", self.as_str())
    }

    /// Next size, wrapping from `xxl` back to `xs`
    pub fn cycle(self) -> Self {
        let idx = Self::ORDER.iter().position(|s| *s == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }
}

impl FromStr for FontSize {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ORDER.iter().copied().find(|f| f.as_str() == s).ok_or(())
    }
}

/// Colour scheme choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the platform preference
    #[default]
    System,
}

/// Theme after resolving `System`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// light → dark → system → light
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    pub fn resolve(self, system_prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if system_prefers_dark => ResolvedTheme::Dark,
            _ => ResolvedTheme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(()),
        }
    }
}

/// Current preference values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReaderSettings {
    pub font_size: FontSize,
    pub theme: Theme,
    pub playback_rate: PlaybackRate,
    /// Show footnote markers in chapter text
    pub notes: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_size: FontSize::default(),
            theme: Theme::default(),
            playback_rate: PlaybackRate::default(),
            notes: true,
        }
    }
}

fn notes_from_stored(value: Option<&str>) -> bool {
    value != Some("off")
}

/// Preference context shared by the components that need it
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    settings: RwLock<ReaderSettings>,
    open: AtomicBool,
}

impl Preferences {
    /// Load persisted values; missing or unrecognised values use defaults
    pub fn init(store: Arc<dyn PreferenceStore>) -> Self {
        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let playback_rate = PlaybackRate::from_stored(store.get(PLAYBACK_RATE_KEY).as_deref());
        let notes = notes_from_stored(store.get(NOTES_KEY).as_deref());

        let settings = ReaderSettings {
            font_size,
            theme,
            playback_rate,
            notes,
        };
        tracing::debug!("Preferences loaded: {:?}", settings);

        Self {
            store,
            settings: RwLock::new(settings),
            open: AtomicBool::new(true),
        }
    }

    pub fn settings(&self) -> ReaderSettings {
        *self.settings.read()
    }

    pub fn font_size(&self) -> FontSize {
        self.settings.read().font_size
    }

    pub fn theme(&self) -> Theme {
        self.settings.read().theme
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.settings.read().playback_rate
    }

    pub fn notes(&self) -> bool {
        self.settings.read().notes
    }

    pub fn set_font_size(&self, size: FontSize) -> Result<()> {
        self.update(FONT_SIZE_KEY, size.as_str(), |s| s.font_size = size)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.update(THEME_KEY, theme.as_str(), |s| s.theme = theme)
    }

    pub fn set_playback_rate(&self, rate: PlaybackRate) -> Result<()> {
        self.update(PLAYBACK_RATE_KEY, &rate.to_stored(), |s| s.playback_rate = rate)
    }

    pub fn set_notes(&self, notes: bool) -> Result<()> {
        let stored = if notes { "on" } else { "off" };
        self.update(NOTES_KEY, stored, |s| s.notes = notes)
    }

    pub fn cycle_font_size(&self) -> Result<FontSize> {
        let next = self.font_size().cycle();
        self.set_font_size(next)?;
        Ok(next)
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().toggle();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Show or hide footnote markers; returns the new state
    pub fn toggle_notes(&self) -> Result<bool> {
        let next = !self.notes();
        self.set_notes(next)?;
        Ok(next)
    }

    pub fn cycle_playback_rate(&self) -> Result<PlaybackRate> {
        let next = self.playback_rate().next();
        self.set_playback_rate(next)?;
        Ok(next)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Flush the store and close the context. Later updates fail.
    pub fn shutdown(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            if let Err(e) = self.store.flush() {
                tracing::warn!("Failed to flush preferences: {}", e);
            }
        }
    }

    fn update(
        &self,
        key: &str,
        value: &str,
        apply: impl FnOnce(&mut ReaderSettings),
    ) -> Result<()> {
        if !self.is_open() {
            return Err(Error::PreferencesClosed);
        }
        apply(&mut self.settings.write());
        // Storage failures are not fatal; the in-memory value still applies
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist preference '{}': {}", key, e);
        }
        Ok(())
    }
}

impl Drop for Preferences {
    fn drop(&mut self) {
        self.shutdown();
    }
}
