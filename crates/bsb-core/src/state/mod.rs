use std::sync::Arc;

use crate::corpus::ChapterLookup;
use crate::events::EventBus;
use crate::navigation::Navigator;
use crate::preferences::{PreferenceStore, Preferences};
use crate::selection::{LoadOutcome, SelectionController};
use crate::source::ContentSource;

/// The main application state
pub struct AppState {
    /// The current selection and its content
    pub selection: Arc<SelectionController>,

    /// Font, theme and playback preferences
    pub preferences: Arc<Preferences>,

    /// The event bus
    pub event_bus: Arc<EventBus>,
}

/// Collaborators and policy needed to build an [`AppState`]
pub struct AppStateConfig {
    pub source: Arc<dyn ContentSource>,
    pub lookup: Arc<dyn ChapterLookup + Send + Sync>,
    pub store: Arc<dyn PreferenceStore>,
    pub aliases: &'static [(&'static str, &'static str)],
    pub wrap: bool,
}

impl AppState {
    /// Create the application state. Preferences are initialised here.
    pub fn new(config: AppStateConfig) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let selection = SelectionController::new(config.source, config.lookup, event_bus.clone())
            .with_aliases(config.aliases)
            .with_navigator(Navigator::new(config.wrap));

        Self {
            selection: Arc::new(selection),
            preferences: Arc::new(Preferences::init(config.store)),
            event_bus,
        }
    }

    /// Restore a shared reference (if any), load the book list and the first
    /// chapter.
    pub async fn start(&self, initial_query: Option<&str>) -> LoadOutcome {
        if let Some(query) = initial_query {
            if let Err(e) = self.selection.restore_from_query(query) {
                tracing::warn!("Ignoring shared reference: {}", e);
            }
        }

        match self.selection.load_books().await {
            Some(load) => self.selection.load(load).await,
            None if self.selection.reference().is_set() => {
                let load = self.selection.reload();
                self.selection.load(load).await
            }
            None => LoadOutcome::Skipped,
        }
    }

    /// End the session: flush and close preferences
    pub fn shutdown(&self) {
        self.preferences.shutdown();
        tracing::info!("Reader state shut down");
    }
}
