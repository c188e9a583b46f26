//! Cancellation tokens for chapter loads

use tokio::sync::watch;

use crate::reference::Reference;

/// A pending content load for one committed reference.
///
/// Every commit bumps the controller's generation; a load is current only
/// while its generation is the latest. Stale loads are abandoned and their
/// results are never applied.
#[derive(Debug, Clone)]
pub struct ContentLoad {
    reference: Reference,
    generation: u64,
    latest: watch::Receiver<u64>,
}

/// What happened to a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Markup replaced the displayed content
    Applied,
    /// The fetch failed; an error message was recorded
    Failed,
    /// A newer commit superseded this load
    Cancelled,
    /// Nothing to load (no book selected)
    Skipped,
}

impl ContentLoad {
    pub(crate) fn new(reference: Reference, generation: u64, latest: watch::Receiver<u64>) -> Self {
        Self {
            reference,
            generation,
            latest,
        }
    }

    /// The reference this load was issued for
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer commit has happened since this load was issued
    pub fn is_current(&self) -> bool {
        *self.latest.borrow() == self.generation
    }

    /// Resolves once a newer commit supersedes this load
    pub async fn cancelled(&mut self) {
        loop {
            if !self.is_current() {
                return;
            }
            // Controller gone: nothing can ever apply this load
            if self.latest.changed().await.is_err() {
                return;
            }
        }
    }
}
