//! Stepping through the corpus one chapter at a time

mod navigator;

pub use navigator::Navigator;

use crate::reference::Reference;

/// Previous/next candidates at a reference.
///
/// Computed synchronously so navigation controls never lag the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub previous: Option<Reference>,
    pub next: Option<Reference>,
}

impl Availability {
    pub fn can_go_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn can_go_next(&self) -> bool {
        self.next.is_some()
    }
}
