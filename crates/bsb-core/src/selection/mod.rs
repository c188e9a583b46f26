//! Current selection and content loading

mod controller;
mod load;

pub use controller::SelectionController;
pub use load::{ContentLoad, LoadOutcome};

use crate::navigation::Availability;
use crate::reference::Reference;

/// Point-in-time view of the selection for rendering
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    pub reference: Reference,
    pub loading: bool,
    pub error: Option<String>,
    pub content: Option<String>,
    /// Reference the displayed content belongs to
    pub content_reference: Option<Reference>,
    pub availability: Availability,
}
