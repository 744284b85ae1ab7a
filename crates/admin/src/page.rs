//! Layout data every admin page needs.

use crate::middleware::Flash;
use crate::models::{CurrentStaff, FlashMessage};

/// Layout context shared by all page templates.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub staff: Option<CurrentStaff>,
    pub messages: Vec<FlashMessage>,
    /// Navigation entry to highlight.
    pub active: &'static str,
}

impl PageContext {
    /// Layout context for a signed-in page, consuming queued flash messages.
    pub async fn new(staff: CurrentStaff, flash: &Flash, active: &'static str) -> Self {
        Self {
            staff: Some(staff),
            messages: flash.take().await,
            active,
        }
    }
}
