//! Session state snapshot and presentation events

use crate::messages::Message;

/// Immutable view of session state for rendering.
///
/// Taken under the controller's locks and safe to hold across frames;
/// later mutations do not show through.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    /// Conversation history, oldest first
    pub messages: Vec<Message>,
    /// At least one assistant request is in flight
    pub pending: bool,
    /// The thinking indicator should be shown
    pub typing_visible: bool,
    /// A speech capture session is active
    pub listening: bool,
}

impl SessionSnapshot {
    /// Check if the session has nothing in flight and no capture active
    pub fn is_idle(&self) -> bool {
        !self.pending && !self.typing_visible && !self.listening
    }
}

/// Notifications for the presentation layer.
///
/// State should be read from [`SessionSnapshot`] rather than reconstructed
/// from events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The message sequence grew (drive scroll-to-latest)
    HistoryChanged,
    /// A status flag changed (trigger repaint)
    StateChanged,
}
