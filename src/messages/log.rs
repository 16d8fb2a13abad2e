use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only conversation history.
///
/// Cloning shares the underlying log, so the presentation layer can hold a
/// read handle while the session controller appends. Entries are never
/// reordered or removed; `reset_with` exists solely for session start.
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn append(&self, message: Message) {
        self.messages.write().push(message);
    }

    /// Replace the entire history with a single seed message.
    pub fn reset_with(&self, seed: Message) {
        let mut messages = self.messages.write();
        messages.clear();
        messages.push(seed);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
