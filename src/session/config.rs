//! Configuration for the conversation session

use std::time::Duration;

/// Seeded assistant greeting shown before any user interaction
pub const DEFAULT_GREETING: &str =
    "Hello, I'm Solace. I'm here to listen and support you. How are you feeling right now?";

/// How long the thinking indicator stays up after a reply arrives, so fast
/// responses don't flicker
pub const DEFAULT_SMOOTHING_DELAY: Duration = Duration::from_millis(1500);

/// Configuration for a conversation session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Greeting message seeded by `initialize()`
    pub greeting: String,

    /// Minimum delay between a reply arriving and its reveal
    pub smoothing_delay: Duration,

    /// Capacity of the session event channel to the presentation layer
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            smoothing_delay: DEFAULT_SMOOTHING_DELAY,
            event_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Set the seeded greeting
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Set the reveal smoothing delay
    pub fn with_smoothing_delay(mut self, delay: Duration) -> Self {
        self.smoothing_delay = delay;
        self
    }
}
