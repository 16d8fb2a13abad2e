//! Spoken-reply adapter
//!
//! Narrates assistant replies through a platform speech-synthesis engine.
//! Text is sanitized first: pictographic and symbolic glyphs are not
//! meaningfully vocalized, so they are stripped before synthesis. Narration
//! never fails the caller; a missing engine degrades to text-only output
//! with a log entry.

use tracing::{debug, warn};

/// A platform speech-synthesis capability.
///
/// `speak` replaces any utterance still playing: at most one utterance is
/// voiced at a time, most recent wins.
pub trait SpeechSynthesizer: Send {
    /// Check whether the platform provides speech synthesis
    fn is_supported(&self) -> bool;

    /// Voice the given text, interrupting any previous utterance
    fn speak(&mut self, text: &str);
}

/// Fallback synthesizer for platforms without a speech engine.
pub struct NullSynthesizer;

impl NullSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for NullSynthesizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str) {}
}

/// Narrator wrapping a synthesis engine with sanitizing and degradation.
pub struct Narrator {
    engine: Box<dyn SpeechSynthesizer>,
}

impl Narrator {
    pub fn new(engine: Box<dyn SpeechSynthesizer>) -> Self {
        Self { engine }
    }

    /// Narrate a reply. Never returns an error: unsupported synthesis and
    /// empty sanitized text both degrade to a logged no-op.
    pub fn narrate(&mut self, text: &str) {
        let narratable = sanitize_for_narration(text);
        if narratable.is_empty() {
            debug!("Nothing narratable in reply, skipping synthesis");
            return;
        }

        if !self.engine.is_supported() {
            warn!("Speech synthesis unavailable, reply shown as text only");
            return;
        }

        debug!("Narrating: {}", narratable);
        self.engine.speak(&narratable);
    }
}

/// Sanitize text for narration
///
/// Spells out common symbols, collapses whitespace, and drops characters
/// outside plain narratable text (pictographic and symbolic glyphs).
pub fn sanitize_for_narration(text: &str) -> String {
    let mut result = text.to_string();

    // Spell out symbols the synthesizer would otherwise skip or misread
    result = result.replace('&', " and ");
    result = result.replace('%', " percent");
    result = result.replace('@', " at ");
    result = result.replace('$', " dollars ");
    result = result.replace('€', " euros ");
    result = result.replace('£', " pounds ");
    result = result.replace('+', " plus ");
    result = result.replace('=', " equals ");

    // Keep letters, digits, whitespace, and sentence punctuation; everything
    // else (emoji, dingbats, box art) is not vocalizable
    result = result
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:'-\"()".contains(*c))
        .collect();

    // Collapse whitespace left behind by stripped glyphs
    result = result.split_whitespace().collect::<Vec<_>>().join(" ");

    result.trim().to_string()
}
