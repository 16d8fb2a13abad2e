//! Speech adapters for voice input and spoken replies
//!
//! This module provides:
//! - Speech capture behind the [`SpeechRecognizer`] capability trait
//! - Spoken replies behind the [`SpeechSynthesizer`] capability trait
//!
//! Platform engines may be absent; both sides are probed before use and
//! degrade to text-only operation.

pub mod recognizer;
pub mod synthesizer;

pub use recognizer::{
    CaptureConfig, CaptureErrorKind, CaptureEvent, SpeechRecognizer, UnsupportedRecognizer,
};
pub use synthesizer::{sanitize_for_narration, Narrator, NullSynthesizer, SpeechSynthesizer};
