//! Speech capture adapter
//!
//! Wraps a platform speech-recognition engine behind a small capability
//! trait with an event contract, so the session controller never touches
//! platform callback registration directly. One capture session produces at
//! most one final transcript.

use crate::{Result, SolaceError};
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::debug;

/// Failure kinds reported by a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// The platform has no speech-recognition capability
    Unsupported,
    /// Hardware, permission, or platform error during capture
    Capture,
    /// Capture was stopped externally before any result
    Aborted,
}

impl std::fmt::Display for CaptureErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureErrorKind::Unsupported => write!(f, "unsupported"),
            CaptureErrorKind::Capture => write!(f, "capture error"),
            CaptureErrorKind::Aborted => write!(f, "aborted"),
        }
    }
}

/// Events emitted by a capture session
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// Capture has started; the microphone is live
    Started,
    /// A final transcript was produced for this session
    TranscriptFinal(String),
    /// Capture ended without producing a transcript
    Ended,
    /// Capture failed; the session is back to idle
    Error(CaptureErrorKind),
}

/// Configuration for speech capture
///
/// Interim results stay disabled: the controller's contract is one
/// transcript, one turn.
#[derive(Clone, Debug)]
pub struct CaptureConfig {
    /// Recognition language locale
    pub locale: String,

    /// Whether partial hypotheses are delivered (always off)
    pub interim_results: bool,

    /// Number of alternative transcripts requested from the engine
    pub max_alternatives: usize,

    /// Capacity of the capture event channel
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
            channel_capacity: 16,
        }
    }
}

impl CaptureConfig {
    /// Set the recognition locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Create the event channel this configuration calls for
    pub fn event_channel(&self) -> (Sender<CaptureEvent>, Receiver<CaptureEvent>) {
        bounded(self.channel_capacity)
    }
}

/// A platform speech-recognition capability.
///
/// Implementations deliver their lifecycle through the [`CaptureEvent`]
/// channel handed to them at construction: `Started` once the microphone is
/// live, then exactly one of `TranscriptFinal`, `Ended`, or `Error`, after
/// which the session is idle again. At most one capture session is live per
/// recognizer.
pub trait SpeechRecognizer: Send {
    /// Check whether the platform provides speech recognition
    fn is_supported(&self) -> bool;

    /// Begin a capture session
    ///
    /// Must only be called while idle; the controller enforces toggle
    /// semantics for start-while-capturing.
    fn start(&mut self) -> Result<()>;

    /// Stop the current capture session, finalizing any transcript
    ///
    /// A no-op while idle.
    fn stop(&mut self);
}

/// Fallback recognizer for platforms without a speech engine.
///
/// The capability probe always fails, so `toggle_voice_input` surfaces
/// `CaptureUnsupported` before a session is ever attempted.
pub struct UnsupportedRecognizer;

impl UnsupportedRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<()> {
        Err(SolaceError::CaptureUnsupported)
    }

    fn stop(&mut self) {
        debug!("stop() on unsupported recognizer ignored");
    }
}
