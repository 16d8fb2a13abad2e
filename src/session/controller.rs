//! Conversation session controller
//!
//! Owns the message log, the request lifecycle to the remote assistant, and
//! the coordination of speech capture and narration. All state transitions
//! are applied inside controller methods on the caller's thread; workers
//! only ever talk to the controller through channels, so completions
//! serialize by construction no matter what order they settle in.

use crate::assistant::{AssistantCommand, AssistantEvent};
use crate::messages::{Message, MessageLog, Role};
use crate::session::config::SessionConfig;
use crate::session::state::{SessionEvent, SessionSnapshot};
use crate::speech::{CaptureEvent, Narrator, SpeechRecognizer};
use crate::{Result, SolaceError};
use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// A reply waiting out the smoothing delay before it is revealed.
///
/// Keyed to its turn so teardown or re-initialization can drop it without
/// a stale task ever touching newer state.
#[derive(Debug)]
struct PendingReveal {
    turn_id: Uuid,
    text: String,
    timestamp: Option<chrono::DateTime<Utc>>,
    due: Instant,
}

/// Central controller for one conversation session
pub struct SessionController {
    config: SessionConfig,

    /// Append-only conversation history
    log: MessageLog,

    /// Commands to the assistant pipeline
    assistant_tx: Sender<AssistantCommand>,

    /// Completions from the assistant pipeline
    assistant_rx: Receiver<AssistantEvent>,

    /// Speech capture capability
    recognizer: Box<dyn SpeechRecognizer>,

    /// Events from the capture session
    capture_rx: Receiver<CaptureEvent>,

    /// Spoken-reply output
    narrator: Narrator,

    /// Events to the presentation layer
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,

    /// Turns submitted but not yet settled
    in_flight: HashSet<Uuid>,

    /// Replies waiting out the smoothing delay, in arrival order
    reveals: Vec<PendingReveal>,

    /// A capture session is active
    listening: bool,

    /// start() was issued but the engine has not confirmed yet; treated as
    /// capturing for toggle purposes
    capture_starting: bool,
}

impl SessionController {
    /// Create a new controller wired to an assistant pipeline and speech
    /// adapters
    pub fn new(
        config: SessionConfig,
        assistant_tx: Sender<AssistantCommand>,
        assistant_rx: Receiver<AssistantEvent>,
        recognizer: Box<dyn SpeechRecognizer>,
        capture_rx: Receiver<CaptureEvent>,
        narrator: Narrator,
    ) -> Self {
        let (event_tx, event_rx) = bounded(config.event_capacity);

        Self {
            config,
            log: MessageLog::new(),
            assistant_tx,
            assistant_rx,
            recognizer,
            capture_rx,
            narrator,
            event_tx,
            event_rx,
            in_flight: HashSet::new(),
            reveals: Vec::new(),
            listening: false,
            capture_starting: false,
        }
    }

    /// Get a receiver for presentation events
    pub fn event_receiver(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }

    /// Get a shared read handle to the conversation history
    pub fn message_log(&self) -> MessageLog {
        self.log.clone()
    }

    /// At least one assistant request is in flight
    pub fn pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// The thinking indicator should be shown: a request is in flight, or a
    /// reply is still waiting out its smoothing delay
    pub fn typing_visible(&self) -> bool {
        self.pending() || !self.reveals.is_empty()
    }

    /// A speech capture session is active
    pub fn listening(&self) -> bool {
        self.listening
    }

    /// Take an immutable snapshot of the session state for rendering
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.log.get_all(),
            pending: self.pending(),
            typing_visible: self.typing_visible(),
            listening: self.listening,
        }
    }

    /// Reset the session to a single seeded greeting.
    ///
    /// Called once per session start. No network call; stale completions
    /// from before the reset are ignored because their turn ids are gone.
    pub fn initialize(&mut self) {
        self.in_flight.clear();
        self.reveals.clear();
        self.listening = false;
        self.capture_starting = false;

        self.log
            .reset_with(Message::new(Role::Assistant, self.config.greeting.clone()));

        debug!("Session initialized");
        self.emit(SessionEvent::HistoryChanged);
        self.emit(SessionEvent::StateChanged);
    }

    /// Submit a typed user utterance.
    ///
    /// Empty (after trimming) input is silently ignored. Otherwise the user
    /// turn is appended immediately and the remote request issued; the call
    /// returns without waiting for the reply.
    pub fn submit_user_text(&mut self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Ignoring empty submission");
            return Ok(());
        }

        self.log.append(Message::new(Role::User, trimmed));
        self.emit(SessionEvent::HistoryChanged);

        let turn_id = Uuid::new_v4();
        self.in_flight.insert(turn_id);

        let sent = self.assistant_tx.send(AssistantCommand::Send {
            utterance: trimmed.to_string(),
            turn_id,
        });
        if let Err(e) = sent {
            self.in_flight.remove(&turn_id);
            return Err(SolaceError::ChannelError(format!(
                "Failed to issue assistant request: {}",
                e
            )));
        }

        debug!("Submitted turn {}", turn_id);
        self.emit(SessionEvent::StateChanged);
        Ok(())
    }

    /// Toggle voice input.
    ///
    /// Capturing (or about to)? Stop and finalize. Idle with the capability
    /// absent? Surface `CaptureUnsupported` synchronously. Otherwise start a
    /// capture session; `listening` turns true once the engine confirms.
    pub fn toggle_voice_input(&mut self) -> Result<()> {
        if self.listening || self.capture_starting {
            debug!("Stopping capture session");
            self.recognizer.stop();
            self.capture_starting = false;
            return Ok(());
        }

        if !self.recognizer.is_supported() {
            return Err(SolaceError::CaptureUnsupported);
        }

        self.recognizer.start()?;
        self.capture_starting = true;
        Ok(())
    }

    /// Drain adapter events and apply every due state transition.
    ///
    /// The presentation layer calls this once per frame (or loop tick); it
    /// never blocks.
    pub fn poll(&mut self) {
        let mut state_changed = false;

        // Capture session events
        while let Ok(event) = self.capture_rx.try_recv() {
            state_changed = true;
            match event {
                CaptureEvent::Started => {
                    debug!("Capture started");
                    self.capture_starting = false;
                    self.listening = true;
                }
                CaptureEvent::TranscriptFinal(transcript) => {
                    debug!("Final transcript: \"{}\"", transcript);
                    self.capture_starting = false;
                    self.listening = false;
                    // Same path as typed input: one transcript, one turn
                    if let Err(e) = self.submit_user_text(&transcript) {
                        error!("Failed to submit transcript: {}", e);
                    }
                }
                CaptureEvent::Ended => {
                    debug!("Capture ended without transcript");
                    self.capture_starting = false;
                    self.listening = false;
                }
                CaptureEvent::Error(kind) => {
                    warn!("Speech capture failed: {}", kind);
                    self.capture_starting = false;
                    self.listening = false;
                }
            }
        }

        // Assistant completions
        while let Ok(event) = self.assistant_rx.try_recv() {
            match event {
                AssistantEvent::Reply {
                    turn_id,
                    text,
                    timestamp,
                } => {
                    if self.in_flight.remove(&turn_id) {
                        self.reveals.push(PendingReveal {
                            turn_id,
                            text,
                            timestamp,
                            due: Instant::now() + self.config.smoothing_delay,
                        });
                        state_changed = true;
                    } else {
                        debug!("Ignoring reply for unknown turn {}", turn_id);
                    }
                }
                AssistantEvent::Failed { turn_id, error } => {
                    if self.in_flight.remove(&turn_id) {
                        // Logged, never shown as a fabricated reply; the user
                        // turn stays visible for manual retry
                        error!("Assistant request for turn {} failed: {}", turn_id, error);
                        state_changed = true;
                    } else {
                        debug!("Ignoring failure for unknown turn {}", turn_id);
                    }
                }
                AssistantEvent::Shutdown => {
                    debug!("Assistant pipeline shut down");
                }
            }
        }

        // Reveal replies whose smoothing delay has elapsed, oldest first
        let now = Instant::now();
        let mut history_changed = false;
        while let Some(pos) = self.reveals.iter().position(|r| r.due <= now) {
            let reveal = self.reveals.remove(pos);
            let timestamp = reveal.timestamp.unwrap_or_else(Utc::now);

            debug!("Revealing reply for turn {}", reveal.turn_id);
            self.log.append(Message::with_timestamp(
                Role::Assistant,
                reveal.text.clone(),
                timestamp,
            ));
            self.narrator.narrate(&reveal.text);

            history_changed = true;
            state_changed = true;
        }

        if history_changed {
            self.emit(SessionEvent::HistoryChanged);
        }
        if state_changed {
            self.emit(SessionEvent::StateChanged);
        }
    }

    /// Tear the session down: abort any live capture, drop every pending
    /// reveal, and ask the assistant pipeline to shut down. Completions that
    /// settle afterwards land in dropped channels and are ignored.
    pub fn shutdown(&mut self) {
        if self.listening || self.capture_starting {
            self.recognizer.stop();
            self.listening = false;
            self.capture_starting = false;
        }

        self.reveals.clear();
        self.in_flight.clear();

        let _ = self.assistant_tx.send(AssistantCommand::Shutdown);
        debug!("Session shut down");
    }

    /// Emit a presentation event without ever blocking the session thread;
    /// a full channel drops the event, the next snapshot carries the state
    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.try_send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantEvent;
    use crate::speech::{NullSynthesizer, UnsupportedRecognizer};
    use std::time::Duration;

    /// Controller wired to loose channel ends the test drives directly
    fn test_controller(
        config: SessionConfig,
    ) -> (
        SessionController,
        Receiver<AssistantCommand>,
        Sender<AssistantEvent>,
        Sender<CaptureEvent>,
    ) {
        let (assistant_tx, command_rx) = bounded(16);
        let (reply_tx, assistant_rx) = bounded(16);
        let (capture_tx, capture_rx) = bounded(16);

        let controller = SessionController::new(
            config,
            assistant_tx,
            assistant_rx,
            Box::new(UnsupportedRecognizer::new()),
            capture_rx,
            Narrator::new(Box::new(NullSynthesizer::new())),
        );

        (controller, command_rx, reply_tx, capture_tx)
    }

    fn fast_config() -> SessionConfig {
        SessionConfig::default().with_smoothing_delay(Duration::from_millis(0))
    }

    #[test]
    fn test_initialize_seeds_single_greeting() {
        let (mut controller, _commands, _replies, _capture) = test_controller(fast_config());
        controller.initialize();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert!(snapshot.messages[0].is_from_assistant());
        assert!(!snapshot.pending);
        assert!(!snapshot.typing_visible);
        assert!(!snapshot.listening);
    }

    #[test]
    fn test_empty_submission_is_a_no_op() {
        let (mut controller, commands, _replies, _capture) = test_controller(fast_config());
        controller.initialize();

        controller.submit_user_text("").unwrap();
        controller.submit_user_text("   ").unwrap();
        controller.submit_user_text("\n\t").unwrap();

        assert_eq!(controller.snapshot().messages.len(), 1);
        assert!(!controller.pending());
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn test_submission_appends_and_issues_request() {
        let (mut controller, commands, _replies, _capture) = test_controller(fast_config());
        controller.initialize();

        controller.submit_user_text("  hello there  ").unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].content, "hello there");
        assert!(snapshot.messages[1].is_from_user());
        assert!(snapshot.pending);
        assert!(snapshot.typing_visible);

        match commands.try_recv().unwrap() {
            AssistantCommand::Send { utterance, .. } => assert_eq!(utterance, "hello there"),
            other => panic!("Expected Send command, got {:?}", other),
        }
    }

    #[test]
    fn test_reply_appends_after_poll() {
        let (mut controller, commands, replies, _capture) = test_controller(fast_config());
        controller.initialize();
        controller.submit_user_text("hi").unwrap();

        let turn_id = match commands.try_recv().unwrap() {
            AssistantCommand::Send { turn_id, .. } => turn_id,
            other => panic!("Expected Send command, got {:?}", other),
        };

        replies
            .send(AssistantEvent::Reply {
                turn_id,
                text: "Hi".to_string(),
                timestamp: None,
            })
            .unwrap();
        controller.poll();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 3);
        assert_eq!(snapshot.messages[2].content, "Hi");
        assert!(snapshot.messages[2].is_from_assistant());
        assert!(!snapshot.pending);
        assert!(!snapshot.typing_visible);
    }

    #[test]
    fn test_failure_appends_nothing() {
        let (mut controller, commands, replies, _capture) = test_controller(fast_config());
        controller.initialize();
        controller.submit_user_text("hi").unwrap();

        let turn_id = match commands.try_recv().unwrap() {
            AssistantCommand::Send { turn_id, .. } => turn_id,
            other => panic!("Expected Send command, got {:?}", other),
        };

        replies
            .send(AssistantEvent::Failed {
                turn_id,
                error: "connection refused".to_string(),
            })
            .unwrap();
        controller.poll();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].content, "hi");
        assert!(!snapshot.pending);
        assert!(!snapshot.typing_visible);
    }

    #[test]
    fn test_toggle_without_capability_fails_synchronously() {
        let (mut controller, _commands, _replies, _capture) = test_controller(fast_config());
        controller.initialize();

        let result = controller.toggle_voice_input();
        assert!(matches!(result, Err(SolaceError::CaptureUnsupported)));
        assert!(!controller.listening());
    }

    #[test]
    fn test_stale_reply_after_reinitialize_is_ignored() {
        let (mut controller, commands, replies, _capture) = test_controller(fast_config());
        controller.initialize();
        controller.submit_user_text("hi").unwrap();

        let turn_id = match commands.try_recv().unwrap() {
            AssistantCommand::Send { turn_id, .. } => turn_id,
            other => panic!("Expected Send command, got {:?}", other),
        };

        // Session restarts while the request is in flight
        controller.initialize();

        replies
            .send(AssistantEvent::Reply {
                turn_id,
                text: "too late".to_string(),
                timestamp: None,
            })
            .unwrap();
        controller.poll();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert!(!snapshot.pending);
    }

    #[test]
    fn test_typing_stays_visible_until_reveal_due() {
        let config =
            SessionConfig::default().with_smoothing_delay(Duration::from_millis(200));
        let (mut controller, commands, replies, _capture) = test_controller(config);
        controller.initialize();
        controller.submit_user_text("hi").unwrap();

        let turn_id = match commands.try_recv().unwrap() {
            AssistantCommand::Send { turn_id, .. } => turn_id,
            other => panic!("Expected Send command, got {:?}", other),
        };
        replies
            .send(AssistantEvent::Reply {
                turn_id,
                text: "Hi".to_string(),
                timestamp: None,
            })
            .unwrap();

        // Reply arrived but the smoothing delay has not elapsed
        controller.poll();
        assert!(!controller.pending());
        assert!(controller.typing_visible());
        assert_eq!(controller.snapshot().messages.len(), 2);

        std::thread::sleep(Duration::from_millis(250));
        controller.poll();
        assert!(!controller.typing_visible());
        assert_eq!(controller.snapshot().messages.len(), 3);
    }

    #[test]
    fn test_shutdown_drops_pending_reveals() {
        let config =
            SessionConfig::default().with_smoothing_delay(Duration::from_millis(100));
        let (mut controller, commands, replies, _capture) = test_controller(config);
        controller.initialize();
        controller.submit_user_text("hi").unwrap();

        let turn_id = match commands.try_recv().unwrap() {
            AssistantCommand::Send { turn_id, .. } => turn_id,
            other => panic!("Expected Send command, got {:?}", other),
        };
        replies
            .send(AssistantEvent::Reply {
                turn_id,
                text: "Hi".to_string(),
                timestamp: None,
            })
            .unwrap();
        controller.poll();

        controller.shutdown();
        assert!(matches!(
            commands.try_recv().unwrap(),
            AssistantCommand::Shutdown
        ));

        // The revealed-too-late reply never lands
        std::thread::sleep(Duration::from_millis(150));
        controller.poll();
        assert_eq!(controller.snapshot().messages.len(), 2);
    }

    #[test]
    fn test_capture_error_returns_to_idle() {
        let (mut controller, _commands, _replies, capture) = test_controller(fast_config());
        controller.initialize();

        capture.send(CaptureEvent::Started).unwrap();
        controller.poll();
        assert!(controller.listening());

        capture
            .send(CaptureEvent::Error(crate::speech::CaptureErrorKind::Capture))
            .unwrap();
        controller.poll();
        assert!(!controller.listening());
        // Session stays usable
        assert_eq!(controller.snapshot().messages.len(), 1);
    }

    #[test]
    fn test_transcript_uses_submission_path() {
        let (mut controller, commands, _replies, capture) = test_controller(fast_config());
        controller.initialize();

        capture.send(CaptureEvent::Started).unwrap();
        capture
            .send(CaptureEvent::TranscriptFinal("spoken words".to_string()))
            .unwrap();
        controller.poll();

        assert!(!controller.listening());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].content, "spoken words");
        assert!(snapshot.pending);
        assert!(matches!(
            commands.try_recv().unwrap(),
            AssistantCommand::Send { .. }
        ));
    }

    #[test]
    fn test_empty_transcript_submits_nothing() {
        let (mut controller, commands, _replies, capture) = test_controller(fast_config());
        controller.initialize();

        capture.send(CaptureEvent::Started).unwrap();
        capture.send(CaptureEvent::Ended).unwrap();
        controller.poll();

        assert!(!controller.listening());
        assert_eq!(controller.snapshot().messages.len(), 1);
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn test_history_changed_emitted_on_append() {
        let (mut controller, _commands, _replies, _capture) = test_controller(fast_config());
        let events = controller.event_receiver();

        controller.initialize();
        controller.submit_user_text("hello").unwrap();

        let received: Vec<_> = events.try_iter().collect();
        let history_changes = received
            .iter()
            .filter(|e| **e == SessionEvent::HistoryChanged)
            .count();
        assert_eq!(history_changes, 2); // greeting + user turn
    }
}
