//! Assistant pipeline for managing remote request lifecycles
//!
//! Provides a channel-based interface around [`AssistantClient`]: the
//! session controller sends commands and drains events without ever
//! blocking on the network. Each turn is tracked by id so completions
//! attach to the submission they belong to, whatever order they settle in.

use crate::assistant::client::{AssistantClient, ClientConfig};
use crate::Result;
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Commands that can be sent to the assistant pipeline
#[derive(Debug, Clone)]
pub enum AssistantCommand {
    /// Send one user utterance to the remote assistant
    Send {
        /// The utterance text
        utterance: String,
        /// Unique turn ID for tracking
        turn_id: Uuid,
    },

    /// Shutdown the pipeline
    Shutdown,
}

/// Events emitted by the assistant pipeline
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    /// The assistant answered
    Reply {
        /// Turn this reply belongs to
        turn_id: Uuid,
        /// Reply text
        text: String,
        /// Server-provided timestamp, when present and parseable
        timestamp: Option<DateTime<Utc>>,
    },

    /// The request failed (transport error or non-success status)
    Failed {
        /// Turn this failure belongs to
        turn_id: Uuid,
        /// Error description
        error: String,
    },

    /// Pipeline has shut down
    Shutdown,
}

/// Assistant pipeline with channel-based communication
pub struct AssistantPipeline {
    /// Configuration
    config: ClientConfig,

    /// Command sender
    command_tx: Sender<AssistantCommand>,

    /// Command receiver (for worker)
    command_rx: Receiver<AssistantCommand>,

    /// Event sender (for worker)
    event_tx: Sender<AssistantEvent>,

    /// Event receiver
    event_rx: Receiver<AssistantEvent>,
}

impl AssistantPipeline {
    /// Create a new assistant pipeline
    pub fn new(config: ClientConfig) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<AssistantCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<AssistantEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    ///
    /// The worker owns a tokio runtime and services requests one at a time;
    /// the bounded command channel queues bursts.
    pub fn start_worker(self) -> Result<JoinHandle<()>> {
        let config = self.config.clone();
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        let handle = thread::spawn(move || {
            info!("Assistant pipeline worker starting");

            let runtime = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx.send(AssistantEvent::Shutdown);
                    return;
                }
            };

            let client = match AssistantClient::new(config) {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to initialize assistant client: {}", e);
                    let _ = event_tx.send(AssistantEvent::Shutdown);
                    return;
                }
            };

            info!("Assistant pipeline worker ready");

            loop {
                match command_rx.recv() {
                    Ok(AssistantCommand::Send { utterance, turn_id }) => {
                        debug!("Processing turn {}", turn_id);

                        match runtime.block_on(client.send(&utterance)) {
                            Ok(reply) => {
                                debug!("Turn {} answered ({} chars)", turn_id, reply.text.len());
                                let _ = event_tx.send(AssistantEvent::Reply {
                                    turn_id,
                                    text: reply.text,
                                    timestamp: reply.timestamp,
                                });
                            }
                            Err(e) => {
                                error!("Turn {} failed: {}", turn_id, e);
                                let _ = event_tx.send(AssistantEvent::Failed {
                                    turn_id,
                                    error: e.to_string(),
                                });
                            }
                        }
                    }

                    Ok(AssistantCommand::Shutdown) => {
                        info!("Assistant pipeline worker shutting down");
                        let _ = event_tx.send(AssistantEvent::Shutdown);
                        break;
                    }

                    Err(e) => {
                        error!("Command channel error: {}", e);
                        break;
                    }
                }
            }

            info!("Assistant pipeline worker stopped");
        });

        Ok(handle)
    }
}
