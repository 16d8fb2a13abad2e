//! Conversation session management
//!
//! The session controller owns the message history and all status flags,
//! sequences user/assistant turns across both input modalities, and keeps
//! the presentation layer informed through a small event channel.

pub mod config;
pub mod controller;
pub mod state;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use state::{SessionEvent, SessionSnapshot};
