//! Remote assistant integration
//!
//! `client` speaks the assistant service's JSON wire contract; `pipeline`
//! wraps it in a channel-based worker so the session controller stays
//! non-blocking.

pub mod client;
pub mod pipeline;

pub use client::{AssistantClient, AssistantReply, ClientConfig};
pub use pipeline::{AssistantCommand, AssistantEvent, AssistantPipeline};
