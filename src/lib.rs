pub mod assistant;
pub mod messages;
pub mod session;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SolaceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Speech recognition is not available on this platform")]
    CaptureUnsupported,

    #[error("Speech capture error: {0}")]
    CaptureError(String),

    #[error("Speech synthesis is not available on this platform")]
    SynthesisUnsupported,

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SolaceError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user can always resubmit a failed request
            SolaceError::NetworkError(_) => true,
            // Missing platform capabilities require a different environment
            SolaceError::CaptureUnsupported => false,
            SolaceError::CaptureError(_) => true,
            SolaceError::SynthesisUnsupported => false,
            SolaceError::ChannelError(_) => false,
            SolaceError::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SolaceError::NetworkError(_) => {
                "Could not reach the assistant. Please try again.".to_string()
            }
            SolaceError::CaptureUnsupported => {
                "Voice input is not supported here. Please type your message.".to_string()
            }
            SolaceError::CaptureError(_) => {
                "Voice capture failed. Please try the microphone again.".to_string()
            }
            SolaceError::SynthesisUnsupported => {
                "Spoken replies are not supported here. Responses will be shown as text."
                    .to_string()
            }
            SolaceError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            SolaceError::ConfigError(_) => "Configuration error. Please check settings.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolaceError>;
