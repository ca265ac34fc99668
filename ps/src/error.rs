//! Supervisor error types

use thiserror::Error;

/// Errors that can occur while launching or inspecting a supervised process
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to start '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command is empty")]
    EmptyCommand,

    #[error("Unbalanced {quote} quote in command: {command}")]
    UnbalancedQuote { quote: char, command: String },

    #[error("Processes can only be launched from within a Tokio runtime")]
    NoRuntime,

    #[error("Output sink for process {id} has already been released")]
    SinkReleased { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
