//! Error types for the editing core

use thiserror::Error;

/// Errors surfaced to the invoking user-facing channel
///
/// None of these should terminate the host.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("Prompt '{label}' aborted while expanding template '{template}'")]
    PromptAborted { template: String, label: String },

    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("Failed to launch '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: procsup::SupervisorError,
    },

    #[error("Template '{template}' references '{binding}' before any prompt binds it")]
    DanglingReference { template: String, binding: String },

    #[error("Unknown style profile: {name}")]
    UnknownProfile { name: String },

    #[error("Invalid style profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("Invalid template file {path}: {reason}")]
    InvalidTemplate { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failed_carries_command() {
        let err = EditError::SpawnFailed {
            command: "nonexistent-binary".to_string(),
            source: procsup::SupervisorError::EmptyCommand,
        };
        assert!(err.to_string().contains("nonexistent-binary"));
    }

    #[test]
    fn test_dangling_reference_message() {
        let err = EditError::DanglingReference {
            template: "guard".to_string(),
            binding: "g".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("guard"));
        assert!(msg.contains("'g'"));
    }
}
