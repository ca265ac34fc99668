//! Terminal prompter

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use super::Prompter;
use crate::error::EditError;

/// Prompter reading answers with line editing
///
/// Ctrl-C and Ctrl-D cancel the prompt.
pub struct LinePrompter {
    editor: DefaultEditor,
}

impl LinePrompter {
    pub fn new() -> Result<Self, EditError> {
        debug!("LinePrompter::new: called");
        let editor = DefaultEditor::new().map_err(|e| std::io::Error::other(format!("Failed to initialize readline: {}", e)))?;
        Ok(Self { editor })
    }
}

impl Prompter for LinePrompter {
    fn prompt(&mut self, label: &str) -> Option<String> {
        debug!(%label, "LinePrompter::prompt: called");
        match self.editor.readline(&format!("{}: ", label)) {
            Ok(line) => Some(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!(%label, "LinePrompter::prompt: cancelled");
                None
            }
            Err(e) => {
                warn!(%label, error = %e, "Readline error, treating prompt as cancelled");
                None
            }
        }
    }
}
