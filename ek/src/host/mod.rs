//! Seams to the host editor
//!
//! The core never owns the editor. It asks the host for answers through a
//! [`Prompter`] and writes into a [`Buffer`]. [`TextBuffer`] is an in-memory
//! buffer for tests and the CLI; [`LinePrompter`] reads answers from the
//! terminal.

mod terminal;

use tracing::debug;

pub use terminal::LinePrompter;

/// Source of interactive answers
pub trait Prompter {
    /// Ask for a value; `None` means the user cancelled
    fn prompt(&mut self, label: &str) -> Option<String>;
}

impl<F> Prompter for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn prompt(&mut self, label: &str) -> Option<String> {
        self(label)
    }
}

/// Mutable text owned by the host
pub trait Buffer {
    /// Whole buffer contents
    fn text(&self) -> &str;

    /// Insert at the current point and move the point past the insertion
    fn insert(&mut self, text: &str);

    /// Place the cursor `offset` bytes after the start of the last insertion
    fn set_cursor(&mut self, offset: usize);

    /// Replace the whole contents
    fn replace_all(&mut self, text: &str);
}

/// In-memory buffer with a single point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    point: usize,
    last_insert: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `text` with the point at its end
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let point = text.len();
        Self {
            text,
            point,
            last_insert: point,
        }
    }

    /// Move the point, clamped to the buffer and to a character boundary
    pub fn with_point(mut self, point: usize) -> Self {
        self.point = self.clamp(point);
        self.last_insert = self.point;
        self
    }

    /// Current point (byte offset)
    pub fn point(&self) -> usize {
        self.point
    }

    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

impl Buffer for TextBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn insert(&mut self, text: &str) {
        debug!(point = self.point, len = text.len(), "TextBuffer::insert: called");
        self.text.insert_str(self.point, text);
        self.last_insert = self.point;
        self.point += text.len();
    }

    fn set_cursor(&mut self, offset: usize) {
        self.point = self.clamp(self.last_insert + offset);
    }

    fn replace_all(&mut self, text: &str) {
        debug!(len = text.len(), "TextBuffer::replace_all: called");
        self.text = text.to_string();
        self.point = self.clamp(self.point);
        self.last_insert = self.clamp(self.last_insert);
    }
}
