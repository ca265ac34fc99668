//! Line lexer for reindentation
//!
//! Tracks comment and literal state across lines and reduces each line to the
//! characters that carry structure. Literal contents are dropped (the quotes
//! are kept) and comments are removed, so braces inside them never count.

/// Result of scanning one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// Line began inside a block comment or a continued string literal
    pub starts_in_literal: bool,
    /// Structural code with comments and literal contents removed
    pub code: String,
}

/// Cross-line lexer state
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    block_comment: bool,
    string: Option<char>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the next physical line
    pub fn scan(&mut self, line: &str) -> ScannedLine {
        let starts_in_literal = self.block_comment || self.string.is_some();
        let mut code = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if self.block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.block_comment = false;
                    code.push(' ');
                }
                continue;
            }

            if let Some(quote) = self.string {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    self.string = None;
                    code.push(quote);
                }
                continue;
            }

            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.block_comment = true;
                }
                '\'' if is_digit_separator(&code) => code.push(c),
                '"' | '\'' => {
                    self.string = Some(c);
                    code.push(c);
                }
                _ => code.push(c),
            }
        }

        // Literals only span lines through a trailing backslash
        if self.string.is_some() && !line.trim_end_matches('\r').ends_with('\\') {
            self.string = None;
        }

        ScannedLine { starts_in_literal, code }
    }
}

/// Whether a `'` following `code` sits inside a numeric literal, as in `1'000`
fn is_digit_separator(code: &str) -> bool {
    code.rsplit(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '\''))
        .next()
        .is_some_and(|token| token.starts_with(|c: char| c.is_ascii_digit()))
}
