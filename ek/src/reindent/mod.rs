//! Reindentation
//!
//! Rewrites the leading whitespace of every line from the structure of the
//! text and a [`StyleProfile`]. The operation is a pure function of its
//! inputs. Anchors are always columns computed by this pass, never columns
//! read from the input, so the result is a fixed point.
//!
//! Precedence per line: a closing brace is placed at its parent's depth, a
//! preprocessor line by `cpp-macro`, an opening brace at its own announced
//! depth, then case and access labels, then ordinary statements. For
//! `} else {` the closer decides the line's column and the new block anchors
//! at that column.

mod scanner;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::error::EditError;
use crate::style::{BlockCategory, StyleProfile};

pub use scanner::{ScannedLine, Scanner};

static CASE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:case\b(?:[^:]|::)*|default\s*):").expect("valid case label regex"));

static ACCESS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:public|protected|private)(?:\s+(?:slots|Q_SLOTS))?\s*:(?:[^:]|$)").expect("valid access label regex")
});

static CLASS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:template\s*<.*>\s*)?(?:class|struct|union|namespace)\b|^extern\s*"""#)
        .expect("valid class header regex")
});

static DEFUN_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\)[\s\w]*(?:->[\s\w:<>,*&]*)?$").expect("valid defun tail regex"));

const CONTROL_KEYWORDS: &[&str] = &["if", "else", "for", "while", "do", "switch", "try", "catch"];

/// Unbalanced structure found while reindenting
///
/// `partial` holds the text reindented up to the offending line; that line and
/// everything after it are left as they were.
#[derive(Debug, Clone, Error)]
#[error("line {line}: {reason}")]
pub struct Malformed {
    /// 1-based line of the imbalance
    pub line: usize,
    pub reason: String,
    pub partial: String,
}

impl From<Malformed> for EditError {
    fn from(m: Malformed) -> Self {
        EditError::MalformedInput {
            line: m.line,
            reason: m.reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Defun,
    Class,
    Switch,
    Block,
    BraceList,
}

impl FrameKind {
    fn close_category(self) -> BlockCategory {
        match self {
            Self::Defun => BlockCategory::DefunClose,
            Self::Class => BlockCategory::ClassClose,
            Self::BraceList => BlockCategory::BraceListClose,
            Self::Switch | Self::Block => BlockCategory::BlockClose,
        }
    }
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    /// Column of the line holding the opening brace
    anchor: usize,
    /// Column of the most recent case label (switch frames only)
    case_column: Option<usize>,
    /// 1-based line of the opening brace
    line: usize,
}

/// A braceless control header waiting for its body
#[derive(Debug, Clone, Copy)]
struct Header {
    column: usize,
    switch: bool,
}

#[derive(Debug, Default)]
struct Statement {
    text: String,
    start_column: usize,
    parens: i32,
}

impl Statement {
    fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn clear(&mut self) {
        self.text.clear();
        self.parens = 0;
    }
}

fn first_word(text: &str) -> &str {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn is_control_header(text: &str) -> bool {
    CONTROL_KEYWORDS.contains(&first_word(text))
}

struct Indenter<'a> {
    profile: &'a StyleProfile,
    frames: Vec<Frame>,
    statement: Statement,
    header: Option<Header>,
    just_labeled: bool,
}

impl<'a> Indenter<'a> {
    fn new(profile: &'a StyleProfile) -> Self {
        Self {
            profile,
            frames: Vec::new(),
            statement: Statement::default(),
            header: None,
            just_labeled: false,
        }
    }

    fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Column a fresh statement would get in the innermost frame
    fn body_column(&self) -> usize {
        let (category, anchor) = match self.top() {
            None => (BlockCategory::TopmostIntro, 0),
            Some(frame) => match frame.kind {
                FrameKind::Defun => (BlockCategory::DefunBlockIntro, frame.anchor),
                FrameKind::Class => (BlockCategory::InClass, frame.anchor),
                FrameKind::BraceList => (BlockCategory::BraceListIntro, frame.anchor),
                FrameKind::Block => (BlockCategory::StatementBlockIntro, frame.anchor),
                FrameKind::Switch => match frame.case_column {
                    Some(case_column) => (BlockCategory::StatementCaseIntro, case_column),
                    None => (BlockCategory::StatementBlockIntro, frame.anchor),
                },
            },
        };
        self.profile.column(category, anchor)
    }

    /// Column of an ordinary line given the pending statement and header
    fn statement_column(&self) -> usize {
        if !self.statement.is_empty() {
            return self
                .profile
                .column(BlockCategory::StatementCont, self.statement.start_column);
        }
        if let Some(header) = self.header {
            return self.profile.column(BlockCategory::Substatement, header.column);
        }
        self.body_column()
    }

    /// What an opening brace here would open, and what its rule is anchored at
    fn open_kind(&self) -> (FrameKind, BlockCategory, usize) {
        if let Some(header) = self.header {
            let kind = if header.switch { FrameKind::Switch } else { FrameKind::Block };
            return (kind, BlockCategory::SubstatementOpen, header.column);
        }

        let in_brace_list = matches!(self.top(), Some(f) if f.kind == FrameKind::BraceList);

        if !self.statement.is_empty() {
            let text = self.statement.text.trim();
            let start = self.statement.start_column;
            let at_file_or_class = matches!(self.top(), None | Some(Frame { kind: FrameKind::Class, .. }));

            if first_word(text) == "enum" || text.ends_with('=') || in_brace_list {
                return (FrameKind::BraceList, BlockCategory::BraceListOpen, start);
            }
            if is_control_header(text) {
                let kind = if first_word(text) == "switch" { FrameKind::Switch } else { FrameKind::Block };
                return (kind, BlockCategory::SubstatementOpen, start);
            }
            if CLASS_HEADER.is_match(text) {
                return (FrameKind::Class, BlockCategory::ClassOpen, start);
            }
            if at_file_or_class && DEFUN_TAIL.is_match(text) {
                return (FrameKind::Defun, BlockCategory::DefunOpen, start);
            }
            return (FrameKind::Block, BlockCategory::BlockOpen, start);
        }

        if self.just_labeled {
            if let Some(Frame {
                kind: FrameKind::Switch,
                case_column: Some(case_column),
                ..
            }) = self.top()
            {
                return (FrameKind::Block, BlockCategory::StatementCaseOpen, *case_column);
            }
        }
        if in_brace_list {
            return (FrameKind::BraceList, BlockCategory::BraceListOpen, self.body_column());
        }
        (FrameKind::Block, BlockCategory::BlockOpen, self.body_column())
    }

    /// Whether applying `code` would close more blocks than are open
    fn closes_too_many(&self, code: &str) -> bool {
        if code.starts_with('#') {
            return false;
        }
        let mut depth = self.frames.len();
        for c in code.chars() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => return true,
                '}' => depth -= 1,
                _ => {}
            }
        }
        false
    }

    /// Compute the column of a significant line with structural code `code`
    fn line_column(&self, code: &str) -> usize {
        if code.starts_with('}') {
            if let Some(frame) = self.top() {
                return self.profile.column(frame.kind.close_category(), frame.anchor);
            }
        }
        if code.starts_with('#') {
            return self.profile.column(BlockCategory::CppMacro, 0);
        }
        if code.starts_with('{') {
            let (_, category, anchor) = self.open_kind();
            return self.profile.column(category, anchor);
        }
        if let Some(frame) = self.top() {
            if frame.kind == FrameKind::Switch && CASE_LABEL.is_match(code) {
                return self.profile.column(BlockCategory::CaseLabel, frame.anchor);
            }
            if frame.kind == FrameKind::Class && ACCESS_LABEL.is_match(code) {
                return self.profile.column(BlockCategory::AccessLabel, frame.anchor);
            }
        }
        self.statement_column()
    }

    /// Update the nesting state with a line placed at `column`
    fn apply(&mut self, code: &str, column: usize, line_no: usize) {
        if code.starts_with('#') {
            return;
        }

        let mut rest = code;
        let mut labeled = false;
        if let Some(frame) = self.frames.last_mut() {
            if frame.kind == FrameKind::Switch {
                if let Some(m) = CASE_LABEL.find(code) {
                    frame.case_column = Some(column);
                    rest = &code[m.end()..];
                    labeled = true;
                }
            } else if frame.kind == FrameKind::Class {
                if let Some(m) = ACCESS_LABEL.find(code) {
                    // The match may include the first character after the colon
                    let end = code[..m.end()].rfind(':').map(|i| i + 1).unwrap_or(m.end());
                    rest = &code[end..];
                }
            }
        }
        if labeled {
            self.statement.clear();
            self.header = None;
        }

        // A line that does not open a block consumes any pending header
        if !rest.trim_start().starts_with('{') {
            self.header = None;
        }

        let mut at_line_start = true;
        for c in rest.chars() {
            match c {
                '{' => {
                    let (kind, _, _) = self.open_kind();
                    let anchor = if at_line_start || self.statement.is_empty() {
                        column
                    } else {
                        self.statement.start_column
                    };
                    debug!(?kind, anchor, line_no, "Indenter::apply: opening frame");
                    self.frames.push(Frame {
                        kind,
                        anchor,
                        case_column: None,
                        line: line_no,
                    });
                    self.statement.clear();
                    self.header = None;
                    self.just_labeled = false;
                }
                '}' => {
                    self.frames.pop();
                    self.statement.clear();
                    self.header = None;
                }
                ';' if self.statement.parens <= 0 => {
                    self.statement.clear();
                    self.header = None;
                }
                ',' if self.statement.parens <= 0
                    && matches!(self.top(), Some(f) if f.kind == FrameKind::BraceList) =>
                {
                    self.statement.clear();
                }
                c if c.is_whitespace() => {
                    if !self.statement.is_empty() {
                        self.statement.text.push(c);
                    }
                    continue;
                }
                _ => {
                    if self.statement.is_empty() {
                        self.statement.text.clear();
                        self.statement.start_column = column;
                    }
                    match c {
                        '(' => self.statement.parens += 1,
                        ')' => self.statement.parens -= 1,
                        _ => {}
                    }
                    self.statement.text.push(c);
                }
            }
            at_line_start = false;
        }

        // A complete control header without a brace waits for its body
        if !self.statement.is_empty() && self.statement.parens <= 0 && is_control_header(&self.statement.text) {
            self.header = Some(Header {
                column: self.statement.start_column,
                switch: first_word(&self.statement.text) == "switch",
            });
            self.statement.clear();
        }

        self.just_labeled = labeled && rest.trim().is_empty();
    }
}

/// Reindent `text` according to `profile`
///
/// Lines that begin inside a block comment or a continued string literal are
/// left untouched, blank lines are emptied, and everything after the leading
/// whitespace is preserved. On unbalanced braces the reindented prefix is
/// returned inside [`Malformed`].
pub fn reindent(text: &str, profile: &StyleProfile) -> Result<String, Malformed> {
    debug!(len = text.len(), profile = %profile.name(), "reindent: called");
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut scanner = Scanner::new();
    let mut indenter = Indenter::new(profile);

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let scanned = scanner.scan(line);
        let content = line.trim_start_matches([' ', '\t']);
        let code = scanned.code.trim();

        if indenter.closes_too_many(code) {
            debug!(line_no, "reindent: unmatched closing brace");
            out.extend(lines[idx..].iter().map(|l| l.to_string()));
            return Err(Malformed {
                line: line_no,
                reason: "unmatched '}'".to_string(),
                partial: out.join("\n"),
            });
        }

        if scanned.starts_in_literal {
            let measured = line.len() - content.len();
            indenter.apply(code, measured, line_no);
            out.push(line.to_string());
            continue;
        }

        if content.trim().is_empty() {
            out.push(if line.ends_with('\r') { "\r".to_string() } else { String::new() });
            continue;
        }

        if code.is_empty() {
            // Comment-only line: placed like a statement, no structural effect
            let column = indenter.statement_column();
            out.push(format!("{}{}", profile.indent_string(column), content));
            continue;
        }

        let column = indenter.line_column(code);
        out.push(format!("{}{}", profile.indent_string(column), content));
        indenter.apply(code, column, line_no);
    }

    let result = out.join("\n");
    if let Some(frame) = indenter.frames.first() {
        debug!(line = frame.line, "reindent: unclosed block at end of input");
        return Err(Malformed {
            line: frame.line,
            reason: "unclosed '{'".to_string(),
            partial: result,
        });
    }

    Ok(result)
}
