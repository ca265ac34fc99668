//! Template expansion
//!
//! Expansion runs in two phases. Rendering walks the elements, asks the
//! prompter for every capture and builds the complete text in memory. Only
//! when rendering succeeds is the text handed to the buffer, in one insert,
//! followed by the cursor placement. A cancelled prompt therefore leaves the
//! buffer untouched.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::element::{TemplateDefinition, TemplateElement};
use super::registry::TemplateRegistry;
use crate::error::EditError;
use crate::host::{Buffer, Prompter};
use crate::style::StyleProfile;

/// Produced text and cursor offset within it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Byte offset into `text`; always `<= text.len()`
    pub cursor: usize,
}

impl Expansion {
    /// 1-based line and column of the cursor within the text
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count() + 1;
        let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
        (line, col)
    }
}

/// State of one expansion
#[derive(Debug, Default)]
struct ExpansionContext {
    output: String,
    bindings: HashMap<String, String>,
    depth: usize,
    cursor: Option<usize>,
}

impl ExpansionContext {
    fn push(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '{' => self.depth += 1,
                '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
        self.output.push_str(text);
    }
}

/// Expands templates from a registry with a style profile
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    registry: Arc<TemplateRegistry>,
    profile: Arc<StyleProfile>,
}

impl TemplateEngine {
    pub fn new(registry: Arc<TemplateRegistry>, profile: Arc<StyleProfile>) -> Self {
        Self { registry, profile }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    /// Expand `name` into `buffer` at its point
    pub fn expand(&self, name: &str, prompter: &mut dyn Prompter, buffer: &mut dyn Buffer) -> Result<Expansion, EditError> {
        debug!(%name, "TemplateEngine::expand: called");
        let definition = self.registry.get(name)?;
        let expansion = self.render(&definition, prompter)?;

        buffer.insert(&expansion.text);
        buffer.set_cursor(expansion.cursor);
        info!(%name, len = expansion.text.len(), cursor = expansion.cursor, "Expanded template");
        Ok(expansion)
    }

    /// Produce the text for `definition` without touching any buffer
    pub fn render(&self, definition: &TemplateDefinition, prompter: &mut dyn Prompter) -> Result<Expansion, EditError> {
        debug!(name = %definition.name, "TemplateEngine::render: called");
        let mut ctx = ExpansionContext::default();

        for element in &definition.elements {
            match element {
                TemplateElement::Literal(text) => ctx.push(text),
                TemplateElement::Prompt { label, binding, echo } => {
                    let Some(answer) = prompter.prompt(label) else {
                        debug!(%label, "TemplateEngine::render: prompt aborted");
                        return Err(EditError::PromptAborted {
                            template: definition.name.clone(),
                            label: label.clone(),
                        });
                    };
                    if *echo {
                        ctx.push(&answer);
                    }
                    ctx.bindings.insert(binding.clone(), answer);
                }
                TemplateElement::Reference(binding) => {
                    let value = ctx.bindings.get(binding).cloned().ok_or_else(|| EditError::DanglingReference {
                        template: definition.name.clone(),
                        binding: binding.clone(),
                    })?;
                    ctx.push(&value);
                }
                TemplateElement::Newline => ctx.push("\n"),
                TemplateElement::IndentMarker => {
                    let column = self.profile.body_column(ctx.depth);
                    ctx.output.push('\n');
                    ctx.output.push_str(&self.profile.indent_string(column));
                }
                TemplateElement::CursorMarker => {
                    ctx.cursor = Some(ctx.output.len());
                }
            }
        }

        let cursor = ctx.cursor.unwrap_or(ctx.output.len());
        Ok(Expansion {
            text: ctx.output,
            cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TextBuffer;
    use crate::style::{ALLMAN2, KNR4, ProfileCatalog};

    fn engine(profile: &str) -> TemplateEngine {
        let registry = TemplateRegistry::with_builtins().unwrap();
        let profile = ProfileCatalog::builtin().get(profile).unwrap();
        TemplateEngine::new(Arc::new(registry), profile)
    }

    fn answers(values: &[&str]) -> impl FnMut(&str) -> Option<String> {
        let mut values: Vec<String> = values.iter().rev().map(|s| s.to_string()).collect();
        move |_| values.pop()
    }

    #[test]
    fn test_if_template() {
        let engine = engine(ALLMAN2);
        let mut buffer = TextBuffer::new();
        let mut prompter = answers(&["x > 0"]);

        let expansion = engine.expand("if", &mut prompter, &mut buffer).unwrap();

        assert_eq!(expansion.text, "if(x > 0)\n{\n  \n\n}");
        assert_eq!(expansion.cursor, 15);
        assert_eq!(buffer.text(), "if(x > 0)\n{\n  \n\n}");
        assert_eq!(buffer.point(), 15);
        assert_eq!(expansion.cursor_line_col(), (4, 1));
    }

    #[test]
    fn test_abort_inserts_nothing() {
        let engine = engine(ALLMAN2);
        let mut buffer = TextBuffer::from_text("int x;\n");
        let mut prompter = answers(&["int", "f"]);

        let result = engine.expand("func", &mut prompter, &mut buffer);

        assert!(matches!(
            result,
            Err(EditError::PromptAborted { ref label, .. }) if label == "Arguments"
        ));
        assert_eq!(buffer.text(), "int x;\n");
        assert_eq!(buffer.point(), 7);
    }

    #[test]
    fn test_unknown_template() {
        let engine = engine(ALLMAN2);
        let mut buffer = TextBuffer::new();
        let result = engine.expand("nope", &mut answers(&[]), &mut buffer);
        assert!(matches!(result, Err(EditError::TemplateNotFound { .. })));
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_empty_template_inserts_nothing() {
        let engine = engine(ALLMAN2);
        let mut buffer = TextBuffer::from_text("abc").with_point(1);
        let empty = TemplateDefinition::new("empty", Vec::new());

        let expansion = engine.render(&empty, &mut answers(&[])).unwrap();
        buffer.insert(&expansion.text);
        buffer.set_cursor(expansion.cursor);

        assert_eq!(expansion, Expansion { text: String::new(), cursor: 0 });
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.point(), 1);
    }

    #[test]
    fn test_empty_answer_is_captured() {
        let engine = engine(ALLMAN2);
        let expansion = engine
            .render(&engine.registry().get("while").unwrap(), &mut answers(&[""]))
            .unwrap();
        assert_eq!(expansion.text, "while()\n{\n  \n}");
    }

    #[test]
    fn test_cursor_defaults_to_end() {
        let engine = engine(ALLMAN2);
        let expansion = engine
            .render(&engine.registry().get("include").unwrap(), &mut answers(&["stdio.h"]))
            .unwrap();
        assert_eq!(expansion.text, "#include <stdio.h>\n");
        assert_eq!(expansion.cursor, expansion.text.len());
    }

    #[test]
    fn test_indent_follows_depth_and_profile() {
        let engine = engine(KNR4);
        let nested = TemplateDefinition::new(
            "nested",
            vec![
                TemplateElement::literal("{"),
                TemplateElement::literal("{"),
                TemplateElement::IndentMarker,
                TemplateElement::CursorMarker,
                TemplateElement::literal("}"),
                TemplateElement::IndentMarker,
                TemplateElement::literal("}"),
            ],
        );

        let expansion = engine.render(&nested, &mut answers(&[])).unwrap();
        assert_eq!(expansion.text, "{{\n        }\n    }");
        assert_eq!(expansion.cursor, 11);
    }

    #[test]
    fn test_expanding_twice_does_not_change_registry() {
        let engine = engine(ALLMAN2);
        let before = engine.registry().len();

        for _ in 0..2 {
            let mut buffer = TextBuffer::new();
            engine.expand("else", &mut answers(&[]), &mut buffer).unwrap();
            assert_eq!(buffer.text(), "else\n{\n  \n}");
        }
        assert_eq!(engine.registry().len(), before);
    }

    #[test]
    fn test_field_echoes_answer() {
        let engine = engine(ALLMAN2);
        let expansion = engine
            .render(
                &engine.registry().get("class").unwrap(),
                &mut answers(&["Widget"]),
            )
            .unwrap();
        assert_eq!(
            expansion.text,
            "class Widget\n{\npublic:\n  Widget();\n  ~Widget();\n  \n};"
        );
        assert_eq!(&expansion.text[expansion.cursor..], "\n};");
    }
}
