//! Template elements and definitions

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::error::EditError;

/// One step of a template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawElement")]
pub enum TemplateElement {
    /// Text inserted verbatim
    Literal(String),

    /// Ask the user for a value and bind it; `echo` also inserts it here
    Prompt { label: String, binding: String, echo: bool },

    /// Insert a value bound by an earlier prompt
    Reference(String),

    /// Line break
    Newline,

    /// Line break followed by indentation for the current depth
    IndentMarker,

    /// Final cursor position
    CursorMarker,
}

impl TemplateElement {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Capture-only prompt; the value is inserted wherever it is referenced
    pub fn prompt(label: impl Into<String>, binding: impl Into<String>) -> Self {
        Self::Prompt {
            label: label.into(),
            binding: binding.into(),
            echo: false,
        }
    }

    /// Prompt whose answer is also inserted at this point
    pub fn field(label: impl Into<String>, binding: impl Into<String>) -> Self {
        Self::Prompt {
            label: label.into(),
            binding: binding.into(),
            echo: true,
        }
    }

    pub fn reference(binding: impl Into<String>) -> Self {
        Self::Reference(binding.into())
    }
}

/// Bare marker as written in YAML
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Marker {
    Newline,
    Indent,
    Cursor,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LiteralSpec {
    literal: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptSpec {
    prompt: String,
    bind: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSpec {
    field: String,
    bind: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RefSpec {
    #[serde(rename = "ref")]
    binding: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawElement {
    Marker(Marker),
    Literal(LiteralSpec),
    Prompt(PromptSpec),
    Field(FieldSpec),
    Ref(RefSpec),
}

impl From<RawElement> for TemplateElement {
    fn from(raw: RawElement) -> Self {
        match raw {
            RawElement::Marker(Marker::Newline) => Self::Newline,
            RawElement::Marker(Marker::Indent) => Self::IndentMarker,
            RawElement::Marker(Marker::Cursor) => Self::CursorMarker,
            RawElement::Literal(spec) => Self::Literal(spec.literal),
            RawElement::Prompt(spec) => Self::prompt(spec.prompt, spec.bind),
            RawElement::Field(spec) => Self::field(spec.field, spec.bind),
            RawElement::Ref(spec) => Self::Reference(spec.binding),
        }
    }
}

/// Named, ordered recipe of elements
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub elements: Vec<TemplateElement>,
}

impl TemplateDefinition {
    pub fn new(name: impl Into<String>, elements: Vec<TemplateElement>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            elements,
        }
    }

    /// Check that every reference names a binding made by an earlier prompt
    pub fn validate(&self) -> Result<(), EditError> {
        debug!(name = %self.name, "TemplateDefinition::validate: called");
        let mut bound: HashSet<&str> = HashSet::new();
        for element in &self.elements {
            match element {
                TemplateElement::Prompt { binding, .. } => {
                    bound.insert(binding.as_str());
                }
                TemplateElement::Reference(binding) if !bound.contains(binding.as_str()) => {
                    debug!(%binding, "TemplateDefinition::validate: dangling reference");
                    return Err(EditError::DanglingReference {
                        template: self.name.clone(),
                        binding: binding.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Labels of the prompts in order
    pub fn prompt_labels(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                TemplateElement::Prompt { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}
