//! Built-in templates (embedded in binary)

use tracing::debug;

use super::element::TemplateDefinition;
use crate::error::EditError;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("if", include_str!("builtin_templates/if.yml")),
    ("else", include_str!("builtin_templates/else.yml")),
    ("while", include_str!("builtin_templates/while.yml")),
    ("for", include_str!("builtin_templates/for.yml")),
    ("do", include_str!("builtin_templates/do.yml")),
    ("switch", include_str!("builtin_templates/switch.yml")),
    ("class", include_str!("builtin_templates/class.yml")),
    ("main", include_str!("builtin_templates/main.yml")),
    ("include", include_str!("builtin_templates/include.yml")),
    ("guard", include_str!("builtin_templates/guard.yml")),
    ("func", include_str!("builtin_templates/func.yml")),
];

/// Parse the embedded template definitions
pub fn builtin_templates() -> Result<Vec<TemplateDefinition>, EditError> {
    debug!(count = BUILTIN_TEMPLATES.len(), "builtin_templates: called");
    BUILTIN_TEMPLATES
        .iter()
        .map(|(name, content)| {
            serde_yaml::from_str(content).map_err(|e| EditError::InvalidTemplate {
                path: format!("builtin:{}", name),
                reason: e.to_string(),
            })
        })
        .collect()
}
