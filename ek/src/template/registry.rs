//! Template registry
//!
//! Maps template names to validated definitions. Filled at startup and
//! read-only afterwards; expansion never mutates it.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::builtin::builtin_templates;
use super::element::TemplateDefinition;
use crate::error::EditError;

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Arc<TemplateDefinition>>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in templates
    pub fn with_builtins() -> Result<Self, EditError> {
        debug!("TemplateRegistry::with_builtins: called");
        let mut registry = Self::new();
        for definition in builtin_templates()? {
            registry.register(definition)?;
        }
        info!(count = registry.len(), "Loaded built-in templates");
        Ok(registry)
    }

    /// Validate and add a definition
    ///
    /// A definition with the same name replaces the earlier one. On error the
    /// registry is left unchanged.
    pub fn register(&mut self, definition: TemplateDefinition) -> Result<(), EditError> {
        debug!(name = %definition.name, "TemplateRegistry::register: called");
        definition.validate()?;
        if self.templates.contains_key(&definition.name) {
            debug!(name = %definition.name, "TemplateRegistry::register: replacing existing template");
        }
        self.templates.insert(definition.name.clone(), Arc::new(definition));
        Ok(())
    }

    /// Look up a template by name
    pub fn get(&self, name: &str) -> Result<Arc<TemplateDefinition>, EditError> {
        self.templates.get(name).cloned().ok_or_else(|| EditError::TemplateNotFound {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Definitions in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TemplateDefinition>> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateElement;

    #[test]
    fn test_with_builtins() {
        let registry = TemplateRegistry::with_builtins().unwrap();
        assert!(registry.contains("if"));
        assert!(registry.contains("guard"));
        assert_eq!(registry.names().len(), registry.len());
    }

    #[test]
    fn test_get_unknown() {
        let registry = TemplateRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(EditError::TemplateNotFound { name }) if name == "nope"
        ));
    }

    #[test]
    fn test_dangling_reference_leaves_registry_unchanged() {
        let mut registry = TemplateRegistry::with_builtins().unwrap();
        let before = registry.len();

        let bad = TemplateDefinition::new("bad", vec![TemplateElement::reference("x")]);
        let result = registry.register(bad);

        assert!(matches!(result, Err(EditError::DanglingReference { .. })));
        assert_eq!(registry.len(), before);
        assert!(!registry.contains("bad"));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(TemplateDefinition::new("t", vec![TemplateElement::literal("a")]))
            .unwrap();
        registry
            .register(TemplateDefinition::new("t", vec![TemplateElement::literal("b")]))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("t").unwrap().elements, vec![TemplateElement::literal("b")]);
    }
}
