//! User template files
//!
//! Every `*.yml` / `*.yaml` file in the templates directory holds one
//! template definition. Files are read in sorted order so a later file wins
//! over an earlier one with the same name.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::element::TemplateDefinition;
use super::registry::TemplateRegistry;
use crate::error::EditError;

fn invalid(path: &Path, reason: impl ToString) -> EditError {
    EditError::InvalidTemplate {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Template files in `dir`, sorted
pub fn template_files(dir: &Path) -> Result<Vec<PathBuf>, EditError> {
    debug!(?dir, "template_files: called");
    let mut files = Vec::new();
    for ext in ["yml", "yaml"] {
        let pattern = dir.join(format!("*.{}", ext));
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern).map_err(|e| invalid(dir, e))?;
        files.extend(paths.filter_map(|p| p.ok()));
    }
    files.sort();
    Ok(files)
}

/// Parse one template file
pub fn load_file(path: &Path) -> Result<TemplateDefinition, EditError> {
    debug!(?path, "load_file: called");
    let content = fs::read_to_string(path).map_err(|e| invalid(path, e))?;
    let definition: TemplateDefinition = serde_yaml::from_str(&content).map_err(|e| invalid(path, e))?;
    if definition.name.trim().is_empty() {
        return Err(invalid(path, "template name is empty"));
    }
    Ok(definition)
}

/// Register every template file found in `dir`
///
/// A missing directory is not an error. Returns the number of templates added.
pub fn load_dir(registry: &mut TemplateRegistry, dir: &Path) -> Result<usize, EditError> {
    debug!(?dir, "load_dir: called");
    if !dir.is_dir() {
        debug!(?dir, "load_dir: directory does not exist, skipping");
        return Ok(0);
    }

    let files = template_files(dir)?;
    for path in &files {
        let definition = load_file(path)?;
        registry.register(definition)?;
    }
    info!(count = files.len(), dir = %dir.display(), "Loaded user templates");
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, content: &str) {
        fs::write(dir.path().join(file), content).unwrap();
    }

    #[test]
    fn test_load_dir_registers_templates() {
        let dir = TempDir::new().unwrap();
        write(&dir, "note.yml", "name: note\nelements:\n  - literal: \"/* NOTE: \"\n  - cursor\n  - literal: \" */\"\n");
        write(&dir, "todo.yaml", "name: todo\nelements:\n  - literal: \"// TODO\"\n");
        write(&dir, "readme.txt", "not a template");

        let mut registry = TemplateRegistry::new();
        let count = load_dir(&mut registry, dir.path()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(registry.names(), vec!["note", "todo"]);
    }

    #[test]
    fn test_user_template_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        write(&dir, "if.yml", "name: if\ndescription: mine\nelements:\n  - literal: \"if\"\n");

        let mut registry = TemplateRegistry::with_builtins().unwrap();
        let before = registry.len();
        load_dir(&mut registry, dir.path()).unwrap();

        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("if").unwrap().description, "mine");
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut registry = TemplateRegistry::new();
        assert_eq!(load_dir(&mut registry, &dir.path().join("missing")).unwrap(), 0);
    }

    #[test]
    fn test_unparseable_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.yml", "name: broken\nelements: [ {unknown: 1} ]\n");

        let mut registry = TemplateRegistry::new();
        let err = load_dir(&mut registry, dir.path()).unwrap_err();
        assert!(matches!(err, EditError::InvalidTemplate { ref path, .. } if path.ends_with("broken.yml")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dangling_reference_in_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "bad.yml", "name: bad\nelements:\n  - ref: x\n");

        let mut registry = TemplateRegistry::new();
        let err = load_dir(&mut registry, dir.path()).unwrap_err();
        assert!(matches!(err, EditError::DanglingReference { .. }));
    }
}
