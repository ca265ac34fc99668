//! Templates
//!
//! Templates are data: a named list of [`TemplateElement`]s. The
//! [`TemplateRegistry`] holds validated definitions (built-in plus user
//! files) and the [`TemplateEngine`] expands them into a host buffer.

mod builtin;
mod element;
mod engine;
mod loader;
mod registry;

pub use builtin::builtin_templates;
pub use element::{TemplateDefinition, TemplateElement};
pub use engine::{Expansion, TemplateEngine};
pub use loader::{load_dir, load_file, template_files};
pub use registry::TemplateRegistry;
