//! editkit - editing core for a host editor
//!
//! Three independent paths share one application context:
//!
//! - [`template`]: named templates expanded into a host buffer, with
//!   interactive prompts, structural indentation and cursor placement
//! - [`reindent`]: rewrites the indentation of existing text from a
//!   [`style::StyleProfile`]
//! - process supervision through [`procsup`], wired into
//!   [`context::EditContext`]
//!
//! The host editor is reached only through the [`host::Prompter`] and
//! [`host::Buffer`] traits.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod reindent;
pub mod style;
pub mod template;

pub use config::Config;
pub use context::EditContext;
pub use error::EditError;
pub use host::{Buffer, LinePrompter, Prompter, TextBuffer};
pub use reindent::{Malformed, reindent};
pub use style::{BlockCategory, OffsetRule, ProfileCatalog, ProfileSpec, StyleProfile};
pub use template::{Expansion, TemplateDefinition, TemplateElement, TemplateEngine, TemplateRegistry};
