//! Application context
//!
//! Built once at startup from the configuration and passed explicitly to
//! every command. Holds the selected style profile, the template registry and
//! the process supervisor; none of them change afterwards.

use std::sync::Arc;

use procsup::{ProcessHandle, ProcessState, Supervisor};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::EditError;
use crate::host::{Buffer, Prompter};
use crate::reindent::reindent;
use crate::style::{ProfileCatalog, StyleProfile};
use crate::template::{Expansion, TemplateEngine, TemplateRegistry, load_dir};

#[derive(Debug, Clone)]
pub struct EditContext {
    catalog: ProfileCatalog,
    profile: Arc<StyleProfile>,
    engine: TemplateEngine,
    supervisor: Supervisor,
}

impl EditContext {
    /// Build the context from configuration
    pub fn startup(config: &Config) -> Result<Self, EditError> {
        debug!(style = %config.style, "EditContext::startup: called");
        let catalog = ProfileCatalog::with_specs(&config.profiles)?;
        let profile = catalog.get(&config.style)?;

        let mut registry = TemplateRegistry::with_builtins()?;
        if let Some(dir) = config.templates_dir() {
            load_dir(&mut registry, &dir)?;
        }

        let supervisor = Supervisor::new(config.supervisor.clone());
        info!(
            profile = %profile.name(),
            templates = registry.len(),
            sink_dir = %supervisor.sink_dir().display(),
            "Edit context ready"
        );

        Ok(Self {
            catalog,
            engine: TemplateEngine::new(Arc::new(registry), profile.clone()),
            profile,
            supervisor,
        })
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &TemplateRegistry {
        self.engine.registry()
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Expand a template at the buffer's point
    pub fn expand_template(
        &self,
        name: &str,
        prompter: &mut dyn Prompter,
        buffer: &mut dyn Buffer,
    ) -> Result<Expansion, EditError> {
        debug!(%name, "EditContext::expand_template: called");
        self.engine.expand(name, prompter, buffer)
    }

    /// Reindent the whole buffer
    ///
    /// On unbalanced input the partial result is still applied before the
    /// error is returned.
    pub fn reindent_buffer(&self, buffer: &mut dyn Buffer) -> Result<(), EditError> {
        debug!("EditContext::reindent_buffer: called");
        match reindent(buffer.text(), &self.profile) {
            Ok(text) => {
                if text != buffer.text() {
                    buffer.replace_all(&text);
                }
                Ok(())
            }
            Err(malformed) => {
                warn!(line = malformed.line, reason = %malformed.reason, "Reindent stopped on malformed input");
                buffer.replace_all(&malformed.partial);
                Err(malformed.into())
            }
        }
    }

    /// Launch a command under supervision
    ///
    /// The terminal state is logged when the process finishes.
    pub fn launch_process(&self, command: &str) -> Result<ProcessHandle, EditError> {
        self.launch_process_with(command, |handle, state| {
            info!(id = %handle.id(), command = %handle.command(), %state, "Supervised process finished");
        })
    }

    /// Launch a command with a terminal callback
    pub fn launch_process_with<F>(&self, command: &str, callback: F) -> Result<ProcessHandle, EditError>
    where
        F: FnOnce(&ProcessHandle, &ProcessState) + Send + 'static,
    {
        debug!(%command, "EditContext::launch_process_with: called");
        self.supervisor
            .launch_with(command, callback)
            .map_err(|source| EditError::SpawnFailed {
                command: command.to_string(),
                source,
            })
    }
}
