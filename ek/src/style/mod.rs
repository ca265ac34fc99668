//! Style profiles
//!
//! A style profile maps every [`BlockCategory`] to an [`OffsetRule`]. Profiles
//! are built once at startup, wrapped in `Arc`, and shared read-only by the
//! template engine and the reindentation operation.

mod builtin;
mod category;
mod rule;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EditError;

pub use builtin::{ALLMAN2, GNU, KNR4, builtin_profiles};
pub use category::BlockCategory;
pub use rule::OffsetRule;

/// Rule used for categories a profile leaves unset
pub const DEFAULT_FALLBACK: OffsetRule = OffsetRule::RelativeToParent(1);

/// Immutable named indentation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleProfile {
    name: String,
    basic_offset: usize,
    use_tabs: bool,
    tab_width: usize,
    offsets: BTreeMap<BlockCategory, OffsetRule>,
    fallback: OffsetRule,
}

impl StyleProfile {
    /// Create an empty profile; every category resolves to the fallback
    pub fn new(name: impl Into<String>, basic_offset: usize) -> Self {
        Self {
            name: name.into(),
            basic_offset,
            use_tabs: false,
            tab_width: 8,
            offsets: BTreeMap::new(),
            fallback: DEFAULT_FALLBACK,
        }
    }

    /// Set the rule for one category
    pub fn with_offset(mut self, category: BlockCategory, rule: OffsetRule) -> Self {
        self.offsets.insert(category, rule);
        self
    }

    /// Render indentation with tabs of the given width
    pub fn with_tabs(mut self, tab_width: usize) -> Self {
        self.use_tabs = true;
        self.tab_width = tab_width.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width of one indentation unit in columns
    pub fn basic_offset(&self) -> usize {
        self.basic_offset
    }

    /// Resolve the rule for a category; never fails
    pub fn rule(&self, category: BlockCategory) -> OffsetRule {
        self.offsets.get(&category).copied().unwrap_or(self.fallback)
    }

    /// Categories with an explicit rule
    pub fn explicit_offsets(&self) -> &BTreeMap<BlockCategory, OffsetRule> {
        &self.offsets
    }

    /// Column for a line of `category` anchored at `anchor`
    pub fn column(&self, category: BlockCategory, anchor: usize) -> usize {
        self.rule(category).apply(anchor, self.basic_offset)
    }

    /// Column of a statement nested `depth` blocks deep
    pub fn body_column(&self, depth: usize) -> usize {
        (0..depth).fold(0, |column, _| self.column(BlockCategory::StatementBlockIntro, column))
    }

    /// Whitespace that reaches `column`
    pub fn indent_string(&self, column: usize) -> String {
        if self.use_tabs {
            let tabs = column / self.tab_width;
            let spaces = column % self.tab_width;
            format!("{}{}", "\t".repeat(tabs), " ".repeat(spaces))
        } else {
            " ".repeat(column)
        }
    }
}

/// User-defined profile as written in the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProfileSpec {
    /// Profile name
    pub name: String,

    /// Profile to inherit unset values from
    pub parent: Option<String>,

    /// Width of one indentation unit
    pub basic_offset: Option<usize>,

    /// Indent with tabs of this width
    pub tab_width: Option<usize>,

    /// Rule for categories left unset (when there is no parent)
    pub fallback: Option<OffsetRule>,

    /// Per-category rules
    pub offsets: BTreeMap<BlockCategory, OffsetRule>,
}

/// All profiles known at startup, keyed by name
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: BTreeMap<String, Arc<StyleProfile>>,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileCatalog {
    /// Catalog holding only the built-in profiles
    pub fn builtin() -> Self {
        debug!("ProfileCatalog::builtin: called");
        let profiles = builtin_profiles()
            .into_iter()
            .map(|p| (p.name().to_string(), Arc::new(p)))
            .collect();
        Self { profiles }
    }

    /// Built-in profiles plus user-defined ones, in order
    ///
    /// A user profile may name any profile defined before it (built-in or user) as its
    /// parent. A user profile with a built-in name replaces the built-in.
    pub fn with_specs(specs: &[ProfileSpec]) -> Result<Self, EditError> {
        debug!(count = specs.len(), "ProfileCatalog::with_specs: called");
        let mut catalog = Self::builtin();
        for spec in specs {
            let profile = catalog.build(spec)?;
            debug!(name = %profile.name(), "ProfileCatalog::with_specs: adding user profile");
            catalog.profiles.insert(profile.name().to_string(), Arc::new(profile));
        }
        Ok(catalog)
    }

    fn build(&self, spec: &ProfileSpec) -> Result<StyleProfile, EditError> {
        if spec.name.trim().is_empty() {
            return Err(EditError::InvalidProfile {
                name: spec.name.clone(),
                reason: "profile name is empty".to_string(),
            });
        }

        let mut profile = match &spec.parent {
            Some(parent) => {
                let base = self.get(parent)?;
                let mut profile = (*base).clone();
                profile.name = spec.name.clone();
                profile
            }
            None => StyleProfile::new(spec.name.clone(), 4),
        };

        if let Some(basic_offset) = spec.basic_offset {
            if basic_offset == 0 {
                return Err(EditError::InvalidProfile {
                    name: spec.name.clone(),
                    reason: "basic-offset must be at least 1".to_string(),
                });
            }
            profile.basic_offset = basic_offset;
        }
        if let Some(tab_width) = spec.tab_width {
            profile = profile.with_tabs(tab_width);
        }
        if let Some(fallback) = spec.fallback {
            profile.fallback = fallback;
        }
        for (category, rule) in &spec.offsets {
            profile.offsets.insert(*category, *rule);
        }
        Ok(profile)
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Result<Arc<StyleProfile>, EditError> {
        self.profiles.get(name).cloned().ok_or_else(|| EditError::UnknownProfile {
            name: name.to_string(),
        })
    }

    /// Profile names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
