//! Structural block categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a line's structural position, used to pick an offset rule
///
/// Names follow the usual C-family indentation vocabulary and serialize in
/// kebab-case (`statement-block-intro`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockCategory {
    /// Line at file scope
    TopmostIntro,
    /// Brace opening a function body
    DefunOpen,
    /// Brace closing a function body
    DefunClose,
    /// Statement inside a function body
    DefunBlockIntro,
    /// Brace opening a class, struct, union or namespace
    ClassOpen,
    /// Brace closing a class
    ClassClose,
    /// Member inside a class body
    InClass,
    /// `public:`/`protected:`/`private:` inside a class
    AccessLabel,
    /// Brace opening a bare block
    BlockOpen,
    /// Brace closing a statement block
    BlockClose,
    /// Statement inside a block
    StatementBlockIntro,
    /// Brace on its own line after `if`/`for`/`while`/`switch`/...
    SubstatementOpen,
    /// Unbraced body of a control statement
    Substatement,
    /// Continuation line of an unterminated statement
    StatementCont,
    /// Brace opening an initializer list or enum
    BraceListOpen,
    /// Entry inside a brace list
    BraceListIntro,
    /// Brace closing a brace list
    BraceListClose,
    /// `case ...:` or `default:` inside a switch
    CaseLabel,
    /// Statement following a case label
    StatementCaseIntro,
    /// Brace opening a block directly after a case label
    StatementCaseOpen,
    /// Preprocessor directive
    CppMacro,
}

impl BlockCategory {
    /// Every category, in declaration order
    pub const ALL: [BlockCategory; 21] = [
        Self::TopmostIntro,
        Self::DefunOpen,
        Self::DefunClose,
        Self::DefunBlockIntro,
        Self::ClassOpen,
        Self::ClassClose,
        Self::InClass,
        Self::AccessLabel,
        Self::BlockOpen,
        Self::BlockClose,
        Self::StatementBlockIntro,
        Self::SubstatementOpen,
        Self::Substatement,
        Self::StatementCont,
        Self::BraceListOpen,
        Self::BraceListIntro,
        Self::BraceListClose,
        Self::CaseLabel,
        Self::StatementCaseIntro,
        Self::StatementCaseOpen,
        Self::CppMacro,
    ];

    /// Kebab-case name as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            Self::TopmostIntro => "topmost-intro",
            Self::DefunOpen => "defun-open",
            Self::DefunClose => "defun-close",
            Self::DefunBlockIntro => "defun-block-intro",
            Self::ClassOpen => "class-open",
            Self::ClassClose => "class-close",
            Self::InClass => "in-class",
            Self::AccessLabel => "access-label",
            Self::BlockOpen => "block-open",
            Self::BlockClose => "block-close",
            Self::StatementBlockIntro => "statement-block-intro",
            Self::SubstatementOpen => "substatement-open",
            Self::Substatement => "substatement",
            Self::StatementCont => "statement-cont",
            Self::BraceListOpen => "brace-list-open",
            Self::BraceListIntro => "brace-list-intro",
            Self::BraceListClose => "brace-list-close",
            Self::CaseLabel => "case-label",
            Self::StatementCaseIntro => "statement-case-intro",
            Self::StatementCaseOpen => "statement-case-open",
            Self::CppMacro => "cpp-macro",
        }
    }
}

impl fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_all_is_complete_and_unique() {
        let unique: BTreeSet<_> = BlockCategory::ALL.iter().collect();
        assert_eq!(unique.len(), BlockCategory::ALL.len());
    }

    #[test]
    fn test_name_matches_serde() {
        for category in BlockCategory::ALL {
            let yaml = serde_yaml::to_string(&category).unwrap();
            assert_eq!(yaml.trim(), category.name());
        }
    }
}
