//! Built-in style profiles

use super::{BlockCategory as C, OffsetRule, StyleProfile};

/// Braces on their own line, two-column units, indented case labels
pub const ALLMAN2: &str = "allman2";

/// Four-column units, case labels flush with the switch
pub const KNR4: &str = "knr4";

/// Two-column units, substatement braces indented half way
pub const GNU: &str = "gnu";

const PLUS: OffsetRule = OffsetRule::RelativeToParent(1);
const ZERO: OffsetRule = OffsetRule::NoIndent;
const COLUMN0: OffsetRule = OffsetRule::Fixed(0);

/// Offsets shared by every built-in profile
fn base(name: &str, basic_offset: usize) -> StyleProfile {
    StyleProfile::new(name, basic_offset)
        .with_offset(C::TopmostIntro, COLUMN0)
        .with_offset(C::CppMacro, COLUMN0)
        .with_offset(C::DefunOpen, ZERO)
        .with_offset(C::DefunClose, ZERO)
        .with_offset(C::DefunBlockIntro, PLUS)
        .with_offset(C::ClassOpen, ZERO)
        .with_offset(C::ClassClose, ZERO)
        .with_offset(C::InClass, PLUS)
        .with_offset(C::AccessLabel, ZERO)
        .with_offset(C::BlockOpen, ZERO)
        .with_offset(C::BlockClose, ZERO)
        .with_offset(C::StatementBlockIntro, PLUS)
        .with_offset(C::Substatement, PLUS)
        .with_offset(C::StatementCont, PLUS)
        .with_offset(C::BraceListOpen, ZERO)
        .with_offset(C::BraceListIntro, PLUS)
        .with_offset(C::BraceListClose, ZERO)
        .with_offset(C::StatementCaseIntro, PLUS)
}

pub fn allman2() -> StyleProfile {
    base(ALLMAN2, 2)
        .with_offset(C::SubstatementOpen, ZERO)
        .with_offset(C::CaseLabel, PLUS)
        .with_offset(C::StatementCaseOpen, ZERO)
}

pub fn knr4() -> StyleProfile {
    base(KNR4, 4)
        .with_offset(C::SubstatementOpen, ZERO)
        .with_offset(C::CaseLabel, ZERO)
        .with_offset(C::StatementCaseOpen, ZERO)
}

pub fn gnu() -> StyleProfile {
    base(GNU, 2)
        .with_offset(C::SubstatementOpen, PLUS)
        .with_offset(C::BraceListOpen, PLUS)
        .with_offset(C::CaseLabel, ZERO)
        .with_offset(C::StatementCaseOpen, PLUS)
        .with_offset(C::AccessLabel, PLUS)
}

/// All built-in profiles
pub fn builtin_profiles() -> Vec<StyleProfile> {
    vec![allman2(), knr4(), gnu()]
}
