//! Offset rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a category's column is derived from its anchor, in indentation units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OffsetRule {
    /// Absolute column of `n` units
    Fixed(u32),
    /// Anchor column shifted by `k` units (clamped at column 0)
    RelativeToParent(i32),
    /// Anchor column unchanged
    NoIndent,
}

impl OffsetRule {
    /// Resolve the rule to a column
    pub fn apply(&self, anchor: usize, unit: usize) -> usize {
        match self {
            Self::Fixed(n) => *n as usize * unit,
            Self::RelativeToParent(k) => {
                let shift = k.unsigned_abs() as usize * unit;
                if *k >= 0 {
                    anchor + shift
                } else {
                    anchor.saturating_sub(shift)
                }
            }
            Self::NoIndent => anchor,
        }
    }
}

impl FromStr for OffsetRule {
    type Err = String;

    /// Parse `+`, `++`, `-`, `--`, `+N`, `-N`, `0`/`none` or `=N`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "0" | "none" => return Ok(Self::NoIndent),
            "+" => return Ok(Self::RelativeToParent(1)),
            "++" => return Ok(Self::RelativeToParent(2)),
            "-" => return Ok(Self::RelativeToParent(-1)),
            "--" => return Ok(Self::RelativeToParent(-2)),
            _ => {}
        }

        if let Some(n) = s.strip_prefix('=') {
            return n
                .trim()
                .parse::<u32>()
                .map(Self::Fixed)
                .map_err(|_| format!("Invalid fixed offset '{}'", s));
        }

        if s.starts_with('+') || s.starts_with('-') {
            return s
                .parse::<i32>()
                .map(Self::RelativeToParent)
                .map_err(|_| format!("Invalid relative offset '{}'", s));
        }

        Err(format!("Invalid offset rule '{}' (expected +, -, +N, -N, 0 or =N)", s))
    }
}

impl TryFrom<String> for OffsetRule {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OffsetRule> for String {
    fn from(rule: OffsetRule) -> Self {
        rule.to_string()
    }
}

impl fmt::Display for OffsetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "={}", n),
            Self::RelativeToParent(1) => write!(f, "+"),
            Self::RelativeToParent(-1) => write!(f, "-"),
            Self::RelativeToParent(k) if *k >= 0 => write!(f, "+{}", k),
            Self::RelativeToParent(k) => write!(f, "{}", k),
            Self::NoIndent => write!(f, "0"),
        }
    }
}
