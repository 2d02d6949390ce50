use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Direction of a [`SortRule`], written as `ASC` or `DESC`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// `asc` in any case is ascending; anything else, including garbage, is descending.
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SortDirection::parse_lenient(&s))
    }
}

/// Orders results by `key`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortRule {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortRule {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Desc)
    }
}

/// Adds `rule` to `rules`, replacing an existing rule for the same key in place.
pub fn push_sort(rules: &mut Vec<SortRule>, rule: SortRule) {
    match rules.iter_mut().find(|existing| existing.key == rule.key) {
        Some(existing) => *existing = rule,
        None => rules.push(rule),
    }
}

/// Keeps one rule per key.
///
/// A key keeps the position of its first occurrence and the direction of its
/// last, so `[a ASC, b DESC, a DESC]` becomes `[a DESC, b DESC]`.
pub fn dedup_sort(rules: impl IntoIterator<Item = SortRule>) -> Vec<SortRule> {
    let mut deduped = Vec::new();
    for rule in rules {
        push_sort(&mut deduped, rule);
    }
    deduped
}
