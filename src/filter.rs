//! Filters, their positional shorthand, and per-group deduplication.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::operator::QueryOperator;
use crate::value::{Value, normalize_value};

/// A single comparison predicate: `key <operator> value`, optionally negated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    #[serde(default)]
    pub operator: QueryOperator,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub not: bool,
}

impl Filter {
    pub fn new(key: impl Into<String>, operator: QueryOperator, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            operator,
            value: normalize_value(value.into()),
            not: false,
        }
    }

    /// Negates this filter.
    pub fn not(mut self) -> Self {
        self.not = true;
        self
    }

    /// The string two filters share exactly when they are duplicates.
    ///
    /// Values compare structurally through their compact JSON form, so they
    /// must already be normalized (see [`normalize_value`]).
    pub fn identity(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.key,
            self.operator.code(),
            self.value,
            self.not
        )
    }
}

/// A filter as supplied by a caller: either the canonical record or the
/// positional `[key, operator, value, not?]` shorthand.
///
/// Both are turned into a [`Filter`] by [`FilterInput::normalize`] before
/// anything stores or compares them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "RawFilterInput")]
pub enum FilterInput {
    Canonical(Filter),
    Shorthand(String, QueryOperator, Value, Option<bool>),
}

impl FilterInput {
    /// The canonical filter, with its value normalized.
    pub fn normalize(self) -> Filter {
        match self {
            FilterInput::Canonical(filter) => Filter {
                value: normalize_value(filter.value),
                ..filter
            },
            FilterInput::Shorthand(key, operator, value, not) => Filter {
                key,
                operator,
                value: normalize_value(value),
                not: not.unwrap_or(false),
            },
        }
    }
}

impl From<Filter> for FilterInput {
    fn from(filter: Filter) -> Self {
        FilterInput::Canonical(filter)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, QueryOperator, V)> for FilterInput {
    fn from((key, operator, value): (K, QueryOperator, V)) -> Self {
        FilterInput::Shorthand(key.into(), operator, value.into(), None)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, QueryOperator, V, bool)> for FilterInput {
    fn from((key, operator, value, not): (K, QueryOperator, V, bool)) -> Self {
        FilterInput::Shorthand(key.into(), operator, value.into(), Some(not))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterInput {
    Negatable(String, QueryOperator, Value, bool),
    Plain(String, QueryOperator, Value),
    Canonical(Filter),
}

impl From<RawFilterInput> for FilterInput {
    fn from(raw: RawFilterInput) -> Self {
        match raw {
            RawFilterInput::Negatable(key, operator, value, not) => {
                FilterInput::Shorthand(key, operator, value, Some(not))
            }
            RawFilterInput::Plain(key, operator, value) => {
                FilterInput::Shorthand(key, operator, value, None)
            }
            RawFilterInput::Canonical(filter) => FilterInput::Canonical(filter),
        }
    }
}

/// Normalizes every input and drops later duplicates, keeping first-seen order.
pub fn dedup_filters<I>(filters: I) -> Vec<Filter>
where
    I: IntoIterator,
    I::Item: Into<FilterInput>,
{
    let mut seen = HashSet::new();
    filters
        .into_iter()
        .map(|f| Into::<FilterInput>::into(f).normalize())
        .filter(|f| seen.insert(f.identity()))
        .collect()
}

/// Filters combined with AND, or with OR when `or` is set.
///
/// A group never holds two filters with the same identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFilterGroup")]
pub struct FilterGroup {
    pub or: bool,
    pub filters: Vec<Filter>,
}

#[derive(Deserialize)]
struct RawFilterGroup {
    #[serde(default)]
    or: bool,
    #[serde(default)]
    filters: Vec<FilterInput>,
}

impl From<RawFilterGroup> for FilterGroup {
    fn from(raw: RawFilterGroup) -> Self {
        FilterGroup::with_or(raw.or, raw.filters)
    }
}

impl FilterGroup {
    /// A group whose filters must all match.
    pub fn all<I>(filters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FilterInput>,
    {
        Self::with_or(false, filters)
    }

    /// A group of which any one filter must match.
    pub fn any<I>(filters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FilterInput>,
    {
        Self::with_or(true, filters)
    }

    pub fn with_or<I>(or: bool, filters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FilterInput>,
    {
        Self {
            or,
            filters: dedup_filters(filters),
        }
    }

    /// Appends filters, skipping any that duplicate a filter already present.
    pub fn extend<I>(&mut self, filters: I)
    where
        I: IntoIterator,
        I::Item: Into<FilterInput>,
    {
        let current = std::mem::take(&mut self.filters);
        self.filters = dedup_filters(
            current
                .into_iter()
                .map(FilterInput::from)
                .chain(filters.into_iter().map(Into::into)),
        );
    }

    /// Replaces this group's filters.
    pub fn set_filters<I>(&mut self, filters: I)
    where
        I: IntoIterator,
        I::Item: Into<FilterInput>,
    {
        self.filters = dedup_filters(filters);
    }

    /// Drops duplicate filters. Running it again changes nothing.
    pub fn dedup(&mut self) {
        let filters = std::mem::take(&mut self.filters);
        self.filters = dedup_filters(filters);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
