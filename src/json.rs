//! The flat JSON form of a [`QueryDescription`].
//!
//! The core fields are written under fixed keys (`includes`, `sort`,
//! `filter_groups`, `limit`, `page`, `offset`, `perPage`) and optional
//! parameters are merged onto the same object:
//!
//! ```
//! use query_qs::{QueryBuilder, SortRule};
//!
//! let mut builder = QueryBuilder::new();
//! builder.add_sort(SortRule::desc("created_at")).add_optional("status", "active");
//! assert_eq!(
//!     builder.to_json(),
//!     r#"{"includes":[],"sort":[{"key":"created_at","direction":"DESC"}],"filter_groups":[],"status":"active"}"#
//! );
//! ```
//!
//! A list of optional mappings is flattened with an `_<index>` suffix on
//! every key, so `[{"a": 1}, {"a": 2}]` is written as `"a_0": 1, "a_1": 2`.
//! Decoding always collects unknown keys into one optional mapping.

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::description::QueryDescription;
use crate::error::{Error, Result};
use crate::filter::{Filter, FilterGroup, dedup_filters};
use crate::optional::OptionalParams;
use crate::sort::{SortRule, dedup_sort};
use crate::value::{Map, Value};

/// Decodes a JSON document using the default [`Config`].
///
/// Fails only when `text` is not JSON or not a JSON object.
pub fn from_json(text: &str) -> Result<QueryDescription> {
    decode(text, &Config::default())
}

/// Encodes a description as a flat JSON document.
pub fn to_json(query: &QueryDescription) -> String {
    to_value(query).to_string()
}

/// Builds the flat JSON object for a description.
pub fn to_value(query: &QueryDescription) -> Value {
    let mut root = Map::new();
    root.insert(
        "includes".to_owned(),
        Value::from(query.includes.clone()),
    );
    root.insert(
        "sort".to_owned(),
        dedup_sort(query.sort.iter().cloned())
            .iter()
            .map(sort_value)
            .collect(),
    );
    root.insert(
        "filter_groups".to_owned(),
        query.filter_groups.iter().map(group_value).collect(),
    );
    let pagination = [
        ("limit", query.limit),
        ("page", query.page),
        ("offset", query.offset),
        ("perPage", query.per_page),
    ];
    for (name, value) in pagination {
        if let Some(value) = value {
            root.insert(name.to_owned(), Value::from(value));
        }
    }

    match &query.optional {
        OptionalParams::Absent => {}
        OptionalParams::Single(map) => {
            for (key, value) in map {
                merge(&mut root, key.clone(), value);
            }
        }
        OptionalParams::Multi(maps) => {
            let maps = maps.iter().filter(|map| !map.is_empty());
            for (i, map) in maps.enumerate() {
                for (key, value) in map {
                    merge(&mut root, format!("{key}_{i}"), value);
                }
            }
        }
    }
    Value::Object(root)
}

fn merge(root: &mut Map, key: String, value: &Value) {
    if root.contains_key(&key) {
        tracing::warn!(%key, "optional parameter shadows a core key; keeping the core value");
        return;
    }
    root.insert(key, value.clone());
}

fn sort_value(rule: &SortRule) -> Value {
    let mut map = Map::new();
    map.insert("key".to_owned(), Value::from(rule.key.as_str()));
    map.insert("direction".to_owned(), Value::from(rule.direction.as_str()));
    Value::Object(map)
}

fn group_value(group: &FilterGroup) -> Value {
    let mut map = Map::new();
    map.insert("or".to_owned(), Value::Bool(group.or));
    map.insert(
        "filters".to_owned(),
        dedup_filters(group.filters.iter().cloned())
            .iter()
            .map(filter_value)
            .collect(),
    );
    Value::Object(map)
}

fn filter_value(filter: &Filter) -> Value {
    let mut map = Map::new();
    map.insert("key".to_owned(), Value::from(filter.key.as_str()));
    map.insert("operator".to_owned(), Value::from(filter.operator.code()));
    map.insert("value".to_owned(), filter.value.clone());
    map.insert("not".to_owned(), Value::Bool(filter.not));
    Value::Object(map)
}

pub(crate) fn decode(text: &str, config: &Config) -> Result<QueryDescription> {
    let value: Value = serde_json::from_str(text)?;
    let map = match value {
        Value::Object(map) => map,
        other => return Err(Error::NotAnObject(kind(&other))),
    };

    let mut query = config.defaults();
    let mut optional = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "includes" => {
                if let Some(includes) = core_field(&key, value) {
                    query.includes = includes;
                }
            }
            "sort" => {
                if let Some(sort) = core_field::<Vec<SortRule>>(&key, value) {
                    query.sort = dedup_sort(sort);
                }
            }
            "filter_groups" => {
                if let Some(groups) = core_field(&key, value) {
                    query.filter_groups = groups;
                }
            }
            "limit" => set_pagination(&mut query.limit, &key, value),
            "page" => set_pagination(&mut query.page, &key, value),
            "offset" => set_pagination(&mut query.offset, &key, value),
            "perPage" => set_pagination(&mut query.per_page, &key, value),
            _ => {
                optional.insert(key, value);
            }
        }
    }
    if !optional.is_empty() {
        query.optional = OptionalParams::Single(optional);
    }
    Ok(query)
}

/// A core key whose value has the wrong shape is dropped, not surfaced.
fn core_field<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(field) => Some(field),
        Err(error) => {
            tracing::warn!(key, %error, "dropping malformed core field");
            None
        }
    }
}

fn set_pagination(slot: &mut Option<u32>, key: &str, value: Value) {
    if value.is_null() {
        return;
    }
    if let Some(n) = core_field::<u32>(key, value) {
        *slot = Some(n);
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
