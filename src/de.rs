//! Decoding of bracketed querystrings into a [`QueryDescription`].
//!
//! ### An overview of the design
//!
//! Parameters may arrive in any order, e.g. `sort[1][key]=b&sort[0][key]=a`,
//! so decoding happens in two passes.
//!
//! The `parse` module first splits the string into percent-decoded
//! `(key, value)` pairs and each key into its root (the text before the first
//! `[`) and its bracketed segments.
//!
//! The root alone decides which family a pair belongs to. Pairs for the
//! fixed families (`includes`, `sort`, `filter_groups` and the pagination
//! keys) are bucketed by their numeric indices; every other root is an
//! optional parameter. Once all pairs are bucketed, the buckets are read in
//! numeric index order and turned into the typed description.
//!
//! Decoding never fails. A pair that does not fit its family's shape is
//! dropped (and logged at `trace` level), which lets arbitrary extra
//! parameters through but means only strings produced by the encoder are
//! guaranteed to round-trip.

mod parse;

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::config::Config;
use crate::description::QueryDescription;
use crate::filter::{Filter, FilterGroup};
use crate::operator::QueryOperator;
use crate::optional::OptionalParams;
use crate::sort::{SortDirection, SortRule};
use crate::value::{Map, Value, decode_scalar};

use parse::{Key, KeyPath};

/// Decodes a querystring using the default [`Config`].
///
/// ```
/// use query_qs::{QueryOperator, SortDirection};
///
/// let query = query_qs::from_str(
///     "?sort[0][key]=name&sort[0][direction]=desc&\
///      filter_groups[0][filters][0][key]=age&\
///      filter_groups[0][filters][0][operator]=gt&\
///      filter_groups[0][filters][0][value]=18&limit=20",
/// );
/// assert_eq!(query.sort[0].direction, SortDirection::Desc);
/// assert_eq!(query.filter_groups[0].filters[0].operator, QueryOperator::GreaterThan);
/// assert_eq!(query.filter_groups[0].filters[0].value, 18);
/// assert_eq!(query.limit, Some(20));
/// ```
pub fn from_str(input: &str) -> QueryDescription {
    Config::default().decode_str(input)
}

pub(crate) fn decode(input: &str, config: &Config) -> QueryDescription {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut query = config.defaults();
    if input.is_empty() {
        return query;
    }

    let pairs: Vec<_> = parse::pairs(input).collect();
    let mut buckets = Buckets::default();
    for (key, value) in &pairs {
        let Some(path) = parse::parse_key(key) else {
            tracing::trace!(%key, "dropping pair with malformed key");
            continue;
        };
        buckets.insert(path, value, config, &mut query);
    }

    query.includes = buckets.includes.into_iter().map(str::to_owned).collect();
    query.sort = sort_rules(&buckets.sort);
    query.filter_groups = filter_groups(buckets.groups);
    query.optional = optional_params(buckets.optional);

    tracing::debug!(
        pairs = pairs.len(),
        includes = query.includes.len(),
        sort = query.sort.len(),
        filter_groups = query.filter_groups.len(),
        "decoded querystring"
    );
    query
}

#[derive(Default)]
struct SortBucket<'a> {
    key: Option<&'a str>,
    direction: Option<&'a str>,
}

#[derive(Default)]
struct FilterBucket<'a> {
    key: Option<&'a str>,
    operator: Option<&'a str>,
    value: Option<Value>,
    not: bool,
}

#[derive(Default)]
struct GroupBucket<'a> {
    or: bool,
    filters: BTreeMap<usize, FilterBucket<'a>>,
}

/// Pairs grouped by family. `BTreeMap`s keep indices in numeric order,
/// so `10` sorts after `2`.
#[derive(Default)]
struct Buckets<'a> {
    includes: Vec<&'a str>,
    sort: BTreeMap<usize, SortBucket<'a>>,
    groups: BTreeMap<usize, GroupBucket<'a>>,
    optional: IndexMap<&'a str, Vec<(Vec<Key<'a>>, &'a str)>>,
}

impl<'a> Buckets<'a> {
    fn insert(
        &mut self,
        path: KeyPath<'a>,
        value: &'a str,
        config: &Config,
        query: &mut QueryDescription,
    ) {
        let KeyPath { root, segments } = path;
        if !config.is_reserved(root) {
            self.optional.entry(root).or_default().push((segments, value));
            return;
        }

        let aliases = config.key_aliases();
        match (root, segments.as_slice()) {
            ("includes", [Key::Append]) => self.includes.push(value),
            ("sort", [Key::Index(i), Key::Name(field)]) => {
                let bucket = self.sort.entry(*i).or_default();
                match *field {
                    "key" => bucket.key = Some(value),
                    "direction" => bucket.direction = Some(value),
                    _ => tracing::trace!(root, ?segments, "dropping unknown sort field"),
                }
            }
            ("filter_groups", [Key::Index(g), Key::Name("or")]) => {
                self.groups.entry(*g).or_default().or = value == "true";
            }
            ("filter_groups", [Key::Index(g), Key::Name("filters"), Key::Index(f), rest @ ..]) => {
                let bucket = self
                    .groups
                    .entry(*g)
                    .or_default()
                    .filters
                    .entry(*f)
                    .or_default();
                bucket.insert(rest, value);
            }
            (root, []) if root == aliases.limit => set_pagination(&mut query.limit, root, value),
            (root, []) if root == aliases.page => set_pagination(&mut query.page, root, value),
            (root, []) if root == aliases.offset => set_pagination(&mut query.offset, root, value),
            (root, []) if root == aliases.per_page => {
                set_pagination(&mut query.per_page, root, value)
            }
            (root, _) => {
                tracing::trace!(root, ?segments, "dropping reserved key with unexpected shape");
            }
        }
    }
}

impl<'a> FilterBucket<'a> {
    fn insert(&mut self, field: &[Key<'a>], value: &'a str) {
        match field {
            [Key::Name("key")] => self.key = Some(value),
            [Key::Name("operator")] => self.operator = Some(value),
            [Key::Name("not")] => self.not = value == "true",
            [Key::Name("value")] => self.value = Some(decode_scalar(value)),
            [Key::Name("value"), Key::Append | Key::Index(_)] => {
                let element = decode_scalar(value);
                match &mut self.value {
                    Some(Value::Array(items)) => items.push(element),
                    slot => *slot = Some(Value::Array(vec![element])),
                }
            }
            _ => tracing::trace!(?field, "dropping unknown filter field"),
        }
    }

    fn into_filter(self) -> Option<Filter> {
        Some(Filter {
            key: self.key?.to_owned(),
            operator: QueryOperator::from_code(self.operator?),
            value: self.value.unwrap_or(Value::Null),
            not: self.not,
        })
    }
}

/// Non-numeric (or negative) values leave the current value in place.
fn set_pagination(slot: &mut Option<u32>, key: &str, value: &str) {
    match value.trim().parse::<u32>() {
        Ok(n) => *slot = Some(n),
        Err(_) => tracing::trace!(key, value, "ignoring non-numeric pagination value"),
    }
}

/// Probes `sort[0]`, `sort[1]`, ... and stops at the first index missing its
/// key or its direction.
fn sort_rules(buckets: &BTreeMap<usize, SortBucket<'_>>) -> Vec<SortRule> {
    let mut rules: Vec<SortRule> = Vec::new();
    for i in 0.. {
        let Some(SortBucket {
            key: Some(key),
            direction: Some(direction),
        }) = buckets.get(&i)
        else {
            break;
        };
        crate::sort::push_sort(
            &mut rules,
            SortRule::new(*key, SortDirection::parse_lenient(direction)),
        );
    }
    rules
}

fn filter_groups(buckets: BTreeMap<usize, GroupBucket<'_>>) -> Vec<FilterGroup> {
    buckets
        .into_iter()
        .filter_map(|(g, bucket)| {
            let filters = bucket
                .filters
                .into_values()
                .filter_map(FilterBucket::into_filter);
            let group = FilterGroup::with_or(bucket.or, filters);
            if group.is_empty() {
                tracing::trace!(group = g, "dropping filter group without complete filters");
                None
            } else {
                Some(group)
            }
        })
        .collect()
}

/// Assembles optional parameters, one prefix (root) at a time:
///
/// - `prefix=value`: a direct value; any bracketed keys for the same prefix
///   are ignored.
/// - `prefix[<n>][...]=value`: the array-of-objects shape. Entries are
///   merged into one mapping per index `n`, across all prefixes. An entry
///   that is exactly `{key: K, value: V}` collapses to `{K: V}`; anything
///   else becomes `{prefix: {...}}`.
/// - `prefix[a][b]=value` / `prefix[]=value`: a nested object or array.
///
/// If any prefix used the array-of-objects shape the result is the list
/// form, with the remaining parameters appended as one last mapping.
fn optional_params(candidates: IndexMap<&str, Vec<(Vec<Key<'_>>, &str)>>) -> OptionalParams {
    let mut shared = Map::new();
    let mut indexed: BTreeMap<usize, Map> = BTreeMap::new();

    for (prefix, entries) in candidates {
        if let Some((_, value)) = entries.iter().rev().find(|(path, _)| path.is_empty()) {
            shared.insert(prefix.to_owned(), decode_scalar(value));
        } else if entries
            .iter()
            .any(|(path, _)| matches!(path.as_slice(), [Key::Index(_), _, ..]))
        {
            let mut per_index: BTreeMap<usize, Value> = BTreeMap::new();
            for (path, value) in &entries {
                match path.as_slice() {
                    [Key::Index(i), rest @ ..] if !rest.is_empty() => {
                        let slot = per_index.entry(*i).or_insert(Value::Null);
                        insert_path(slot, rest, decode_scalar(value));
                    }
                    _ => tracing::trace!(prefix, ?path, "dropping key mixed into indexed parameter"),
                }
            }
            for (i, entry) in per_index {
                if let Value::Object(entry) = entry {
                    let (key, value) = collapse_entry(prefix, entry);
                    indexed.entry(i).or_default().insert(key, value);
                }
            }
        } else {
            let mut root = Value::Null;
            for (path, value) in &entries {
                insert_path(&mut root, path, decode_scalar(value));
            }
            if !root.is_null() {
                shared.insert(prefix.to_owned(), root);
            }
        }
    }

    if !indexed.is_empty() {
        let mut maps: Vec<Map> = indexed.into_values().collect();
        if !shared.is_empty() {
            maps.push(shared);
        }
        OptionalParams::Multi(maps)
    } else if !shared.is_empty() {
        OptionalParams::Single(shared)
    } else {
        OptionalParams::Absent
    }
}

/// `{key: K, value: V}` becomes `(K, V)`; any other entry stays under `prefix`.
fn collapse_entry(prefix: &str, mut entry: Map) -> (String, Value) {
    if entry.len() == 2 && entry.contains_key("value") {
        if let Some(label) = entry.get("key") {
            let label = match label {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let value = entry.remove("value").unwrap_or(Value::Null);
            return (label, value);
        }
    }
    (prefix.to_owned(), Value::Object(entry))
}

/// Stores `value` at `path` below `slot`, creating objects and arrays on the
/// way. `Null` slots count as unset. Fragments that conflict with what is
/// already there are dropped.
fn insert_path(slot: &mut Value, path: &[Key<'_>], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *slot = value;
        return;
    };

    match first {
        Key::Append => {
            if !rest.is_empty() {
                tracing::trace!(?path, "dropping nested key below an unindexed array");
                return;
            }
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            match slot {
                Value::Array(items) => items.push(value),
                _ => tracing::trace!(?path, "dropping array element for a non-array value"),
            }
        }
        key => {
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            match (slot, key.to_map_key()) {
                (Value::Object(map), Some(name)) => {
                    let child = map.entry(name).or_insert(Value::Null);
                    insert_path(child, rest, value);
                }
                _ => tracing::trace!(?path, "dropping nested key for a non-object value"),
            }
        }
    }
}
