//! Encoding of a [`QueryDescription`] into a bracketed querystring.

pub(crate) mod encode;

use encode::encode as encode_component;

use crate::config::Config;
use crate::description::QueryDescription;
use crate::filter::{Filter, FilterGroup, dedup_filters};
use crate::optional::OptionalParams;
use crate::sort::{SortRule, dedup_sort};
use crate::value::{Map, Value, encode_scalar};

/// Encodes a description into a querystring using the default [`Config`].
///
/// ```
/// use query_qs::{QueryDescription, SortRule};
///
/// let query = QueryDescription {
///     includes: vec!["author".to_owned()],
///     sort: vec![SortRule::asc("name")],
///     limit: Some(20),
///     ..Default::default()
/// };
/// assert_eq!(
///     query_qs::to_string(&query),
///     "includes[]=author&sort[0][key]=name&sort[0][direction]=ASC&limit=20"
/// );
/// ```
pub fn to_string(query: &QueryDescription) -> String {
    Config::default().encode_string(query)
}

/// Encodes a description into its ordered `key=value` segments.
///
/// Segments come in a fixed order: includes, sort, filter groups,
/// pagination, then optional parameters.
pub fn to_segments(query: &QueryDescription, config: &Config) -> Vec<String> {
    let mut encoder = SegmentEncoder::new(config);
    encoder.includes(&query.includes);
    encoder.sort(&dedup_sort(query.sort.iter().cloned()));
    encoder.filter_groups(&query.filter_groups);
    encoder.pagination(query);
    encoder.optional(&query.optional);
    tracing::debug!(segments = encoder.segments.len(), "encoded query description");
    encoder.segments
}

pub(crate) fn encode(query: &QueryDescription, config: &Config) -> String {
    to_segments(query, config).join("&")
}

/// Builds querystring segments.
///
/// The encoder keeps a stack of key segments to build bracketed paths. For
/// example, encoding a filter value pushes `filter_groups`, `0`, `filters`,
/// `1` and `value`, producing `filter_groups[0][filters][1][value]=...`.
struct SegmentEncoder<'a> {
    segments: Vec<String>,
    key: Vec<String>,
    config: &'a Config,
}

impl<'a> SegmentEncoder<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            segments: Vec::new(),
            key: Vec::with_capacity(6),
            config,
        }
    }

    /// Pushes a new key segment onto the key stack.
    ///
    /// The first segment is written bare, later ones are wrapped in brackets:
    /// `user`, then `user[name]`, then `user[name][first]`.
    fn push_key(&mut self, newkey: &str) {
        let encoded = if newkey
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
        {
            // nothing to escape in the common case
            newkey.to_owned()
        } else {
            encode_component(newkey, self.config.use_form_encoding).into_owned()
        };
        if self.key.is_empty() {
            self.key.push(encoded);
        } else {
            self.key.push(format!("[{encoded}]"));
        }
    }

    fn push_index(&mut self, index: usize) {
        let mut buffer = itoa::Buffer::new();
        self.push_key(buffer.format(index));
    }

    fn pop_key(&mut self) {
        self.key.pop();
    }

    fn with_key(&mut self, newkey: &str, f: impl FnOnce(&mut Self)) {
        self.push_key(newkey);
        f(self);
        self.pop_key();
    }

    fn with_index(&mut self, index: usize, f: impl FnOnce(&mut Self)) {
        self.push_index(index);
        f(self);
        self.pop_key();
    }

    /// Writes `<key stack>=<value>`; `value` must already be encoded.
    fn write_value(&mut self, value: &str) {
        let mut segment = self.key.concat();
        segment.push('=');
        segment.push_str(value);
        self.segments.push(segment);
    }

    /// Writes `<key stack>[]=<value>`; `value` must already be encoded.
    fn write_element(&mut self, value: &str) {
        let mut segment = self.key.concat();
        segment.push_str("[]=");
        segment.push_str(value);
        self.segments.push(segment);
    }

    fn write_scalar(&mut self, value: &Value) {
        let encoded = encode_scalar(value, self.config.use_form_encoding);
        self.write_value(&encoded);
    }

    fn write_str(&mut self, value: &str) {
        let encoded = encode_component(value, self.config.use_form_encoding);
        self.write_value(&encoded);
    }

    fn includes(&mut self, includes: &[String]) {
        for include in includes {
            let encoded = encode_component(include, self.config.use_form_encoding);
            self.segments.push(format!("includes[]={encoded}"));
        }
    }

    fn sort(&mut self, rules: &[SortRule]) {
        self.with_key("sort", |this| {
            for (i, rule) in rules.iter().enumerate() {
                this.with_index(i, |this| {
                    this.with_key("key", |this| this.write_str(&rule.key));
                    this.with_key("direction", |this| {
                        this.write_value(rule.direction.as_str())
                    });
                });
            }
        });
    }

    fn filter_groups(&mut self, groups: &[FilterGroup]) {
        self.with_key("filter_groups", |this| {
            for (i, group) in groups.iter().enumerate() {
                this.with_index(i, |this| {
                    if group.or {
                        this.with_key("or", |this| this.write_value("true"));
                    }
                    let filters = dedup_filters(group.filters.iter().cloned());
                    this.with_key("filters", |this| {
                        for (j, filter) in filters.iter().enumerate() {
                            this.with_index(j, |this| this.filter(filter));
                        }
                    });
                });
            }
        });
    }

    fn filter(&mut self, filter: &Filter) {
        self.with_key("key", |this| this.write_str(&filter.key));
        self.with_key("operator", |this| this.write_value(filter.operator.code()));
        self.with_key("value", |this| match &filter.value {
            Value::Array(items) => {
                for item in items {
                    let encoded = encode_scalar(item, this.config.use_form_encoding);
                    this.write_element(&encoded);
                }
            }
            scalar => this.write_scalar(scalar),
        });
        self.with_key("not", |this| {
            this.write_value(if filter.not { "true" } else { "false" })
        });
    }

    fn pagination(&mut self, query: &QueryDescription) {
        let aliases = *self.config.key_aliases();
        let fields = [
            (aliases.limit, query.limit),
            (aliases.page, query.page),
            (aliases.offset, query.offset),
            (aliases.per_page, query.per_page),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                let mut buffer = itoa::Buffer::new();
                let formatted = buffer.format(value);
                self.with_key(name, |this| this.write_value(formatted));
            }
        }
    }

    fn optional(&mut self, optional: &OptionalParams) {
        match optional {
            OptionalParams::Absent => {}
            OptionalParams::Single(map) => {
                for (key, value) in map {
                    self.with_key(key, |this| match value {
                        Value::Object(nested) => this.first_level(nested),
                        other => this.nested(other),
                    });
                }
            }
            OptionalParams::Multi(maps) => {
                // empty mappings write nothing, so they take no index
                let maps = maps.iter().filter(|map| !map.is_empty());
                for (i, map) in maps.enumerate() {
                    self.indexed_entries(i, map);
                }
            }
        }
    }

    /// Writes one mapping of the list form at index `i`.
    ///
    /// Object values become `key[i][nested]=...`; any other value is written
    /// as a labelled pair `key[i][key]=key&key[i][value]=...`, which the
    /// decoder collapses back into `{key: value}`.
    fn indexed_entries(&mut self, i: usize, map: &Map) {
        for (key, value) in map {
            self.with_key(key, |this| {
                this.with_index(i, |this| match value {
                    Value::Object(nested) => this.object(nested),
                    other => {
                        this.with_key("key", |this| this.write_str(key));
                        this.with_key("value", |this| this.nested(other));
                    }
                });
            });
        }
    }

    /// Writes the mapping directly below a single-form parameter.
    ///
    /// `key[<n>][...]` is the list form on the wire, so a collection under a
    /// numeric key here has no single-form encoding and is skipped.
    fn first_level(&mut self, map: &Map) {
        for (key, value) in map {
            if is_index(key) && matches!(value, Value::Array(_) | Value::Object(_)) {
                tracing::warn!(
                    key = %self.key.concat(),
                    index = %key,
                    "skipping collection under a numeric key in an optional parameter"
                );
                continue;
            }
            self.with_key(key, |this| this.nested(value));
        }
    }

    fn object(&mut self, map: &Map) {
        for (key, value) in map {
            self.with_key(key, |this| this.nested(value));
        }
    }

    fn nested(&mut self, value: &Value) {
        match value {
            Value::Object(map) => self.object(map),
            Value::Array(items) => {
                for item in items {
                    if matches!(item, Value::Array(_) | Value::Object(_)) {
                        tracing::warn!(
                            key = %self.key.concat(),
                            "skipping nested collection inside an optional array parameter"
                        );
                        continue;
                    }
                    let encoded = encode_scalar(item, self.config.use_form_encoding);
                    self.write_element(&encoded);
                }
            }
            scalar => self.write_scalar(scalar),
        }
    }
}

/// Whether the decoder reads `key` as an array index.
fn is_index(key: &str) -> bool {
    key.bytes().all(|b| b.is_ascii_digit()) && key.parse::<usize>().is_ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::filter::FilterGroup;
    use crate::operator::QueryOperator;
    use crate::sort::SortRule;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn empty_description_is_empty_string() {
        assert_eq!(to_string(&QueryDescription::default()), "");
    }

    #[test]
    fn includes_are_escaped() {
        let query = QueryDescription {
            includes: vec!["author".into(), "first name".into()],
            ..Default::default()
        };
        assert_eq!(to_segments(&query, &Config::default()), [
            "includes[]=author",
            "includes[]=first%20name"
        ]);
    }

    #[test]
    fn sort_is_deduplicated_before_encoding() {
        let query = QueryDescription {
            sort: vec![SortRule::asc("a"), SortRule::desc("b"), SortRule::desc("a")],
            ..Default::default()
        };
        assert_eq!(
            to_string(&query),
            "sort[0][key]=a&sort[0][direction]=DESC&sort[1][key]=b&sort[1][direction]=DESC"
        );
    }

    #[test]
    fn filter_group_segments() {
        let query = QueryDescription {
            filter_groups: vec![
                FilterGroup::any([
                    ("name", QueryOperator::Contains, json!("John Doe")),
                    ("age", QueryOperator::Between, json!([18, 30])),
                ]),
                FilterGroup::all([("deleted", QueryOperator::Equals, json!(null), true)]),
            ],
            ..Default::default()
        };
        assert_eq!(to_segments(&query, &Config::default()), [
            "filter_groups[0][or]=true",
            "filter_groups[0][filters][0][key]=name",
            "filter_groups[0][filters][0][operator]=ct",
            "filter_groups[0][filters][0][value]=John%20Doe",
            "filter_groups[0][filters][0][not]=false",
            "filter_groups[0][filters][1][key]=age",
            "filter_groups[0][filters][1][operator]=bt",
            "filter_groups[0][filters][1][value][]=18",
            "filter_groups[0][filters][1][value][]=30",
            "filter_groups[0][filters][1][not]=false",
            "filter_groups[1][filters][0][key]=deleted",
            "filter_groups[1][filters][0][operator]=eq",
            "filter_groups[1][filters][0][value]=null",
            "filter_groups[1][filters][0][not]=true",
        ]);
    }

    #[test]
    fn pagination_uses_aliases() {
        let query = QueryDescription {
            limit: Some(10),
            page: Some(2),
            offset: Some(20),
            per_page: Some(10),
            ..Default::default()
        };
        assert_eq!(to_string(&query), "limit=10&page=2&offset=20&perPage=10");

        let config = Config::new().aliases(crate::KeyAliases {
            limit: "size",
            page: "p",
            ..crate::KeyAliases::new()
        });
        assert_eq!(config.encode_string(&query), "size=10&p=2&offset=20&perPage=10");
    }

    #[test]
    fn single_optional_mapping() {
        let query = QueryDescription {
            optional: OptionalParams::Single(map(json!({
                "category": "books",
                "tags": ["new", "sale"],
                "price": {"min": 5, "max": 10.5},
                "archived": false,
                "owner": null,
            }))),
            ..Default::default()
        };
        assert_eq!(to_segments(&query, &Config::default()), [
            "category=books",
            "tags[]=new",
            "tags[]=sale",
            "price[min]=5",
            "price[max]=10.5",
            "archived=false",
            "owner=null",
        ]);
    }

    #[test]
    fn multi_optional_mappings() {
        let query = QueryDescription {
            optional: OptionalParams::Multi(vec![
                map(json!({"meta": {"x": 1, "y": "two"}})),
                map(json!({"color": "red"})),
            ]),
            ..Default::default()
        };
        assert_eq!(to_segments(&query, &Config::default()), [
            "meta[0][x]=1",
            "meta[0][y]=two",
            "color[1][key]=color",
            "color[1][value]=red",
        ]);
    }

    #[test]
    fn nested_collections_in_arrays_are_skipped() {
        let query = QueryDescription {
            optional: OptionalParams::Single(map(json!({"ids": [1, [2, 3], {"x": 4}, 5]}))),
            ..Default::default()
        };
        assert_eq!(to_string(&query), "ids[]=1&ids[]=5");
    }

    #[test]
    fn numeric_keys_below_single_parameter() {
        let query = QueryDescription {
            optional: OptionalParams::Single(map(json!({
                "a": {"0": {"b": 1}, "1": [2, 3], "2": "kept", "x": {"0": {"c": 4}}},
            }))),
            ..Default::default()
        };
        let encoded = to_string(&query);
        assert_eq!(encoded, "a[2]=kept&a[x][0][c]=4");

        let decoded = crate::de::decode(&encoded, &Config::default());
        assert_eq!(
            decoded.optional,
            OptionalParams::Single(map(json!({"a": {"2": "kept", "x": {"0": {"c": 4}}}})))
        );
    }

    #[test]
    fn is_index_matches_decoder() {
        assert!(is_index("0"));
        assert!(is_index("12"));
        assert!(!is_index(""));
        assert!(!is_index("1a"));
        assert!(!is_index("99999999999999999999999"));
    }

    #[test]
    fn form_encoding() {
        let query = QueryDescription {
            optional: OptionalParams::Single(map(json!({"q": "hello world"}))),
            ..Default::default()
        };
        let config = Config::new().use_form_encoding(true);
        assert_eq!(config.encode_string(&query), "q=hello+world");
        assert_eq!(to_string(&query), "q=hello%20world");
    }
}
