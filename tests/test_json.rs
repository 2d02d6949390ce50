use pretty_assertions::assert_eq;
use query_qs::{
    Error, Filter, FilterGroup, OptionalParams, QueryBuilder, QueryDescription, QueryOperator,
    SortRule,
};
use serde_json::{Value, json};

#[test]
fn json_document_layout() {
    let mut builder = QueryBuilder::new();
    builder
        .add_include("author")
        .add_sort(SortRule::desc("year"))
        .add_filter_group(FilterGroup::any([
            Filter::new("tags", QueryOperator::In, json!(["a", "b"])),
            Filter::new("draft", QueryOperator::Equals, true).not(),
        ]))
        .set_limit(10)
        .set_page(2)
        .add_optional("category", "books");

    let document: Value = serde_json::from_str(&builder.to_json()).unwrap();
    assert_eq!(
        document,
        json!({
            "includes": ["author"],
            "sort": [{"key": "year", "direction": "DESC"}],
            "filter_groups": [{
                "or": true,
                "filters": [
                    {"key": "tags", "operator": "in", "value": ["a", "b"], "not": false},
                    {"key": "draft", "operator": "eq", "value": true, "not": true},
                ],
            }],
            "limit": 10,
            "page": 2,
            "category": "books",
        })
    );
}

#[test]
fn json_keys_keep_insertion_order() {
    let mut builder = QueryBuilder::new();
    builder
        .set_per_page(5)
        .set_offset(10)
        .add_optional("zeta", 1)
        .add_optional("alpha", 2);
    assert_eq!(
        builder.to_json(),
        r#"{"includes":[],"sort":[],"filter_groups":[],"offset":10,"perPage":5,"zeta":1,"alpha":2}"#
    );
}

#[test]
fn json_round_trip() {
    let mut builder = QueryBuilder::new();
    builder
        .add_includes(["author", "publisher"])
        .add_sort(SortRule::asc("name"))
        .add_filter_group(FilterGroup::all([
            ("price", QueryOperator::LessThanOrEqual, json!(19.5)),
            ("title", QueryOperator::Contains, json!("rust")),
        ]))
        .set_limit(20)
        .set_page(1)
        .set_offset(0)
        .set_per_page(20)
        .add_optional("price_range", json!({"min": 5, "max": 30}))
        .add_optional("formats", json!(["paperback", "ebook"]));

    let decoded = QueryBuilder::from_json(&builder.to_json()).unwrap();
    assert_eq!(decoded.to_object(), builder.to_object());
}

#[test]
fn json_accepts_filter_shorthand() {
    let query = query_qs::from_json(
        r#"{
            "filter_groups": [
                {"or": true, "filters": [["name", "ct", "John"], ["name", "ct", "John"], ["age", "lt", 30, true]]}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(
        query.filter_groups,
        [FilterGroup::any([
            Filter::new("name", QueryOperator::Contains, "John"),
            Filter::new("age", QueryOperator::LessThan, 30).not(),
        ])]
    );
}

#[test]
fn json_unknown_keys_become_optional() {
    let query = query_qs::from_json(r#"{"category": "books", "nested": {"a": [1, 2]}}"#).unwrap();
    assert_eq!(
        query.optional,
        OptionalParams::Single(
            serde_json::from_value(json!({"category": "books", "nested": {"a": [1, 2]}})).unwrap()
        )
    );
    assert!(query.includes.is_empty());
}

#[test]
fn json_empty_object_is_empty_description() {
    assert_eq!(query_qs::from_json("{}").unwrap(), QueryDescription::default());
}

#[test]
fn json_rejects_invalid_input() {
    for input in ["", "{", "nope", "{\"a\":}"] {
        let err = query_qs::from_json(input).unwrap_err();
        assert!(matches!(err, Error::InvalidJson(_)), "{input:?} gave {err:?}");
        assert!(err.is_invalid_json());
    }
    for (input, kind) in [("null", "null"), ("[]", "an array"), ("\"x\"", "a string"), ("1", "a number")] {
        let err = query_qs::from_json(input).unwrap_err();
        assert!(matches!(err, Error::NotAnObject(k) if k == kind), "{input:?} gave {err:?}");
        assert!(err.to_string().starts_with("invalid JSON:"));
    }
}

#[test]
fn json_failed_load_leaves_builder_untouched() {
    let mut builder = QueryBuilder::new();
    builder.set_limit(7);
    let before = builder.clone();
    assert!(builder.load_json("[1]").is_err());
    assert_eq!(builder, before);
}
