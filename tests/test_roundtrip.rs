use query_qs::{
    Config, Filter, FilterGroup, Map, OptionalParams, QueryBuilder, QueryDescription,
    QueryOperator, SortRule, Value,
};
use serde_json::json;

/// macro for testing roundtrip encoding and decoding
///
/// Checks both percent-encoding flavours and evaluates to the string
/// produced by the default `Config`, so the caller can snapshot it.
macro_rules! roundtrip_test {
    (
        $data:expr
    ) => {{
        let data: &QueryDescription = &$data;

        for form_encoding in [true, false] {
            let config = Config::new().use_form_encoding(form_encoding);
            let encoded = config.encode_string(data);
            let decoded = config.decode_str(&encoded);

            // check we get the same data back
            pretty_assertions::assert_eq!(&data.clone().normalized(), &decoded);
        }
        query_qs::to_string(data)
    }};
}

fn map(value: Value) -> Map {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[test]
fn empty_description() {
    let encoded = roundtrip_test!(QueryDescription::default());
    insta::assert_snapshot!(encoded, @"");
}

#[test]
fn includes_only() {
    let encoded = roundtrip_test!(QueryDescription {
        includes: vec!["author".into(), "author.books".into(), "publisher".into()],
        ..Default::default()
    });
    insta::assert_snapshot!(
        encoded,
        @"includes[]=author&includes[]=author.books&includes[]=publisher"
    );
}

#[test]
fn multi_rule_sort() {
    let encoded = roundtrip_test!(QueryDescription {
        sort: vec![
            SortRule::asc("name"),
            SortRule::desc("created_at"),
            SortRule::asc("id"),
        ],
        ..Default::default()
    });
    insta::assert_snapshot!(
        encoded,
        @"sort[0][key]=name&sort[0][direction]=ASC&sort[1][key]=created_at&sort[1][direction]=DESC&sort[2][key]=id&sort[2][direction]=ASC"
    );
}

#[test]
fn duplicate_sort_keys_normalize() {
    let encoded = roundtrip_test!(QueryDescription {
        sort: vec![SortRule::asc("name"), SortRule::asc("id"), SortRule::desc("name")],
        ..Default::default()
    });
    insta::assert_snapshot!(
        encoded,
        @"sort[0][key]=name&sort[0][direction]=DESC&sort[1][key]=id&sort[1][direction]=ASC"
    );
}

#[test]
fn filter_groups_with_and_without_or() {
    let encoded = roundtrip_test!(QueryDescription {
        filter_groups: vec![
            FilterGroup::any([
                ("name", QueryOperator::Contains, json!("John Doe")),
                ("email", QueryOperator::EndsWith, json!("@example.com")),
            ]),
            FilterGroup::all([
                Filter::new("age", QueryOperator::Between, json!([18, 65])),
                Filter::new("status", QueryOperator::In, json!(["active", "pending"])),
                Filter::new("deleted_at", QueryOperator::Equals, Value::Null).not(),
                Filter::new("verified", QueryOperator::Equals, true),
                Filter::new("score", QueryOperator::GreaterThanOrEqual, 4.5),
            ]),
        ],
        ..Default::default()
    });
    insta::assert_snapshot!(encoded, @"filter_groups[0][or]=true&filter_groups[0][filters][0][key]=name&filter_groups[0][filters][0][operator]=ct&filter_groups[0][filters][0][value]=John%20Doe&filter_groups[0][filters][0][not]=false&filter_groups[0][filters][1][key]=email&filter_groups[0][filters][1][operator]=ew&filter_groups[0][filters][1][value]=%40example.com&filter_groups[0][filters][1][not]=false&filter_groups[1][filters][0][key]=age&filter_groups[1][filters][0][operator]=bt&filter_groups[1][filters][0][value][]=18&filter_groups[1][filters][0][value][]=65&filter_groups[1][filters][0][not]=false&filter_groups[1][filters][1][key]=status&filter_groups[1][filters][1][operator]=in&filter_groups[1][filters][1][value][]=active&filter_groups[1][filters][1][value][]=pending&filter_groups[1][filters][1][not]=false&filter_groups[1][filters][2][key]=deleted_at&filter_groups[1][filters][2][operator]=eq&filter_groups[1][filters][2][value]=null&filter_groups[1][filters][2][not]=true&filter_groups[1][filters][3][key]=verified&filter_groups[1][filters][3][operator]=eq&filter_groups[1][filters][3][value]=true&filter_groups[1][filters][3][not]=false&filter_groups[1][filters][4][key]=score&filter_groups[1][filters][4][operator]=gte&filter_groups[1][filters][4][value]=4.5&filter_groups[1][filters][4][not]=false");
}

#[test]
fn pagination() {
    let encoded = roundtrip_test!(QueryDescription {
        limit: Some(50),
        page: Some(3),
        offset: Some(100),
        per_page: Some(25),
        ..Default::default()
    });
    insta::assert_snapshot!(encoded, @"limit=50&page=3&offset=100&perPage=25");
}

#[test]
fn scalar_optional() {
    let encoded = roundtrip_test!(QueryDescription {
        optional: OptionalParams::Single(map(json!({
            "q": "hello world & more",
            "archived": false,
            "owner": null,
            "ratio": 0.25,
        }))),
        ..Default::default()
    });
    insta::assert_snapshot!(
        encoded,
        @"q=hello%20world%20%26%20more&archived=false&owner=null&ratio=0.25"
    );
}

#[test]
fn nested_optional_object() {
    let encoded = roundtrip_test!(QueryDescription {
        optional: OptionalParams::Single(map(json!({
            "price": {"min": 5, "max": 10.5},
            "tags": ["new", "sale"],
        }))),
        ..Default::default()
    });
    insta::assert_snapshot!(
        encoded,
        @"price[min]=5&price[max]=10.5&tags[]=new&tags[]=sale"
    );
}

#[test]
fn array_of_optional_objects() {
    let encoded = roundtrip_test!(QueryDescription {
        optional: OptionalParams::Multi(vec![
            map(json!({"meta": {"x": 1, "y": "two"}, "color": "red"})),
            map(json!({"meta": {"x": 2}})),
        ]),
        ..Default::default()
    });
    insta::assert_snapshot!(
        encoded,
        @"meta[0][x]=1&meta[0][y]=two&color[0][key]=color&color[0][value]=red&meta[1][x]=2"
    );
}

#[test]
fn literal_plus_in_values() {
    let encoded = roundtrip_test!(QueryDescription {
        filter_groups: vec![FilterGroup::all([("phone", QueryOperator::StartsWith, "+1 555")])],
        optional: OptionalParams::Single(map(json!({"q": "C++ a+b"}))),
        ..Default::default()
    });
    insta::assert_snapshot!(encoded, @"filter_groups[0][filters][0][key]=phone&filter_groups[0][filters][0][operator]=sw&filter_groups[0][filters][0][value]=%2B1%20555&filter_groups[0][filters][0][not]=false&q=C%2B%2B%20a%2Bb");
}

#[test]
fn integral_float_values() {
    let encoded = roundtrip_test!(QueryDescription {
        filter_groups: vec![FilterGroup::all([
            Filter::new("x", QueryOperator::Equals, 3.0),
            Filter::new("y", QueryOperator::In, json!([1.0, 2.5])),
        ])],
        optional: OptionalParams::Single(map(json!({"ratio": 2.0, "range": {"max": 10.0}}))),
        ..Default::default()
    });
    insta::assert_snapshot!(encoded, @"filter_groups[0][filters][0][key]=x&filter_groups[0][filters][0][operator]=eq&filter_groups[0][filters][0][value]=3&filter_groups[0][filters][0][not]=false&filter_groups[0][filters][1][key]=y&filter_groups[0][filters][1][operator]=in&filter_groups[0][filters][1][value][]=1&filter_groups[0][filters][1][value][]=2.5&filter_groups[0][filters][1][not]=false&ratio=2&range[max]=10");

    let decoded = query_qs::from_str(&encoded);
    assert_eq!(
        decoded.filter_groups[0].filters[0],
        Filter::new("x", QueryOperator::Equals, 3.0)
    );
}

#[test]
fn empty_mappings_in_list_form() {
    let encoded = roundtrip_test!(QueryDescription {
        optional: OptionalParams::Multi(vec![
            Map::new(),
            map(json!({"a": {"x": 1}})),
            Map::new(),
            map(json!({"b": {"y": 2}})),
        ]),
        ..Default::default()
    });
    insta::assert_snapshot!(encoded, @"a[0][x]=1&b[1][y]=2");
}

#[test]
fn everything_at_once() {
    let mut builder = QueryBuilder::new();
    builder
        .add_includes(["author", "publisher"])
        .add_sort(SortRule::asc("name"))
        .add_sort(SortRule::desc("year"))
        .add_filter_group(FilterGroup::all([("year", QueryOperator::GreaterThan, 2000)]))
        .add_filter_group(FilterGroup::any([
            ("genre", QueryOperator::Equals, "sci-fi"),
            ("genre", QueryOperator::Equals, "fantasy"),
        ]))
        .set_limit(20)
        .set_page(2)
        .add_optional("category", "books")
        .add_optional("price", json!({"max": 30}));

    let encoded = roundtrip_test!(builder.to_object());
    assert_eq!(encoded, builder.to_query_string());
}
