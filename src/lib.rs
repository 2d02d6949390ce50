//! Query descriptions for REST list endpoints, and their querystring and
//! JSON forms.
//!
//! A [`QueryDescription`] says which relations to include, how to sort,
//! which filter groups to apply, how to paginate, and carries any extra
//! parameters the backend understands. It can be written as a PHP-style
//! bracket querystring (the syntax [qs](https://github.com/ljharb/qs) and
//! Laravel read) or as one flat JSON object, and read back from either.
//!
//! Decoding a querystring never fails: malformed pairs are dropped and
//! anything that is not a core parameter ends up in
//! [`QueryDescription::optional`]. Decoding JSON fails only when the input
//! is not a JSON object.
//!
//! ## Usage
//!
//! ```
//! use query_qs::{FilterGroup, QueryBuilder, QueryOperator, SortRule};
//!
//! let mut builder = QueryBuilder::new();
//! builder
//!     .add_includes(["author", "publisher"])
//!     .add_sort(SortRule::asc("name"))
//!     .set_limit(20)
//!     .set_page(1)
//!     .add_optional("category", "books")
//!     .add_optional("status", "active");
//!
//! let qs = builder.to_query_string();
//! assert_eq!(
//!     qs,
//!     "includes[]=author&includes[]=publisher&\
//!      sort[0][key]=name&sort[0][direction]=ASC&\
//!      limit=20&page=1&category=books&status=active"
//! );
//!
//! let parsed = query_qs::from_str(&qs);
//! assert_eq!(parsed, builder.to_object());
//!
//! builder.add_filter_group(FilterGroup::any([
//!     ("name", QueryOperator::Contains, "John"),
//!     ("name", QueryOperator::Contains, "John"),
//! ]));
//! assert_eq!(builder.filter_groups()[0].filters.len(), 1);
//! ```
//!
//! ## Wire format
//!
//! ```text
//! includes[]=author
//! sort[0][key]=name&sort[0][direction]=ASC
//! filter_groups[0][or]=true
//! filter_groups[0][filters][0][key]=age
//! filter_groups[0][filters][0][operator]=gt
//! filter_groups[0][filters][0][value]=18
//! filter_groups[0][filters][0][not]=false
//! limit=20&page=1
//! ```
//!
//! Array filter values are written with `[]` (`...[value][]=a&...[value][]=b`).
//! Pagination keys can be renamed with [`KeyAliases`].

mod builder;
mod config;
mod de;
mod description;
mod error;
mod filter;
pub mod json;
mod operator;
mod optional;
mod ser;
mod sort;
mod value;

#[doc(inline)]
pub use builder::QueryBuilder;
#[doc(inline)]
pub use config::{Config, DEFAULT_LIMIT, DEFAULT_PAGE, KeyAliases};
#[doc(inline)]
pub use de::from_str;
pub use description::QueryDescription;
pub use error::{Error, Result};
pub use filter::{Filter, FilterGroup, FilterInput, dedup_filters};
#[doc(inline)]
pub use json::{from_json, to_json};
pub use operator::QueryOperator;
pub use optional::OptionalParams;
#[doc(inline)]
pub use ser::{to_segments, to_string};
pub use sort::{SortDirection, SortRule, dedup_sort, push_sort};
pub use value::{Map, Value, decode_scalar, encode_scalar, normalize_value};
