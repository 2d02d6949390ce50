use crate::config::Config;
use crate::description::QueryDescription;
use crate::error::Result;
use crate::filter::{FilterGroup, FilterInput};
use crate::optional::OptionalParams;
use crate::sort::{SortRule, dedup_sort, push_sort};
use crate::value::Value;

/// Fluent construction of a [`QueryDescription`].
///
/// Every mutation keeps the description's invariants: one sort rule per key
/// and no duplicate filters within a group. Cloning a builder copies the
/// whole description; the two builders share nothing.
///
/// ```
/// use query_qs::{FilterGroup, QueryBuilder, QueryOperator, SortRule};
///
/// let mut builder = QueryBuilder::new();
/// builder
///     .add_includes(["author", "publisher"])
///     .add_sort(SortRule::asc("name"))
///     .add_filter_group(FilterGroup::all([("year", QueryOperator::GreaterThan, 2000)]))
///     .set_limit(20)
///     .set_page(1);
///
/// assert_eq!(
///     builder.to_url("https://api.example.com/books"),
///     "https://api.example.com/books?includes[]=author&includes[]=publisher&\
///      sort[0][key]=name&sort[0][direction]=ASC&\
///      filter_groups[0][filters][0][key]=year&filter_groups[0][filters][0][operator]=gt&\
///      filter_groups[0][filters][0][value]=2000&filter_groups[0][filters][0][not]=false&\
///      limit=20&page=1"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuilder {
    config: Config,
    query: QueryDescription,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            query: config.defaults(),
            config,
        }
    }

    /// Builds from a complete description, normalizing it on the way in.
    ///
    /// Pagination fields left as `None` keep the default configuration's values.
    pub fn build(query: QueryDescription) -> Self {
        Self::build_with_config(Config::default(), query)
    }

    pub fn build_with_config(config: Config, query: QueryDescription) -> Self {
        let mut builder = Self::with_config(config);
        builder.replace(query);
        builder
    }

    /// Decodes a querystring into a new builder.
    pub fn from_query_string(input: &str) -> Self {
        let mut builder = Self::new();
        builder.load_query_string(input);
        builder
    }

    /// Decodes a JSON document into a new builder.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut builder = Self::new();
        builder.load_json(text)?;
        Ok(builder)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the current description with one decoded from `input`.
    pub fn load_query_string(&mut self, input: &str) -> &mut Self {
        self.query = self.config.decode_str(input);
        self
    }

    /// Replaces the current description with one decoded from `text`.
    ///
    /// On error the current description is left untouched.
    pub fn load_json(&mut self, text: &str) -> Result<&mut Self> {
        self.query = crate::json::decode(text, &self.config)?;
        Ok(self)
    }

    fn replace(&mut self, query: QueryDescription) {
        let QueryDescription {
            includes,
            sort,
            filter_groups,
            limit,
            page,
            offset,
            per_page,
            optional,
        } = query;
        self.query.includes = includes;
        self.query.sort = dedup_sort(sort);
        self.set_filter_groups(filter_groups);
        self.query.limit = limit.or(self.query.limit);
        self.query.page = page.or(self.query.page);
        self.query.offset = offset;
        self.query.per_page = per_page;
        self.set_optional(optional);
    }

    pub fn add_include(&mut self, include: impl Into<String>) -> &mut Self {
        self.query.includes.push(include.into());
        self
    }

    pub fn add_includes<I>(&mut self, includes: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.query.includes.extend(includes.into_iter().map(Into::into));
        self
    }

    pub fn set_includes<I>(&mut self, includes: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.query.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    pub fn includes(&self) -> &[String] {
        &self.query.includes
    }

    /// Adds a sort rule. A rule for a key that is already sorted on replaces
    /// the existing rule in its position.
    pub fn add_sort(&mut self, rule: SortRule) -> &mut Self {
        push_sort(&mut self.query.sort, rule);
        self
    }

    pub fn set_sort(&mut self, rules: impl IntoIterator<Item = SortRule>) -> &mut Self {
        self.query.sort = dedup_sort(rules);
        self
    }

    pub fn sort(&self) -> &[SortRule] {
        &self.query.sort
    }

    pub fn add_filter_group(&mut self, mut group: FilterGroup) -> &mut Self {
        group.dedup();
        self.query.filter_groups.push(group);
        self
    }

    /// Adds filters to the group at `group_index`, skipping duplicates.
    ///
    /// An index past the last group starts a new AND group.
    pub fn add_filters<I>(&mut self, group_index: usize, filters: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<FilterInput>,
    {
        match self.query.filter_groups.get_mut(group_index) {
            Some(group) => group.extend(filters),
            None => self.query.filter_groups.push(FilterGroup::all(filters)),
        }
        self
    }

    pub fn set_filter_groups(&mut self, groups: impl IntoIterator<Item = FilterGroup>) -> &mut Self {
        self.query.filter_groups = groups
            .into_iter()
            .map(|mut group| {
                group.dedup();
                group
            })
            .collect();
        self
    }

    pub fn filter_groups(&self) -> &[FilterGroup] {
        &self.query.filter_groups
    }

    pub fn set_limit(&mut self, limit: u32) -> &mut Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn limit(&self) -> Option<u32> {
        self.query.limit
    }

    pub fn set_page(&mut self, page: u32) -> &mut Self {
        self.query.page = Some(page);
        self
    }

    pub fn page(&self) -> Option<u32> {
        self.query.page
    }

    pub fn set_offset(&mut self, offset: u32) -> &mut Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn offset(&self) -> Option<u32> {
        self.query.offset
    }

    pub fn set_per_page(&mut self, per_page: u32) -> &mut Self {
        self.query.per_page = Some(per_page);
        self
    }

    pub fn per_page(&self) -> Option<u32> {
        self.query.per_page
    }

    /// Replaces the optional parameters. Empty mappings are dropped.
    pub fn set_optional(&mut self, optional: impl Into<OptionalParams>) -> &mut Self {
        self.query.optional = optional.into();
        self.query.optional.normalize();
        self
    }

    /// Sets one optional parameter; see [`OptionalParams::insert`].
    pub fn add_optional(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.query.optional.insert(key, value);
        self
    }

    pub fn optional(&self) -> &OptionalParams {
        &self.query.optional
    }

    /// Restores the configured defaults.
    pub fn reset(&mut self) -> &mut Self {
        self.query = self.config.defaults();
        self
    }

    /// A normalized copy of the current description.
    pub fn to_object(&self) -> QueryDescription {
        self.query.clone().normalized()
    }

    pub fn into_description(self) -> QueryDescription {
        self.query.normalized()
    }

    pub fn to_query_string(&self) -> String {
        self.config.encode_string(&self.query)
    }

    /// Appends the querystring to `base`, separated by `?` or `&` as needed.
    pub fn to_url(&self, base: &str) -> String {
        join_url(base, &self.to_query_string())
    }

    pub fn to_json(&self) -> String {
        crate::json::to_json(&self.query)
    }
}

fn join_url(base: &str, query: &str) -> String {
    if query.is_empty() {
        return base.to_owned();
    }
    let base = base.trim_end_matches(|c| c == '?' || c == '&');
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}
