use crate::description::QueryDescription;

/// Classic page size used by callers that opt into pagination defaults.
pub const DEFAULT_LIMIT: u32 = 15;
/// Classic first page used by callers that opt into pagination defaults.
pub const DEFAULT_PAGE: u32 = 1;

/// Wire names for the pagination parameters.
///
/// Backends disagree on what to call these (`limit` vs `per_page`, ...),
/// so the names used on encode and decode can be swapped out. The same names
/// are reserved and never treated as optional parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyAliases {
    pub limit: &'static str,
    pub page: &'static str,
    pub offset: &'static str,
    pub per_page: &'static str,
}

impl KeyAliases {
    pub const fn new() -> Self {
        Self {
            limit: "limit",
            page: "page",
            offset: "offset",
            per_page: "perPage",
        }
    }
}

impl Default for KeyAliases {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for encoding and decoding behavior.
///
/// ## Pagination defaults
///
/// By default `limit` and `page` are absent until they are set. To start
/// every description (and every `reset`) from fixed values instead, use
/// [`Config::default_pagination`]:
///
/// ```
/// use query_qs::{Config, DEFAULT_LIMIT, DEFAULT_PAGE};
///
/// let config = Config::new().default_pagination(DEFAULT_LIMIT, DEFAULT_PAGE);
/// let query = config.decode_str("");
/// assert_eq!(query.limit, Some(15));
/// assert_eq!(query.page, Some(1));
/// ```
///
/// ## Encoding
///
/// Values are percent-encoded like a URI component (`%20` for a space).
/// Setting `use_form_encoding` switches to the stricter
/// `application/x-www-form-urlencoded` set, writing spaces as `+`.
/// Decoding accepts both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) use_form_encoding: bool,
    pub(crate) default_limit: Option<u32>,
    pub(crate) default_page: Option<u32>,
    pub(crate) aliases: KeyAliases,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            use_form_encoding: false,
            default_limit: None,
            default_page: None,
            aliases: KeyAliases::new(),
        }
    }

    /// Use `application/x-www-form-urlencoded` percent-encoding when encoding.
    pub const fn use_form_encoding(mut self, use_form_encoding: bool) -> Self {
        self.use_form_encoding = use_form_encoding;
        self
    }

    /// Start every description from the given `limit` and `page`.
    pub const fn default_pagination(mut self, limit: u32, page: u32) -> Self {
        self.default_limit = Some(limit);
        self.default_page = Some(page);
        self
    }

    /// Leave `limit` and `page` absent until they are set. This is the default.
    pub const fn no_default_pagination(mut self) -> Self {
        self.default_limit = None;
        self.default_page = None;
        self
    }

    /// Specifies the wire names of the pagination parameters.
    pub const fn aliases(mut self, aliases: KeyAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn key_aliases(&self) -> &KeyAliases {
        &self.aliases
    }

    /// A fresh description carrying this config's defaults.
    pub fn defaults(&self) -> QueryDescription {
        QueryDescription {
            limit: self.default_limit,
            page: self.default_page,
            ..QueryDescription::default()
        }
    }

    /// Whether `root` (the part of a key before the first `[`) names one of
    /// the fixed parameter families rather than an optional parameter.
    pub fn is_reserved(&self, root: &str) -> bool {
        matches!(root, "includes" | "sort" | "filter_groups")
            || root == self.aliases.limit
            || root == self.aliases.page
            || root == self.aliases.offset
            || root == self.aliases.per_page
    }

    /// Decodes a querystring using this `Config`.
    pub fn decode_str(&self, input: &str) -> QueryDescription {
        crate::de::decode(input, self)
    }

    /// Encodes a description to a querystring using this `Config`.
    pub fn encode_string(&self, query: &QueryDescription) -> String {
        crate::ser::encode(query, self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reserved_keys_follow_aliases() {
        let config = Config::new();
        assert!(config.is_reserved("perPage"));
        assert!(!config.is_reserved("per_page"));

        let config = Config::new().aliases(KeyAliases {
            per_page: "per_page",
            ..KeyAliases::new()
        });
        assert!(config.is_reserved("per_page"));
        assert!(!config.is_reserved("perPage"));
        assert!(config.is_reserved("filter_groups"));
    }

    #[test]
    fn defaults_follow_pagination_policy() {
        assert_eq!(Config::new().defaults(), QueryDescription::default());

        let config = Config::new().default_pagination(DEFAULT_LIMIT, DEFAULT_PAGE);
        let defaults = config.defaults();
        assert_eq!(defaults.limit, Some(15));
        assert_eq!(defaults.page, Some(1));
        assert_eq!(config.no_default_pagination().defaults().limit, None);
    }
}
