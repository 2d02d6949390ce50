use std::borrow::Cow;
use std::fmt;

mod decode;

pub(crate) use decode::decode;

/// One bracketed segment of a key.
///
/// `items[0][name]` has the root `items` followed by `Key::Index(0)` and
/// `Key::Name("name")`; `tags[]` has the root `tags` followed by
/// `Key::Append`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key<'a> {
    Index(usize),
    Name(&'a str),
    Append,
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "[{i}]"),
            Key::Name(s) => write!(f, "[{s:?}]"),
            Key::Append => f.write_str("[]"),
        }
    }
}

impl<'a> Key<'a> {
    fn from_segment(segment: &'a str) -> Self {
        if segment.is_empty() {
            return Key::Append;
        }
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = segment.parse::<usize>() {
                return Key::Index(i);
            }
            // too large for an index: fall back to a name
        }
        Key::Name(segment)
    }

    /// The segment as an object key; indices are written out in decimal.
    pub(crate) fn to_map_key(self) -> Option<String> {
        match self {
            Key::Index(i) => Some(itoa::Buffer::new().format(i).to_owned()),
            Key::Name(s) => Some(s.to_owned()),
            Key::Append => None,
        }
    }
}

/// A decoded key split into its bracket-free root and bracketed segments.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct KeyPath<'a> {
    pub root: &'a str,
    pub segments: Vec<Key<'a>>,
}

/// Splits a querystring (without its leading `?`) into decoded `(key, value)` pairs.
///
/// Each half is percent-decoded independently. A pair without `=` is a key
/// with an empty value; empty pairs (`a=1&&b=2`) are skipped.
pub(crate) fn pairs(input: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), Cow::Borrowed("")),
        })
}

/// Splits a decoded key like `filter_groups[0][filters][1][value][]` into
/// its root and segments.
///
/// Returns `None` for keys that do not follow the bracket grammar: an empty
/// root, an unclosed or nested bracket, or text between `]` and `[`.
pub(crate) fn parse_key(key: &str) -> Option<KeyPath<'_>> {
    let (root, mut rest) = match key.find('[') {
        Some(pos) => key.split_at(pos),
        None => (key, ""),
    };
    if root.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.contains('[') {
            return None;
        }
        segments.push(Key::from_segment(segment));
        rest = &inner[close + 1..];
    }

    Some(KeyPath { root, segments })
}
