use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A comparison operator for a [`Filter`](crate::Filter).
///
/// On the wire (both querystring and JSON) an operator is written as its
/// short code, e.g. `ct` for [`QueryOperator::Contains`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Contains,
    StartsWith,
    EndsWith,
    #[default]
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    Between,
}

impl QueryOperator {
    pub const ALL: [QueryOperator; 10] = [
        QueryOperator::Contains,
        QueryOperator::StartsWith,
        QueryOperator::EndsWith,
        QueryOperator::Equals,
        QueryOperator::GreaterThan,
        QueryOperator::GreaterThanOrEqual,
        QueryOperator::LessThan,
        QueryOperator::LessThanOrEqual,
        QueryOperator::In,
        QueryOperator::Between,
    ];

    /// The short wire code of this operator.
    pub const fn code(self) -> &'static str {
        match self {
            QueryOperator::Contains => "ct",
            QueryOperator::StartsWith => "sw",
            QueryOperator::EndsWith => "ew",
            QueryOperator::Equals => "eq",
            QueryOperator::GreaterThan => "gt",
            QueryOperator::GreaterThanOrEqual => "gte",
            QueryOperator::LessThan => "lt",
            QueryOperator::LessThanOrEqual => "lte",
            QueryOperator::In => "in",
            QueryOperator::Between => "bt",
        }
    }

    /// The descriptive name, as used by JSON producers that spell operators out.
    pub const fn name(self) -> &'static str {
        match self {
            QueryOperator::Contains => "contains",
            QueryOperator::StartsWith => "startsWith",
            QueryOperator::EndsWith => "endsWith",
            QueryOperator::Equals => "equals",
            QueryOperator::GreaterThan => "greaterThan",
            QueryOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            QueryOperator::LessThan => "lessThan",
            QueryOperator::LessThanOrEqual => "lessThanOrEqual",
            QueryOperator::In => "in",
            QueryOperator::Between => "between",
        }
    }

    /// Looks up an operator by its wire code.
    ///
    /// Unknown codes fall back to [`QueryOperator::Equals`]: a malformed
    /// code does not survive a round trip.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .unwrap_or_default()
    }

    /// Like [`QueryOperator::from_code`], also accepting descriptive names.
    pub(crate) fn from_code_or_name(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|op| op.code() == s || op.name() == s)
            .unwrap_or_default()
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for QueryOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for QueryOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        Ok(QueryOperator::from_code_or_name(&s))
    }
}
