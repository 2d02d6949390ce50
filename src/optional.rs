use serde::{Deserialize, Serialize};

use crate::value::{Map, Value, normalize_value};

/// Caller-defined parameters outside the fixed families.
///
/// The two populated forms are never mixed: a querystring that carries any
/// indexed array-of-objects parameter (`meta[0][x]=1`) decodes to
/// [`OptionalParams::Multi`], anything else to [`OptionalParams::Single`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionalParams {
    #[default]
    Absent,
    Single(Map),
    Multi(Vec<Map>),
}

impl OptionalParams {
    pub fn is_absent(&self) -> bool {
        matches!(self, OptionalParams::Absent)
    }

    /// Looks `key` up in the single-mapping form, or in the first mapping of
    /// the list form that has it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            OptionalParams::Absent => None,
            OptionalParams::Single(map) => map.get(key),
            OptionalParams::Multi(maps) => maps.iter().find_map(|map| map.get(key)),
        }
    }

    /// Inserts `key` into the single-mapping form, switching to it from
    /// `Absent`. In the list form the entry is appended as its own mapping.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), normalize_value(value.into()));
        match self {
            OptionalParams::Absent => {
                let mut map = Map::new();
                map.insert(key, value);
                *self = OptionalParams::Single(map);
            }
            OptionalParams::Single(map) => {
                map.insert(key, value);
            }
            OptionalParams::Multi(maps) => {
                let mut map = Map::new();
                map.insert(key, value);
                maps.push(map);
            }
        }
    }
}

impl OptionalParams {
    /// Normalizes every value and drops mappings that hold nothing.
    ///
    /// Empty mappings write no segments, so they cannot survive a
    /// querystring round trip; a form left with no mappings is `Absent`.
    pub fn normalize(&mut self) {
        *self = match std::mem::take(self) {
            OptionalParams::Absent => OptionalParams::Absent,
            OptionalParams::Single(map) if map.is_empty() => OptionalParams::Absent,
            OptionalParams::Single(map) => OptionalParams::Single(normalize_map(map)),
            OptionalParams::Multi(maps) => {
                let maps: Vec<Map> = maps
                    .into_iter()
                    .filter(|map| !map.is_empty())
                    .map(normalize_map)
                    .collect();
                if maps.is_empty() {
                    OptionalParams::Absent
                } else {
                    OptionalParams::Multi(maps)
                }
            }
        };
    }
}

fn normalize_map(map: Map) -> Map {
    map.into_iter()
        .map(|(key, value)| (key, normalize_value(value)))
        .collect()
}

impl From<Map> for OptionalParams {
    fn from(map: Map) -> Self {
        OptionalParams::Single(map)
    }
}

impl From<Vec<Map>> for OptionalParams {
    fn from(maps: Vec<Map>) -> Self {
        OptionalParams::Multi(maps)
    }
}

impl From<Option<OptionalParams>> for OptionalParams {
    fn from(optional: Option<OptionalParams>) -> Self {
        optional.unwrap_or_default()
    }
}

impl TryFrom<Value> for OptionalParams {
    type Error = crate::Error;

    /// Objects become the single-mapping form, arrays of objects the list
    /// form, and `null` is absent.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(OptionalParams::Absent),
            Value::Object(map) => Ok(OptionalParams::Single(map)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(crate::Error::custom(format!(
                        "optional parameter lists may only hold objects, found `{other}`"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OptionalParams::Multi),
            other => Err(crate::Error::custom(format!(
                "optional parameters must be an object or a list of objects, found `{other}`"
            ))),
        }
    }
}
