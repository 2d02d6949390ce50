use serde::{Deserialize, Serialize};

use crate::filter::FilterGroup;
use crate::optional::OptionalParams;
use crate::sort::{SortRule, dedup_sort};

/// Everything a list endpoint is asked for: related resources to include,
/// sort order, filters, pagination and free-form optional parameters.
///
/// Serializing it produces the "object view" (core keys only, optional
/// parameters nested under `optional`); see [`crate::json`] for the
/// flattened JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDescription {
    pub includes: Vec<String>,
    pub sort: Vec<SortRule>,
    pub filter_groups: Vec<FilterGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(rename = "perPage", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "OptionalParams::is_absent")]
    pub optional: OptionalParams,
}

impl QueryDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-applies sort and per-group filter deduplication, and normalizes
    /// optional parameters.
    ///
    /// Every mutation through the builder already keeps both invariants, so
    /// this only changes descriptions whose fields were edited directly.
    pub fn normalize(&mut self) {
        let sort = std::mem::take(&mut self.sort);
        self.sort = dedup_sort(sort);
        for group in &mut self.filter_groups {
            group.dedup();
        }
        self.optional.normalize();
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}
