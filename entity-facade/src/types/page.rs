use serde::{Deserialize, Serialize};

use crate::params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Equality constraint on a single entity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: serde_json::Value,
}

/// Search parameters handed to the entity store by a list request.
///
/// Filters are combined with a logical AND. Pagination values are passed
/// through untouched, the store is responsible for applying them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    #[serde(default)]
    pub order_by: Option<Order>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order_by: None,
            offset: params::DEFAULT_OFFSET,
            max: params::DEFAULT_MAX,
            include_deleted: false,
        }
    }
}

impl ListQuery {
    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

/// A single page of entities returned by a store search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPage<E> {
    pub entities: Vec<E>,
    /// Number of records matching the query, ignoring pagination.
    pub total: usize,
    pub offset: usize,
    /// Offset of the following page, [`None`] when this is the last one.
    pub next_offset: Option<usize>,
}

impl<E> EntityPage<E> {
    pub fn empty() -> Self {
        Self {
            entities: Vec::new(),
            total: 0,
            offset: params::DEFAULT_OFFSET,
            next_offset: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next_offset.is_some()
    }
}

impl<E> IntoIterator for EntityPage<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}
