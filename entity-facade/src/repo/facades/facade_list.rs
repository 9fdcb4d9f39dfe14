use log::trace;

use super::FacadeError;
use crate::{repo, types};

/// A pending search over entities of a single type.
///
/// Built by [`super::FacadeEntity::get_list`] around a blank entity of the
/// requested type; options are collected with the builder methods and the
/// search runs on [`ListRequest::fetch`]. Pagination values are handed to the
/// store untouched.
pub struct ListRequest<'a, R: repo::EntityStore> {
    repo: &'a R,
    entity: R::Entity,
    query: types::ListQuery,
}

impl<'a, R: repo::EntityStore> ListRequest<'a, R> {
    pub(super) fn new(repo: &'a R, entity: R::Entity) -> Self {
        Self {
            repo,
            entity,
            query: types::ListQuery::default(),
        }
    }

    /// The blank entity describing the listed type.
    pub fn entity(&self) -> &R::Entity {
        &self.entity
    }

    pub fn query(&self) -> &types::ListQuery {
        &self.query
    }

    /// Keeps only records whose `field` equals `value`.
    pub fn filter(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.query.filters.push(types::FieldFilter {
            field: field.to_owned(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: types::SortDirection) -> Self {
        self.query.order_by = Some(types::Order {
            field: field.to_owned(),
            direction,
        });
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = offset;
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.query.max = Some(max);
        self
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.query.include_deleted = include_deleted;
        self
    }

    pub fn fetch(self) -> Result<types::EntityPage<R::Entity>, FacadeError> {
        trace!(
            "fetching list (offset: {}, max: {:?}, filters: {})",
            self.query.offset,
            self.query.max,
            self.query.filters.len()
        );
        Ok(self.repo.search(&self.entity, &self.query)?)
    }
}
