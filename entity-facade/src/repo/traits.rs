use super::Error;
use crate::types::{EntityPage, ListQuery, Params};

/// An entity instance produced by an [`EntityStore`].
///
/// Entities are opaque to the facades: they only read the identifier, the
/// canonical object name and load relationships through it.
pub trait Entity: Sized {
    type Relationship: Relationship<Entity = Self>;

    /// Identifier of the persisted record, [`None`] for blank entities.
    fn id(&self) -> Option<&str>;

    /// Canonical object name of the entity type (e.g. `Contact`).
    fn object_name(&self) -> &str;

    /// Loads the metadata of the relationship named `name` and returns a
    /// handle scoped to this entity, or [`None`] if it cannot be loaded.
    fn load_relationship(&self, name: &str) -> Option<Self::Relationship>;
}

/// Handle over a single named relationship of an entity.
///
/// Mutations report their outcome as a boolean, as the relationship engine
/// does; the facades turn a `false` into a typed error.
pub trait Relationship {
    type Entity;

    /// Links `related` to the owning entity.
    fn add(&mut self, related: &Self::Entity) -> bool;

    /// Removes the link identified by the `(source_id, related_id)` pair.
    fn delete(&mut self, source_id: Option<&str>, related_id: Option<&str>) -> bool;

    /// Entities currently linked through this relationship.
    fn linked(&self) -> Vec<Self::Entity>;
}

pub trait EntityStore {
    type Entity: Entity;

    /// Builds a blank entity of type `module`, [`None`] if the type is unknown.
    fn new_entity(&self, module: &str) -> Option<Self::Entity>;

    /// Loads a persisted entity.
    ///
    /// When `id` is [`None`] a blank entity is returned. [`None`] is returned
    /// if the record does not exist, or if it is soft-deleted and
    /// `include_deleted` is false.
    fn get_entity(
        &self,
        module: &str,
        id: Option<&str>,
        params: &Params,
        include_deleted: bool,
    ) -> Option<Self::Entity>;

    /// Searches records of the same type as `prototype`.
    fn search(
        &self,
        prototype: &Self::Entity,
        query: &ListQuery,
    ) -> Result<EntityPage<Self::Entity>, Error>;
}

pub trait TypeRegistry {
    /// Canonical object name for `module`, [`None`] if the module does not exist.
    fn object_name(&self, module: &str) -> Option<String>;
}
