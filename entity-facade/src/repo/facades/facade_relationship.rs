use log::{info, trace, warn};

use super::{FacadeEntity, FacadeError};
use crate::repo::{self, Entity, Relationship};

/// Loads `relationship` on `entity`. Every operation starts from a fresh
/// load, handles are never kept between calls.
fn load_relationship<E: Entity>(
    entity: &E,
    relationship: &str,
) -> Result<E::Relationship, FacadeError> {
    entity
        .load_relationship(relationship)
        .ok_or_else(|| FacadeError::RelationshipLoad {
            relationship: relationship.to_owned(),
            object_name: entity.object_name().to_owned(),
        })
}

impl<R> FacadeEntity<R>
where
    R: repo::EntityStore + repo::TypeRegistry,
{
    /// Returns the entities linked to `entity` through `relationship`.
    pub fn related_entities(
        &self,
        entity: &R::Entity,
        relationship: &str,
    ) -> Result<Vec<R::Entity>, FacadeError> {
        let link = load_relationship(entity, relationship)?;
        let related = link.linked();

        trace!(
            "{} entities related to {} through `{}`",
            related.len(),
            entity.object_name(),
            relationship
        );

        Ok(related)
    }

    /// Links `related` to `source` through `relationship`.
    pub fn create_relationship(
        &self,
        source: &R::Entity,
        related: &R::Entity,
        relationship: &str,
    ) -> Result<(), FacadeError> {
        let mut link = load_relationship(source, relationship)?;

        if !link.add(related) {
            return Err(FacadeError::RelationshipCreate {
                relationship: relationship.to_owned(),
                source_object: source.object_name().to_owned(),
                related_object: related.object_name().to_owned(),
            });
        }

        info!(
            "created relationship `{}` between {} and {}",
            relationship,
            source.object_name(),
            related.object_name()
        );

        Ok(())
    }

    /// Removes the link between `source` and `related` from `relationship`.
    pub fn delete_relationship(
        &self,
        source: &R::Entity,
        related: &R::Entity,
        relationship: &str,
    ) -> Result<(), FacadeError> {
        warn!(
            "requested deletion of relationship `{}` between {} and {}",
            relationship,
            source.object_name(),
            related.object_name()
        );

        let mut link = load_relationship(source, relationship)?;

        if !link.delete(source.id(), related.id()) {
            return Err(FacadeError::RelationshipDelete {
                relationship: relationship.to_owned(),
                source_object: source.object_name().to_owned(),
                related_object: related.object_name().to_owned(),
            });
        }

        Ok(())
    }
}
