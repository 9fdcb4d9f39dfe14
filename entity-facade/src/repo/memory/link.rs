use log::{debug, trace};

use super::{LinkRow, MemoryEntity, MemoryRepository, Side, State};
use crate::repo::{Entity, Relationship};

/// Relationship handle loaded from a [`MemoryEntity`].
#[derive(Debug, Clone)]
pub struct MemoryLink {
    repo: MemoryRepository,
    relationship: String,
    side: Side,
    source_module: String,
    target_module: String,
    source_id: Option<String>,
}

impl MemoryLink {
    pub(super) fn load(entity: &MemoryEntity, name: &str) -> Option<Self> {
        let state = entity.repo.read();
        let link = state.modules.get(entity.module())?.links.get(name)?;

        trace!(
            "loaded link `{}` of {} (relationship `{}`)",
            name,
            entity.module(),
            link.relationship
        );

        Some(Self {
            repo: entity.repo.clone(),
            relationship: link.relationship.clone(),
            side: link.side,
            source_module: entity.module().to_owned(),
            target_module: link.target_module.clone(),
            source_id: entity.id.clone(),
        })
    }

    fn row(&self, source_id: &str, related_id: &str) -> LinkRow {
        let (lhs_id, rhs_id) = match self.side {
            Side::Lhs => (source_id, related_id),
            Side::Rhs => (related_id, source_id),
        };
        LinkRow {
            relationship: self.relationship.clone(),
            lhs_id: lhs_id.to_owned(),
            rhs_id: rhs_id.to_owned(),
        }
    }
}

/// Whether `module` holds a stored, non-deleted record with `id`.
fn is_live(state: &State, module: &str, id: &str) -> bool {
    state
        .records
        .get(module)
        .and_then(|records| records.get(id))
        .is_some_and(|record| !record.deleted)
}

impl Relationship for MemoryLink {
    type Entity = MemoryEntity;

    fn add(&mut self, related: &MemoryEntity) -> bool {
        let (Some(source_id), Some(related_id)) = (self.source_id.as_deref(), related.id()) else {
            debug!("cannot link unsaved entities on `{}`", self.relationship);
            return false;
        };

        if related.module() != self.target_module {
            debug!(
                "`{}` expects {} entities, got {}",
                self.relationship,
                self.target_module,
                related.module()
            );
            return false;
        }

        let row = self.row(source_id, related_id);
        let mut state = self.repo.write();

        for (module, id) in [
            (&self.source_module, source_id),
            (&self.target_module, related_id),
        ] {
            if !is_live(&state, module, id) {
                debug!("{module} record {id} is not available");
                return false;
            }
        }

        state.links.insert(row);
        true
    }

    fn delete(&mut self, source_id: Option<&str>, related_id: Option<&str>) -> bool {
        let (Some(source_id), Some(related_id)) = (source_id, related_id) else {
            return false;
        };

        if self.source_id.as_deref() != Some(source_id) {
            debug!(
                "link `{}` is not owned by record {}",
                self.relationship, source_id
            );
            return false;
        }

        let row = self.row(source_id, related_id);
        self.repo.write().links.remove(&row)
    }

    fn linked(&self) -> Vec<MemoryEntity> {
        let Some(source_id) = self.source_id.as_deref() else {
            return Vec::new();
        };

        let state = self.repo.read();
        let Some(def) = state.modules.get(&self.target_module) else {
            return Vec::new();
        };
        let Some(records) = state.records.get(&self.target_module) else {
            return Vec::new();
        };

        state
            .links
            .iter()
            .filter(|row| row.relationship == self.relationship)
            .filter_map(|row| match self.side {
                Side::Lhs if row.lhs_id == source_id => Some(row.rhs_id.as_str()),
                Side::Rhs if row.rhs_id == source_id => Some(row.lhs_id.as_str()),
                _ => None,
            })
            .filter_map(|id| {
                records
                    .get(id)
                    .filter(|record| !record.deleted)
                    .map(|record| {
                        self.repo
                            .entity_from_record(&self.target_module, &def.object_name, id, record)
                    })
            })
            .collect()
    }
}
