use chrono::{DateTime, Utc};

use super::{MemoryLink, MemoryRepository};
use crate::repo::Entity;
use crate::types::Params;

/// Entity handed out by [`MemoryRepository`].
///
/// Field changes stay local to the instance until [`MemoryRepository::save`]
/// is called.
#[derive(Debug, Clone)]
pub struct MemoryEntity {
    pub(super) repo: MemoryRepository,
    pub(super) module: String,
    pub(super) object_name: String,
    pub(super) id: Option<String>,
    pub(super) fields: Params,
    pub(super) deleted: bool,
    pub(super) date_entered: Option<DateTime<Utc>>,
    pub(super) date_modified: Option<DateTime<Utc>>,
}

impl MemoryEntity {
    pub(super) fn blank(repo: MemoryRepository, module: &str, object_name: &str) -> Self {
        Self {
            repo,
            module: module.to_owned(),
            object_name: object_name.to_owned(),
            id: None,
            fields: Params::new(),
            deleted: false,
            date_entered: None,
            date_modified: None,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn fields(&self) -> &Params {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }

    pub fn set(&mut self, field: &str, value: impl Into<serde_json::Value>) -> &mut Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn date_entered(&self) -> Option<DateTime<Utc>> {
        self.date_entered
    }

    pub fn date_modified(&self) -> Option<DateTime<Utc>> {
        self.date_modified
    }
}

impl PartialEq for MemoryEntity {
    fn eq(&self, other: &Self) -> bool {
        self.module == other.module
            && self.id == other.id
            && self.fields == other.fields
            && self.deleted == other.deleted
    }
}

impl Entity for MemoryEntity {
    type Relationship = MemoryLink;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn load_relationship(&self, name: &str) -> Option<MemoryLink> {
        MemoryLink::load(self, name)
    }
}
