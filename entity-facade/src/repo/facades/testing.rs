//! Scripted persistence doubles recording every call they receive.

use std::sync::{Arc, Mutex};

use crate::repo::{Entity, EntityStore, Error, Relationship, TypeRegistry};
use crate::types::{EntityPage, ListQuery, Params};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Call {
    Load(String),
    Add(String),
    Delete(String, String),
    Linked,
}

type CallLog = Arc<Mutex<Vec<Call>>>;

/// Store whose entities are built by hand through [`ScriptedStore::entity`].
#[derive(Debug, Clone, Default)]
pub(super) struct ScriptedStore {
    calls: CallLog,
}

impl ScriptedStore {
    pub fn entity(&self, object_name: &str, id: &str) -> ScriptedEntity {
        ScriptedEntity {
            object_name: object_name.to_owned(),
            id: id.to_owned(),
            loadable: true,
            accepting: true,
            calls: self.calls.clone(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl EntityStore for ScriptedStore {
    type Entity = ScriptedEntity;

    fn new_entity(&self, _module: &str) -> Option<ScriptedEntity> {
        None
    }

    fn get_entity(
        &self,
        _module: &str,
        _id: Option<&str>,
        _params: &Params,
        _include_deleted: bool,
    ) -> Option<ScriptedEntity> {
        None
    }

    fn search(
        &self,
        _prototype: &ScriptedEntity,
        _query: &ListQuery,
    ) -> Result<EntityPage<ScriptedEntity>, Error> {
        Ok(EntityPage::empty())
    }
}

impl TypeRegistry for ScriptedStore {
    fn object_name(&self, _module: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub(super) struct ScriptedEntity {
    object_name: String,
    id: String,
    loadable: bool,
    accepting: bool,
    calls: CallLog,
}

impl ScriptedEntity {
    /// Every relationship load fails.
    pub fn unloadable(mut self) -> Self {
        self.loadable = false;
        self
    }

    /// Relationships load, but mutations are rejected.
    pub fn rejecting(mut self) -> Self {
        self.accepting = false;
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Entity for ScriptedEntity {
    type Relationship = ScriptedLink;

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn object_name(&self) -> &str {
        &self.object_name
    }

    fn load_relationship(&self, name: &str) -> Option<ScriptedLink> {
        self.record(Call::Load(name.to_owned()));
        self.loadable.then(|| ScriptedLink {
            owner: self.clone(),
        })
    }
}

pub(super) struct ScriptedLink {
    owner: ScriptedEntity,
}

impl Relationship for ScriptedLink {
    type Entity = ScriptedEntity;

    fn add(&mut self, related: &ScriptedEntity) -> bool {
        self.owner.record(Call::Add(related.id.clone()));
        self.owner.accepting
    }

    fn delete(&mut self, source_id: Option<&str>, related_id: Option<&str>) -> bool {
        self.owner.record(Call::Delete(
            source_id.unwrap_or_default().to_owned(),
            related_id.unwrap_or_default().to_owned(),
        ));
        self.owner.accepting
    }

    fn linked(&self) -> Vec<ScriptedEntity> {
        self.owner.record(Call::Linked);
        Vec::new()
    }
}
