//! In-memory implementation of the persistence collaborators.
//!
//! Records are kept per module and relationships are stored as rows keyed by
//! the relationship name and the `(lhs, rhs)` identifier pair, so both sides
//! of a relationship observe the same links.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use log::{debug, trace};

use super::{EntityStore, Error, TypeRegistry};
use crate::types::{EntityPage, ListQuery, Params, SortDirection};

mod entity;
pub use entity::*;

mod link;
pub use link::*;

/// Side of a relationship a module sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lhs,
    Rhs,
}

/// A relationship between two modules, reachable from each module through
/// its own link name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDef {
    pub name: String,
    pub lhs_module: String,
    pub lhs_link: String,
    pub rhs_module: String,
    pub rhs_link: String,
}

impl RelationshipDef {
    pub fn new(
        name: &str,
        lhs_module: &str,
        lhs_link: &str,
        rhs_module: &str,
        rhs_link: &str,
    ) -> Self {
        Self {
            name: name.to_owned(),
            lhs_module: lhs_module.to_owned(),
            lhs_link: lhs_link.to_owned(),
            rhs_module: rhs_module.to_owned(),
            rhs_link: rhs_link.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
struct LinkDef {
    relationship: String,
    side: Side,
    target_module: String,
}

#[derive(Debug, Clone)]
struct ModuleDef {
    object_name: String,
    links: HashMap<String, LinkDef>,
}

#[derive(Debug, Clone)]
struct Record {
    fields: Params,
    deleted: bool,
    date_entered: DateTime<Utc>,
    date_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LinkRow {
    relationship: String,
    lhs_id: String,
    rhs_id: String,
}

#[derive(Debug, Default)]
struct State {
    modules: HashMap<String, ModuleDef>,
    /// module -> id -> record
    records: HashMap<String, BTreeMap<String, Record>>,
    links: BTreeSet<LinkRow>,
}

/// Thread-safe in-memory entity store, type registry and relationship engine.
///
/// Cloning is cheap, clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<RwLock<State>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers module `module` whose entities have object name `object_name`.
    /// Registering an existing module replaces its object name and keeps its links.
    pub fn register_module(&self, module: &str, object_name: &str) {
        let mut state = self.write();
        state
            .modules
            .entry(module.to_owned())
            .and_modify(|def| def.object_name = object_name.to_owned())
            .or_insert_with(|| ModuleDef {
                object_name: object_name.to_owned(),
                links: HashMap::new(),
            });
        trace!("registered module `{}` ({})", module, object_name);
    }

    /// Registers a relationship, adding a link on both modules.
    pub fn register_relationship(&self, def: RelationshipDef) -> Result<(), Error> {
        let mut state = self.write();

        for (module, link) in [
            (&def.lhs_module, &def.lhs_link),
            (&def.rhs_module, &def.rhs_link),
        ] {
            let mdef = state
                .modules
                .get(module)
                .ok_or_else(|| Error::UnknownModule(module.clone()))?;
            if mdef.links.contains_key(link) {
                return Err(Error::DuplicateLink {
                    module: module.clone(),
                    link: link.clone(),
                });
            }
        }

        if def.lhs_module == def.rhs_module && def.lhs_link == def.rhs_link {
            return Err(Error::DuplicateLink {
                module: def.lhs_module,
                link: def.lhs_link,
            });
        }

        let sides = [
            (&def.lhs_module, &def.lhs_link, Side::Lhs, &def.rhs_module),
            (&def.rhs_module, &def.rhs_link, Side::Rhs, &def.lhs_module),
        ];
        for (module, link, side, target) in sides {
            if let Some(mdef) = state.modules.get_mut(module) {
                mdef.links.insert(
                    link.clone(),
                    LinkDef {
                        relationship: def.name.clone(),
                        side,
                        target_module: target.clone(),
                    },
                );
            }
        }

        trace!(
            "registered relationship `{}` ({}.{} <-> {}.{})",
            def.name, def.lhs_module, def.lhs_link, def.rhs_module, def.rhs_link
        );

        Ok(())
    }

    /// Persists `entity`, assigning it a new identifier if it has none.
    ///
    /// Returns the identifier of the stored record.
    pub fn save(&self, entity: &mut MemoryEntity) -> Result<String, Error> {
        let mut state = self.write();

        if !state.modules.contains_key(entity.module()) {
            return Err(Error::UnknownModule(entity.module().to_owned()));
        }

        let now = Utc::now();
        let id = entity
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let records = state.records.entry(entity.module().to_owned()).or_default();
        let date_entered = records
            .get(&id)
            .map(|record| record.date_entered)
            .unwrap_or(now);

        records.insert(
            id.clone(),
            Record {
                fields: entity.fields.clone(),
                deleted: entity.deleted,
                date_entered,
                date_modified: now,
            },
        );

        entity.id = Some(id.clone());
        entity.date_entered = Some(date_entered);
        entity.date_modified = Some(now);

        trace!("saved {} record {}", entity.module(), id);

        Ok(id)
    }

    /// Soft-deletes a record. The record stays loadable when deleted records
    /// are requested but disappears from searches and relationship listings.
    pub fn mark_deleted(&self, module: &str, id: &str) -> Result<(), Error> {
        let mut state = self.write();

        let record = state
            .records
            .get_mut(module)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| Error::RecordNotFound {
                module: module.to_owned(),
                id: id.to_owned(),
            })?;

        record.deleted = true;
        record.date_modified = Utc::now();

        debug!("{} record {} marked deleted", module, id);

        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn entity_from_record(
        &self,
        module: &str,
        object_name: &str,
        id: &str,
        record: &Record,
    ) -> MemoryEntity {
        MemoryEntity {
            repo: self.clone(),
            module: module.to_owned(),
            object_name: object_name.to_owned(),
            id: Some(id.to_owned()),
            fields: record.fields.clone(),
            deleted: record.deleted,
            date_entered: Some(record.date_entered),
            date_modified: Some(record.date_modified),
        }
    }
}

impl TypeRegistry for MemoryRepository {
    fn object_name(&self, module: &str) -> Option<String> {
        self.read()
            .modules
            .get(module)
            .map(|def| def.object_name.clone())
    }
}

impl EntityStore for MemoryRepository {
    type Entity = MemoryEntity;

    fn new_entity(&self, module: &str) -> Option<MemoryEntity> {
        let object_name = self.object_name(module)?;
        Some(MemoryEntity::blank(self.clone(), module, &object_name))
    }

    fn get_entity(
        &self,
        module: &str,
        id: Option<&str>,
        params: &Params,
        include_deleted: bool,
    ) -> Option<MemoryEntity> {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return self.new_entity(module);
        };

        if !params.is_empty() {
            trace!(
                "params {:?} not supported by memory repository, ignored",
                params.keys().collect::<Vec<_>>()
            );
        }

        let state = self.read();
        let def = state.modules.get(module)?;
        let record = state.records.get(module)?.get(id)?;

        if record.deleted && !include_deleted {
            debug!("{} record {} is deleted, hidden from lookup", module, id);
            return None;
        }

        Some(self.entity_from_record(module, &def.object_name, id, record))
    }

    fn search(
        &self,
        prototype: &MemoryEntity,
        query: &ListQuery,
    ) -> Result<EntityPage<MemoryEntity>, Error> {
        let module = prototype.module();
        let state = self.read();

        let def = state
            .modules
            .get(module)
            .ok_or_else(|| Error::UnknownModule(module.to_owned()))?;

        let mut matches: Vec<(&String, &Record)> = state
            .records
            .get(module)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, record)| query.include_deleted || !record.deleted)
                    .filter(|(id, record)| {
                        query.filters.iter().all(|filter| {
                            field_value(id, record, &filter.field).as_ref() == Some(&filter.value)
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Insertion order first, then the requested ordering (stable sort)
        matches.sort_by(|(a_id, a), (b_id, b)| {
            a.date_entered
                .cmp(&b.date_entered)
                .then_with(|| a_id.cmp(b_id))
        });
        if let Some(order) = &query.order_by {
            matches.sort_by(|(a_id, a), (b_id, b)| {
                let ord = compare_values(
                    field_value(a_id, a, &order.field).as_ref(),
                    field_value(b_id, b, &order.field).as_ref(),
                );
                match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let total = matches.len();
        let entities: Vec<MemoryEntity> = matches
            .into_iter()
            .skip(query.offset)
            .take(query.max.unwrap_or(usize::MAX))
            .map(|(id, record)| self.entity_from_record(module, &def.object_name, id, record))
            .collect();

        let end = query.offset.saturating_add(entities.len());
        let next_offset = (end < total).then_some(end);

        trace!(
            "search on {} matched {} records, returning {} from offset {}",
            module,
            total,
            entities.len(),
            query.offset
        );

        Ok(EntityPage {
            entities,
            total,
            offset: query.offset,
            next_offset,
        })
    }
}

/// Value of `field` for a stored record, `id` being exposed as a field.
fn field_value(id: &str, record: &Record, field: &str) -> Option<serde_json::Value> {
    if field == "id" {
        return Some(serde_json::Value::String(id.to_owned()));
    }
    record.fields.get(field).cloned()
}

fn type_rank(value: Option<&serde_json::Value>) -> u8 {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total ordering over optional JSON values: missing and null values come
/// first, values of different types are ordered by type.
fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    use serde_json::Value;
    match (a, b) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Repository with `Contacts` and `Accounts` modules related through
/// `accounts_contacts` (`Contacts.accounts` / `Accounts.contacts`).
#[cfg(test)]
pub(crate) fn crm_fixture() -> MemoryRepository {
    let repo = MemoryRepository::new();
    repo.register_module("Contacts", "Contact");
    repo.register_module("Accounts", "Account");
    repo.register_relationship(RelationshipDef::new(
        "accounts_contacts",
        "Accounts",
        "contacts",
        "Contacts",
        "accounts",
    ))
    .unwrap();
    repo
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::repo::{Entity, Relationship};
    use crate::types::{FieldFilter, Order};

    fn contact(repo: &MemoryRepository, first: &str, last: &str) -> MemoryEntity {
        let mut entity = repo.new_entity("Contacts").unwrap();
        entity.set("first_name", first);
        entity.set("last_name", last);
        repo.save(&mut entity).unwrap();
        entity
    }

    #[test]
    fn registry() {
        let repo = crm_fixture();
        assert_eq!(repo.object_name("Contacts").as_deref(), Some("Contact"));
        assert_eq!(repo.object_name("Accounts").as_deref(), Some("Account"));
        assert!(repo.object_name("Ghosts").is_none());
        assert!(repo.new_entity("Ghosts").is_none());
    }

    #[test]
    fn register_relationship_errors() {
        let repo = crm_fixture();

        let unknown = repo.register_relationship(RelationshipDef::new(
            "ghosts_contacts",
            "Ghosts",
            "contacts",
            "Contacts",
            "ghosts",
        ));
        assert!(matches!(unknown, Err(Error::UnknownModule(m)) if m == "Ghosts"));

        let duplicated = repo.register_relationship(RelationshipDef::new(
            "member_accounts",
            "Accounts",
            "contacts",
            "Accounts",
            "members",
        ));
        assert!(matches!(duplicated, Err(Error::DuplicateLink { .. })));
    }

    #[test]
    fn save_and_load() {
        let repo = crm_fixture();
        let saved = contact(&repo, "Ada", "Lovelace");
        let id = saved.id().unwrap();

        let loaded = repo
            .get_entity("Contacts", Some(id), &Params::new(), true)
            .unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.get_str("last_name"), Some("Lovelace"));
        assert!(loaded.date_entered().is_some());

        assert!(repo.get_entity("Accounts", Some(id), &Params::new(), true).is_none());
        assert!(repo.get_entity("Contacts", Some("missing"), &Params::new(), true).is_none());
    }

    #[test]
    fn save_keeps_creation_date() {
        let repo = crm_fixture();
        let mut entity = contact(&repo, "Ada", "Lovelace");
        let created = entity.date_entered();

        entity.set("title", "Countess");
        repo.save(&mut entity).unwrap();

        assert_eq!(entity.date_entered(), created);
        assert!(entity.date_modified() >= created);
    }

    #[test]
    fn save_unknown_module() {
        let repo = crm_fixture();
        let mut entity = MemoryEntity::blank(repo.clone(), "Ghosts", "Ghost");
        assert!(matches!(repo.save(&mut entity), Err(Error::UnknownModule(_))));
    }

    #[test]
    fn blank_without_id() {
        let repo = crm_fixture();
        let blank = repo
            .get_entity("Contacts", None, &Params::new(), true)
            .unwrap();
        assert!(blank.id().is_none());
        assert_eq!(blank.object_name(), "Contact");

        let blank = repo
            .get_entity("Contacts", Some(""), &Params::new(), true)
            .unwrap();
        assert!(blank.id().is_none());
    }

    #[test]
    fn deleted_visibility() {
        let repo = crm_fixture();
        let saved = contact(&repo, "Ada", "Lovelace");
        let id = saved.id().unwrap();

        repo.mark_deleted("Contacts", id).unwrap();

        let visible = repo.get_entity("Contacts", Some(id), &Params::new(), true);
        assert!(visible.unwrap().is_deleted());
        assert!(
            repo.get_entity("Contacts", Some(id), &Params::new(), false)
                .is_none()
        );

        assert!(matches!(
            repo.mark_deleted("Contacts", "missing"),
            Err(Error::RecordNotFound { .. })
        ));
    }

    #[test]
    fn search_filters_and_orders() {
        let repo = crm_fixture();
        contact(&repo, "Ada", "Lovelace");
        contact(&repo, "Alan", "Turing");
        let grace = contact(&repo, "Grace", "Hopper");
        repo.mark_deleted("Contacts", grace.id().unwrap()).unwrap();

        let prototype = repo.new_entity("Contacts").unwrap();

        let query = ListQuery {
            order_by: Some(Order {
                field: "last_name".into(),
                direction: SortDirection::Desc,
            }),
            ..Default::default()
        };
        let page = repo.search(&prototype, &query).unwrap();
        let names: Vec<_> = page
            .entities
            .iter()
            .filter_map(|e| e.get_str("last_name"))
            .collect();
        assert_eq!(names, vec!["Turing", "Lovelace"]);
        assert_eq!(page.total, 2);

        let query = ListQuery {
            filters: vec![FieldFilter {
                field: "first_name".into(),
                value: json!("Grace"),
            }],
            include_deleted: true,
            ..Default::default()
        };
        let page = repo.search(&prototype, &query).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.entities[0].id(), grace.id());
    }

    #[test]
    fn search_paginates() {
        let repo = crm_fixture();
        for i in 0..5 {
            let mut entity = repo.new_entity("Contacts").unwrap();
            entity.set("rank", i);
            repo.save(&mut entity).unwrap();
        }
        let prototype = repo.new_entity("Contacts").unwrap();

        let query = ListQuery {
            order_by: Some(Order {
                field: "rank".into(),
                direction: SortDirection::Asc,
            }),
            offset: 2,
            max: Some(2),
            ..Default::default()
        };
        let page = repo.search(&prototype, &query).unwrap();
        let ranks: Vec<_> = page
            .entities
            .iter()
            .filter_map(|e| e.get("rank").and_then(|v| v.as_i64()))
            .collect();
        assert_eq!(ranks, vec![2, 3]);
        assert_eq!(page.total, 5);
        assert_eq!(page.next_offset, Some(4));

        let last = repo
            .search(
                &prototype,
                &ListQuery {
                    offset: 4,
                    max: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(last.len(), 1);
        assert!(!last.has_next());

        let past_end = repo
            .search(
                &prototype,
                &ListQuery {
                    offset: 10,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(past_end.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[test]
    fn search_unknown_module() {
        let repo = crm_fixture();
        let prototype = MemoryEntity::blank(repo.clone(), "Ghosts", "Ghost");
        assert!(matches!(
            repo.search(&prototype, &ListQuery::default()),
            Err(Error::UnknownModule(_))
        ));
    }

    #[test]
    fn links_are_shared_by_both_sides() {
        let repo = crm_fixture();
        let ada = contact(&repo, "Ada", "Lovelace");
        let mut acme = repo.new_entity("Accounts").unwrap();
        acme.set("name", "Acme");
        repo.save(&mut acme).unwrap();

        let mut link = ada.load_relationship("accounts").unwrap();
        assert!(link.add(&acme));

        let reverse = acme.load_relationship("contacts").unwrap();
        let linked = reverse.linked();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id(), ada.id());
    }

    #[test]
    fn add_rejects_deleted_source() {
        let repo = crm_fixture();
        let ada = contact(&repo, "Ada", "Lovelace");
        let mut acme = repo.new_entity("Accounts").unwrap();
        acme.set("name", "Acme");
        repo.save(&mut acme).unwrap();

        repo.mark_deleted("Contacts", ada.id().unwrap()).unwrap();

        let mut link = ada.load_relationship("accounts").unwrap();
        assert!(!link.add(&acme));
        assert!(link.linked().is_empty());
        assert!(acme.load_relationship("contacts").unwrap().linked().is_empty());
    }

    #[test]
    fn add_rejects_unstored_source() {
        let repo = crm_fixture();
        let mut acme = repo.new_entity("Accounts").unwrap();
        acme.set("name", "Acme");
        repo.save(&mut acme).unwrap();

        let mut ghost = repo.new_entity("Contacts").unwrap();
        ghost.id = Some("missing".to_owned());

        let mut link = ghost.load_relationship("accounts").unwrap();
        assert!(!link.add(&acme));
        assert!(acme.load_relationship("contacts").unwrap().linked().is_empty());
    }

    #[test]
    fn compare_mixed_values() {
        assert_eq!(
            compare_values(Some(&json!(2)), Some(&json!(10))),
            Ordering::Less
        );
        assert_eq!(compare_values(None, Some(&json!("a"))), Ordering::Less);
        assert_eq!(
            compare_values(Some(&json!("b")), Some(&json!("a"))),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(Some(&json!(true)), Some(&json!(1))),
            Ordering::Less
        );
    }
}
