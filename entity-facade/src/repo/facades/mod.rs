//! # Facade Module
//!
//! This module implements the **Facade** pattern, serving as an intermediate logic layer
//! between the API layer and the underlying persistence collaborators.
//!
//! The collaborators report failures the way an ORM usually does: a missing entity, or a
//! `false` returned by a relationship mutation. Facades turn each of those signals into a
//! distinct [`FacadeError`] variant carrying the module, identifier and relationship
//! involved, so that callers never have to inspect sentinel values.
//!
//! * **Name Resolution:** Logical module names are mapped to canonical ones through an
//!   immutable [`crate::types::AliasTable`] supplied at construction.
//! * **Entity Access:** [`FacadeEntity`] creates, loads and lists entities.
//! * **Relationship Access:** [`FacadeEntity`] loads named relationships and links or
//!   unlinks entities through them.

mod facade_entity;
pub use facade_entity::*;

mod facade_relationship;

mod facade_list;
pub use facade_list::*;

mod facade_error;
pub use facade_error::*;

#[cfg(test)]
mod testing;
