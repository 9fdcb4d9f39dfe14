use log::{debug, trace};

use super::{FacadeError, ListRequest};
use crate::{repo, types};

/// Facade used to access entities and their relationships.
///
/// Callers always address modules by their logical name; aliases defined in
/// the [`types::AliasTable`] are resolved here and never leak to the caller
/// except inside error messages.
///
/// The facade holds no per-call state, entities and relationship handles are
/// owned by the caller as soon as they are returned.
pub struct FacadeEntity<R> {
    repo: R,
    aliases: types::AliasTable,
}

impl<R> FacadeEntity<R>
where
    R: repo::EntityStore + repo::TypeRegistry,
{
    pub fn new(repo: R, aliases: types::AliasTable) -> Self {
        Self { repo, aliases }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn aliases(&self) -> &types::AliasTable {
        &self.aliases
    }

    /// Builds a blank entity of type `module`, resolving aliases first.
    pub fn new_entity(&self, module: &str) -> Result<R::Entity, FacadeError> {
        let resolved = self.aliases.resolve(module);
        if resolved != module {
            trace!("module `{}` aliased to `{}`", module, resolved);
        }

        self.repo
            .new_entity(resolved)
            .ok_or_else(|| FacadeError::InvalidType(resolved.to_owned()))
    }

    /// Loads an entity straight from the store.
    ///
    /// Unlike [`Self::get_entity_safe`] no alias is resolved and a missing
    /// record is reported as [`None`]. Without an `id` a blank entity is returned.
    pub fn get_entity(
        &self,
        module: &str,
        id: Option<&str>,
        options: &types::LoadOptions,
    ) -> Option<R::Entity> {
        self.repo
            .get_entity(module, id, &options.params, options.include_deleted)
    }

    /// Loads an entity by identifier, failing on any missing piece.
    ///
    /// An absent identifier, `""` and `"0"` are all rejected as empty.
    ///
    /// The module name is first checked against the type registry; when the
    /// registry does not know it, its alias (if any) is tried instead and
    /// replaces the module name for the rest of the lookup.
    pub fn get_entity_safe(
        &self,
        module: &str,
        id: Option<&str>,
        options: &types::LoadOptions,
    ) -> Result<R::Entity, FacadeError> {
        let Some(id) = id.filter(|id| !matches!(*id, "" | "0")) else {
            return Err(FacadeError::EmptyIdentifier(module.to_owned()));
        };

        let mut module = module;
        let mut object_name = self.repo.object_name(module);

        if object_name.is_none() {
            if let Some(alias) = self.aliases.get(module) {
                trace!("module `{}` unknown to registry, trying alias `{}`", module, alias);
                object_name = self.repo.object_name(alias);
                module = alias;
            }
        }

        if object_name.is_none() {
            return Err(FacadeError::UnknownModule(module.to_owned()));
        }

        self.get_entity(module, Some(id), options).ok_or_else(|| {
            debug!("{} record {} not found", module, id);
            FacadeError::NotFound {
                module: module.to_owned(),
                id: id.to_owned(),
            }
        })
    }

    /// Starts a list request over entities of type `module`.
    pub fn get_list(&self, module: &str) -> Result<ListRequest<'_, R>, FacadeError> {
        Ok(ListRequest::new(&self.repo, self.new_entity(module)?))
    }
}
