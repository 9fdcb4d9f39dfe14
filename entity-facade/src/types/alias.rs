use std::collections::HashMap;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::params;

/// Immutable mapping from logical module names to canonical module names.
///
/// The table is supplied once when building a facade and is only read
/// afterwards, so it can be shared across callers without locking.
///
/// ```
/// use entity_facade::types::AliasTable;
///
/// let aliases = AliasTable::from_iter([("people", "Contacts")]);
/// assert_eq!(aliases.resolve("people"), "Contacts");
/// assert_eq!(aliases.resolve("Accounts"), "Accounts");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the canonical name mapped to `name`, or `name` itself when no
    /// alias is defined.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// Returns the alias target for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Reads a table from a JSON object file, e.g. `{"people": "Contacts"}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, params::Error> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|err| params::Error::AliasFileRead {
            path: path.to_owned(),
            err,
        })?;

        let table: Self =
            serde_json::from_str(&content).map_err(|err| params::Error::AliasFileParse {
                path: path.to_owned(),
                err,
            })?;

        trace!("loaded {} aliases from {}", table.len(), path.display());

        Ok(table)
    }

    /// Loads the table named by `conf`, or an empty table when no file is
    /// configured.
    pub fn from_config(conf: &params::Configurables) -> Result<Self, params::Error> {
        match &conf.aliases_file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::empty()),
        }
    }

    /// Loads the table configured by [`params::env::ALIASES_FILE`].
    pub fn from_configurables() -> Result<Self, params::Error> {
        Self::from_config(params::configurables())
    }
}

impl<K, V> FromIterator<(K, V)> for AliasTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
