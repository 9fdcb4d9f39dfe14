//! Crate-wide constants and runtime configurables.
//!
//! Constants are part of the public contract consumed by list handlers, while
//! [`Configurables`] holds the values that can be tuned per deployment through
//! environment variables (or a `.env` file in the working directory).

use std::path::PathBuf;
use std::sync::OnceLock;

use log::trace;

/// Default number of records returned by a single page of a list request.
pub const MAX_RECORDS_PER_PAGE: usize = 20;

/// Offset meaning "start from the first record".
pub const DEFAULT_OFFSET: usize = 0;

/// Maximum meaning "no upper bound on the number of returned records".
pub const DEFAULT_MAX: Option<usize> = None;

/// Environment variables read by [`Configurables::from_env`].
pub mod env {
    /// Path to a JSON file holding the module alias table.
    pub const ALIASES_FILE: &str = "ENTITY_FACADE_ALIASES_FILE";
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unable to read alias file {path}: {err}")]
    AliasFileRead { path: PathBuf, err: std::io::Error },
    #[error("malformed alias file {path} :: {err}")]
    AliasFileParse {
        path: PathBuf,
        err: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configurables {
    pub aliases_file: Option<PathBuf>,
}

impl Configurables {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configurables resolving each key through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let aliases_file = lookup(env::ALIASES_FILE)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self { aliases_file }
    }
}

static CONFIGURABLES: OnceLock<Configurables> = OnceLock::new();

/// Returns the process-wide configurables, loading them on first access.
pub fn configurables() -> &'static Configurables {
    CONFIGURABLES.get_or_init(|| {
        if let Err(err) = dotenv::dotenv() {
            trace!("no .env file loaded: {err}");
        }
        Configurables::from_env()
    })
}
