//! Error types for the injection pipeline.

use injector_core::{ConfigError, EntityKind, IdMapError, RegistryError};
use injector_generator::GeneratorError;
use thiserror::Error;

/// Errors raised by an [`Executor`](crate::Executor).
#[derive(Error, Debug)]
pub enum DbError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// Table does not exist in the target schema.
    #[error("Table '{0}' does not exist")]
    UnknownTable(String),

    /// Row width does not match the statement's column list.
    #[error("Insert into '{table}' expects {expected} values per row, got {actual}")]
    RowWidth {
        table: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors that abort an injection or purge run.
///
/// Every variant is fatal: the orchestrator stops at the first one and
/// leaves already written batches in place.
#[derive(Error, Debug)]
pub enum InjectError {
    /// The next free id of a table could not be determined.
    #[error("Cannot allocate ids in '{table}': {source}")]
    Allocation {
        table: String,
        #[source]
        source: DbError,
    },

    /// A relation or reference was requested from an empty dependency pool.
    #[error("Cannot inject {kind}: {source}")]
    EmptyPool {
        kind: EntityKind,
        #[source]
        source: GeneratorError,
    },

    /// Hosts (or business activities) need an active poller and there is none.
    #[error("Cannot inject {kind}: at least one poller must be enabled")]
    NoPollerAvailable { kind: EntityKind },

    /// An insert, select or delete failed.
    #[error("Statement on '{table}' failed: {source}")]
    Statement {
        table: String,
        #[source]
        source: DbError,
    },

    /// A kind declared in the registry has no injector.
    #[error("No injector registered for '{0}'")]
    MissingInjector(EntityKind),

    /// Password hashing for generated users failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    IdMap(#[from] IdMapError),
}

impl InjectError {
    /// Adapter for `map_err` on pool sampling results.
    pub fn empty_pool(kind: EntityKind) -> impl FnOnce(GeneratorError) -> InjectError {
        move |source| InjectError::EmptyPool { kind, source }
    }

    pub(crate) fn statement(table: &str) -> impl FnOnce(DbError) -> InjectError + '_ {
        move |source| InjectError::Statement {
            table: table.to_string(),
            source,
        }
    }
}
