//! Per-run state handed to injectors.

use crate::allocator::allocate;
use crate::batch::write_all;
use crate::error::InjectError;
use crate::executor::{Executor, Filter, InsertStatement};
use injector_core::{IdRange, Row};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The executor, the random source and the batch size of one run.
///
/// Fields are public so an injector can hold a
/// [`Batch`](crate::batch::Batch) on `executor` while drawing from `rng`.
pub struct Session<'a> {
    pub executor: &'a mut dyn Executor,
    pub rng: StdRng,
    pub batch_size: usize,
}

impl<'a> Session<'a> {
    /// Session with a deterministic generator when `seed` is given.
    pub fn new(executor: &'a mut dyn Executor, batch_size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            executor,
            rng,
            batch_size,
        }
    }

    pub async fn allocate(
        &mut self,
        table: &str,
        column: &str,
        count: u64,
    ) -> Result<IdRange, InjectError> {
        allocate(&mut *self.executor, table, column, count).await
    }

    /// Stream `rows` into one table in chunks of `batch_size`.
    pub async fn write_all<I>(
        &mut self,
        statement: &InsertStatement,
        rows: I,
    ) -> Result<u64, InjectError>
    where
        I: IntoIterator<Item = Row>,
    {
        write_all(&mut *self.executor, statement, rows, self.batch_size).await
    }

    pub async fn select_ids(
        &mut self,
        table: &str,
        column: &str,
        filters: &[Filter],
    ) -> Result<Vec<i64>, InjectError> {
        self.executor
            .select_ids(table, column, filters)
            .await
            .map_err(InjectError::statement(table))
    }

    pub async fn delete_all(&mut self, table: &str) -> Result<u64, InjectError> {
        self.executor
            .delete_all(table)
            .await
            .map_err(InjectError::statement(table))
    }
}
