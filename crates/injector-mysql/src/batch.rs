//! Batched multi-row inserts.

use crate::error::{DbError, InjectError};
use crate::executor::{Executor, InsertStatement};
use injector_core::Row;
use tracing::debug;

/// Default number of rows per INSERT statement.
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Rows waiting for one table.
#[derive(Debug)]
struct Pending {
    statement: InsertStatement,
    rows: Vec<Row>,
}

/// Accumulates rows for one or more tables and flushes them in chunks.
///
/// Tables are listed parents first. As soon as one table holds
/// `batch_size` rows, every table is flushed in that order, so a relation
/// row never reaches the database before the row it references. The final
/// partial chunks are written by [`Batch::finish`]; rows left in a batch
/// that is dropped without `finish` are never written.
pub struct Batch<'a, E: ?Sized> {
    executor: &'a mut E,
    tables: Vec<Pending>,
    batch_size: usize,
    written: u64,
}

impl<'a, E: Executor + ?Sized> Batch<'a, E> {
    pub fn new(executor: &'a mut E, statements: &[InsertStatement], batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        let tables = statements
            .iter()
            .map(|statement| Pending {
                statement: *statement,
                rows: Vec::with_capacity(batch_size.min(1024)),
            })
            .collect();
        Self {
            executor,
            tables,
            batch_size,
            written: 0,
        }
    }

    /// Queue a row for `statement`, flushing when its chunk is full.
    pub async fn push(&mut self, statement: &InsertStatement, row: Row) -> Result<(), InjectError> {
        let pending = self
            .tables
            .iter_mut()
            .find(|pending| pending.statement.table == statement.table)
            .ok_or_else(|| InjectError::Statement {
                table: statement.table.to_string(),
                source: DbError::UnknownTable(statement.table.to_string()),
            })?;
        pending.rows.push(row);
        if pending.rows.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn extend<I>(
        &mut self,
        statement: &InsertStatement,
        rows: I,
    ) -> Result<(), InjectError>
    where
        I: IntoIterator<Item = Row>,
    {
        for row in rows {
            self.push(statement, row).await?;
        }
        Ok(())
    }

    /// Write the pending partial chunks and return the total rows written.
    pub async fn finish(mut self) -> Result<u64, InjectError> {
        self.flush().await?;
        Ok(self.written)
    }

    async fn flush(&mut self) -> Result<(), InjectError> {
        for pending in &mut self.tables {
            if pending.rows.is_empty() {
                continue;
            }
            let rows = std::mem::take(&mut pending.rows);
            let table = pending.statement.table;
            let written = self
                .executor
                .insert(&pending.statement, &rows)
                .await
                .map_err(InjectError::statement(table))?;
            debug!("Inserted batch of {} rows into {}", written, table);
            self.written += written;
        }
        Ok(())
    }
}

/// Write all `rows` in chunks of at most `batch_size`.
pub async fn write_all<E, I>(
    executor: &mut E,
    statement: &InsertStatement,
    rows: I,
    batch_size: usize,
) -> Result<u64, InjectError>
where
    E: Executor + ?Sized,
    I: IntoIterator<Item = Row>,
{
    let mut batch = Batch::new(executor, &[*statement], batch_size);
    batch.extend(statement, rows).await?;
    batch.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryExecutor, Statement};
    use injector_core::SqlValue;

    const TIMEPERIOD: InsertStatement = InsertStatement::new("timeperiod", &["tp_id", "tp_name"]);

    fn rows(n: i64) -> Vec<Row> {
        (1..=n)
            .map(|i| vec![SqlValue::Int(i), SqlValue::text(format!("tp_name_{i}"))])
            .collect()
    }

    #[tokio::test]
    async fn test_write_all_chunks_rows() {
        let mut executor = MemoryExecutor::with_tables(&["timeperiod"]);
        let written = write_all(&mut executor, &TIMEPERIOD, rows(7), 3).await.unwrap();

        assert_eq!(written, 7);
        assert_eq!(executor.row_count("timeperiod"), 7);
        let sizes: Vec<usize> = executor
            .statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Insert { rows, .. } => Some(*rows),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_empty_flush() {
        let mut executor = MemoryExecutor::with_tables(&["timeperiod"]);
        write_all(&mut executor, &TIMEPERIOD, rows(4), 2).await.unwrap();
        assert_eq!(executor.statements().len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_to_write() {
        let mut executor = MemoryExecutor::with_tables(&["timeperiod"]);
        let written = write_all(&mut executor, &TIMEPERIOD, Vec::<Row>::new(), 10)
            .await
            .unwrap();
        assert_eq!(written, 0);
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_failing_insert_is_a_statement_error() {
        let mut executor = MemoryExecutor::new();
        let result = write_all(&mut executor, &TIMEPERIOD, rows(1), 10).await;
        assert!(matches!(
            result,
            Err(InjectError::Statement { table, .. }) if table == "timeperiod"
        ));
    }

    const PARENT: InsertStatement = InsertStatement::new("hostgroup", &["hg_id"]);
    const CHILD: InsertStatement =
        InsertStatement::new("hostgroup_relation", &["hostgroup_hg_id", "host_host_id"]);

    fn inserts(executor: &MemoryExecutor) -> Vec<(String, usize)> {
        executor
            .statements()
            .iter()
            .filter_map(|s| match s {
                Statement::Insert { table, rows } => Some((table.clone(), *rows)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_full_child_chunk_flushes_parent_first() {
        let mut executor = MemoryExecutor::with_tables(&["hostgroup", "hostgroup_relation"]);
        let mut batch = Batch::new(&mut executor, &[PARENT, CHILD], 2);
        batch.push(&PARENT, vec![SqlValue::Int(1)]).await.unwrap();
        for host in [10, 11, 12] {
            batch
                .push(&CHILD, vec![SqlValue::Int(1), SqlValue::Int(host)])
                .await
                .unwrap();
        }
        let written = batch.finish().await.unwrap();

        assert_eq!(written, 4);
        assert_eq!(
            inserts(&executor),
            vec![
                ("hostgroup".to_string(), 1),
                ("hostgroup_relation".to_string(), 2),
                ("hostgroup_relation".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_pending_rows_stay_bounded() {
        let mut executor = MemoryExecutor::with_tables(&["timeperiod"]);
        let mut batch = Batch::new(&mut executor, &[TIMEPERIOD], 3);
        for row in rows(10) {
            batch.push(&TIMEPERIOD, row).await.unwrap();
            assert!(batch.tables[0].rows.len() < 3);
        }
        batch.finish().await.unwrap();
        assert_eq!(executor.row_count("timeperiod"), 10);
    }

    #[tokio::test]
    async fn test_push_to_undeclared_table() {
        let mut executor = MemoryExecutor::with_tables(&["timeperiod", "hostgroup"]);
        let mut batch = Batch::new(&mut executor, &[TIMEPERIOD], 3);
        let result = batch.push(&PARENT, vec![SqlValue::Int(1)]).await;
        assert!(matches!(
            result,
            Err(InjectError::Statement { table, .. }) if table == "hostgroup"
        ));
    }
}
