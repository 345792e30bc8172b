//! The database boundary.
//!
//! Injectors only ever issue four kinds of statements: a scalar `MAX(id)`,
//! a filtered id `SELECT`, a multi-row `INSERT` and an unconditional
//! `DELETE`. [`Executor`] abstracts exactly those so the pipeline can run
//! against MySQL or against [`MemoryExecutor`](crate::testing::MemoryExecutor).

use crate::error::DbError;
use async_trait::async_trait;
use injector_core::{Row, SqlValue};

/// Target table and column list of a multi-row insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl InsertStatement {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self { table, columns }
    }

    /// Number of values every row must carry.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Reject rows whose width does not match the column list.
    pub fn check_rows(&self, rows: &[Row]) -> Result<(), DbError> {
        match rows.iter().find(|row| row.len() != self.width()) {
            Some(row) => Err(DbError::RowWidth {
                table: self.table.to_string(),
                expected: self.width(),
                actual: row.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Equality predicate of a `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: SqlValue,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// Statement executor over a single connection.
///
/// Statements are issued one at a time; each call completes before the
/// next one starts.
#[async_trait]
pub trait Executor: Send {
    /// `SELECT MAX(column) FROM table`; `None` on an empty table.
    async fn max_id(&mut self, table: &str, column: &str) -> Result<Option<i64>, DbError>;

    /// `SELECT column FROM table WHERE f1 = v1 AND ...`, in insertion order.
    async fn select_ids(
        &mut self,
        table: &str,
        column: &str,
        filters: &[Filter],
    ) -> Result<Vec<i64>, DbError>;

    /// One multi-row `INSERT`. Returns the number of rows written.
    async fn insert(&mut self, statement: &InsertStatement, rows: &[Row]) -> Result<u64, DbError>;

    /// `DELETE FROM table`. Returns the number of rows removed.
    async fn delete_all(&mut self, table: &str) -> Result<u64, DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEPERIOD: InsertStatement =
        InsertStatement::new("timeperiod", &["tp_id", "tp_name", "tp_alias"]);

    #[test]
    fn test_check_rows() {
        let good = vec![vec![1i64.into(), "a".into(), "b".into()]];
        assert!(TIMEPERIOD.check_rows(&good).is_ok());

        let short = vec![vec![SqlValue::Int(1)]];
        match TIMEPERIOD.check_rows(&short) {
            Err(DbError::RowWidth {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
