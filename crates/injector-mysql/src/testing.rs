//! In-memory executor for tests.
//!
//! [`MemoryExecutor`] keeps every table as a list of rows and logs each
//! statement it runs, so pipeline tests can inspect both the data that was
//! written and how it was written. Statements against a table that was not
//! created fail like they would on a real schema.

use crate::error::DbError;
use crate::executor::{Executor, Filter, InsertStatement};
use crate::injectors::default_injectors;
use async_trait::async_trait;
use injector_core::{Capability, Row, SqlValue};
use std::collections::BTreeMap;

/// One stored row, keyed by column name.
pub type MemoryRow = BTreeMap<String, SqlValue>;

/// Tables read by injectors but owned by the monitoring platform.
pub const PLATFORM_TABLES: &[&str] = &["nagios_server", "modules_informations", "topology"];

/// Statement log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert { table: String, rows: usize },
    Delete { table: String, rows: u64 },
}

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    tables: BTreeMap<String, Vec<MemoryRow>>,
    log: Vec<Statement>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: &[&str]) -> Self {
        let mut executor = Self::new();
        for table in tables {
            executor.create_table(table);
        }
        executor
    }

    /// Every table the injectors touch, with one active central poller and
    /// three topology entries. No optional module is installed.
    pub fn centreon() -> Self {
        let mut executor = Self::with_tables(PLATFORM_TABLES);
        for injector in default_injectors() {
            for table in injector.owned_tables() {
                executor.create_table(table);
            }
        }
        executor.add_poller(1, true, true);
        for topology_id in [1, 2, 3] {
            executor.seed("topology", &[("topology_id", SqlValue::Int(topology_id))]);
        }
        executor
    }

    pub fn create_table(&mut self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }

    /// Insert a fixture row without logging a statement.
    pub fn seed(&mut self, table: &str, values: &[(&str, SqlValue)]) {
        let row = values
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    pub fn add_poller(&mut self, id: i64, localhost: bool, active: bool) {
        self.seed(
            "nagios_server",
            &[
                ("id", SqlValue::Int(id)),
                ("localhost", SqlValue::flag(localhost as u8)),
                ("ns_activate", SqlValue::flag(active as u8)),
            ],
        );
    }

    pub fn install_module(&mut self, capability: Capability) {
        let id = self.rows("modules_informations").len() as i64 + 1;
        self.seed(
            "modules_informations",
            &[
                ("id", SqlValue::Int(id)),
                ("name", SqlValue::text(capability.module_name())),
            ],
        );
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Rows of a table (empty when the table does not exist).
    pub fn rows(&self, table: &str) -> &[MemoryRow] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Values of one column, in insertion order.
    pub fn column(&self, table: &str, column: &str) -> Vec<SqlValue> {
        self.rows(table)
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(SqlValue::Null))
            .collect()
    }

    /// Integer values of one column, skipping non-integers.
    pub fn ids(&self, table: &str, column: &str) -> Vec<i64> {
        self.rows(table)
            .iter()
            .filter_map(|row| row.get(column).and_then(SqlValue::as_i64))
            .collect()
    }

    /// Row counts of every table.
    pub fn snapshot(&self) -> BTreeMap<String, usize> {
        self.tables
            .iter()
            .map(|(table, rows)| (table.clone(), rows.len()))
            .collect()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.log
    }

    /// Number of INSERT and DELETE statements run so far.
    pub fn writes(&self) -> usize {
        self.log.len()
    }

    fn table(&self, table: &str) -> Result<&Vec<MemoryRow>, DbError> {
        self.tables
            .get(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut Vec<MemoryRow>, DbError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))
    }
}

/// Loose equality: integers match their textual form, like MySQL compares
/// an enum column against a number.
fn value_matches(stored: Option<&SqlValue>, expected: &SqlValue) -> bool {
    match stored {
        Some(value) if value == expected => true,
        Some(value) => value.as_i64().is_some() && value.as_i64() == expected.as_i64(),
        None => expected.is_null(),
    }
}

#[async_trait]
impl Executor for MemoryExecutor {
    async fn max_id(&mut self, table: &str, column: &str) -> Result<Option<i64>, DbError> {
        Ok(self
            .table(table)?
            .iter()
            .filter_map(|row| row.get(column).and_then(SqlValue::as_i64))
            .max())
    }

    async fn select_ids(
        &mut self,
        table: &str,
        column: &str,
        filters: &[Filter],
    ) -> Result<Vec<i64>, DbError> {
        Ok(self
            .table(table)?
            .iter()
            .filter(|row| {
                filters
                    .iter()
                    .all(|f| value_matches(row.get(f.column), &f.value))
            })
            .filter_map(|row| row.get(column).and_then(SqlValue::as_i64))
            .collect())
    }

    async fn insert(&mut self, statement: &InsertStatement, rows: &[Row]) -> Result<u64, DbError> {
        statement.check_rows(rows)?;
        let stored = self.table_mut(statement.table)?;
        for row in rows {
            stored.push(
                statement
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.to_string(), value.clone()))
                    .collect(),
            );
        }
        self.log.push(Statement::Insert {
            table: statement.table.to_string(),
            rows: rows.len(),
        });
        Ok(rows.len() as u64)
    }

    async fn delete_all(&mut self, table: &str) -> Result<u64, DbError> {
        let stored = self.table_mut(table)?;
        let removed = stored.len() as u64;
        stored.clear();
        self.log.push(Statement::Delete {
            table: table.to_string(),
            rows: removed,
        });
        Ok(removed)
    }
}
