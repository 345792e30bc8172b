//! MySQL implementation of [`Executor`].

use crate::error::DbError;
use crate::executor::{Executor, Filter, InsertStatement};
use async_trait::async_trait;
use injector_core::{Row, SqlValue};
use mysql_async::{prelude::*, Conn, Params, Pool, Value};
use tracing::debug;

/// Placeholder limit of a single prepared statement.
pub const MAX_PLACEHOLDERS: usize = u16::MAX as usize;

/// Executor over one pooled MySQL connection.
pub struct MySqlExecutor {
    pool: Pool,
    conn: Conn,
}

impl MySqlExecutor {
    /// Open a pool and take the single connection used for the whole run.
    pub async fn connect(connection_string: &str) -> Result<Self, DbError> {
        let pool = Pool::from_url(connection_string)?;
        let conn = pool.get_conn().await?;
        Ok(Self { pool, conn })
    }

    /// Return the connection and shut the pool down.
    pub async fn disconnect(self) -> Result<(), DbError> {
        drop(self.conn);
        self.pool.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl Executor for MySqlExecutor {
    async fn max_id(&mut self, table: &str, column: &str) -> Result<Option<i64>, DbError> {
        let sql = max_sql(table, column);
        let max: Option<Option<i64>> = self.conn.query_first(sql.as_str()).await?;
        Ok(max.flatten())
    }

    async fn select_ids(
        &mut self,
        table: &str,
        column: &str,
        filters: &[Filter],
    ) -> Result<Vec<i64>, DbError> {
        let sql = select_sql(table, column, filters);
        if filters.is_empty() {
            return Ok(self.conn.query::<i64, _>(sql.as_str()).await?);
        }
        let params: Vec<Value> = filters.iter().map(|f| to_value(&f.value)).collect();
        Ok(self
            .conn
            .exec::<i64, _, _>(sql.as_str(), Params::Positional(params))
            .await?)
    }

    async fn insert(&mut self, statement: &InsertStatement, rows: &[Row]) -> Result<u64, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }
        statement.check_rows(rows)?;

        if fits_placeholders(rows.len(), statement.width()) {
            let sql = insert_sql(statement, rows.len());
            let params: Vec<Value> = rows.iter().flatten().map(to_value).collect();
            self.conn
                .exec_drop(sql.as_str(), Params::Positional(params))
                .await?;
        } else {
            // Too many values for one prepared statement: let the driver
            // render them as escaped literals instead.
            debug!(
                "Inserting {} rows into {} as literals ({} values)",
                rows.len(),
                statement.table,
                rows.len() * statement.width()
            );
            let sql = insert_literal_sql(statement, rows);
            self.conn.query_drop(sql.as_str()).await?;
        }

        Ok(rows.len() as u64)
    }

    async fn delete_all(&mut self, table: &str) -> Result<u64, DbError> {
        self.conn.query_drop(delete_sql(table)).await?;
        Ok(self.conn.affected_rows())
    }
}

/// Whether `row_count` rows of `width` values can be bound as parameters.
fn fits_placeholders(row_count: usize, width: usize) -> bool {
    row_count
        .checked_mul(width)
        .is_some_and(|values| values <= MAX_PLACEHOLDERS)
}

fn to_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Int(value) => Value::Int(*value),
        SqlValue::Text(value) => Value::Bytes(value.as_bytes().to_vec()),
    }
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn max_sql(table: &str, column: &str) -> String {
    format!("SELECT MAX(`{column}`) FROM `{table}`")
}

fn select_sql(table: &str, column: &str, filters: &[Filter]) -> String {
    let mut sql = format!("SELECT `{column}` FROM `{table}`");
    if !filters.is_empty() {
        let predicates: Vec<String> = filters
            .iter()
            .map(|f| format!("`{}` = ?", f.column))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql
}

fn insert_sql(statement: &InsertStatement, row_count: usize) -> String {
    let placeholders: Vec<&str> = statement.columns.iter().map(|_| "?").collect();
    let row_template = format!("({})", placeholders.join(", "));
    let rows_template: Vec<&str> = (0..row_count).map(|_| row_template.as_str()).collect();

    format!(
        "INSERT INTO `{}` ({}) VALUES {}",
        statement.table,
        column_list(statement.columns),
        rows_template.join(", ")
    )
}

fn insert_literal_sql(statement: &InsertStatement, rows: &[Row]) -> String {
    let rows_sql: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(|v| to_value(v).as_sql(false)).collect();
            format!("({})", values.join(", "))
        })
        .collect();

    format!(
        "INSERT INTO `{}` ({}) VALUES {}",
        statement.table,
        column_list(statement.columns),
        rows_sql.join(", ")
    )
}

fn delete_sql(table: &str) -> String {
    format!("DELETE FROM `{table}`")
}
