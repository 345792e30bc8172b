//! Primary key allocation.

use crate::error::InjectError;
use crate::executor::Executor;
use injector_core::IdRange;
use tracing::debug;

/// Reserve `count` ids in `table` starting right after the current maximum.
///
/// The run is the only writer, so the range stays free until the calling
/// injector has written it.
pub async fn allocate<E: Executor + ?Sized>(
    executor: &mut E,
    table: &str,
    column: &str,
    count: u64,
) -> Result<IdRange, InjectError> {
    let current_max = executor
        .max_id(table, column)
        .await
        .map_err(|source| InjectError::Allocation {
            table: table.to_string(),
            source,
        })?;
    let range = IdRange::after(current_max, count);
    debug!(
        "Allocated {}.{} ids {}..{}",
        table,
        column,
        range.first,
        range.end()
    );
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InsertStatement;
    use crate::testing::MemoryExecutor;
    use injector_core::SqlValue;

    const COMMAND: InsertStatement = InsertStatement::new("command", &["command_id"]);

    #[tokio::test]
    async fn test_allocate_on_empty_table() {
        let mut executor = MemoryExecutor::with_tables(&["command"]);
        let range = allocate(&mut executor, "command", "command_id", 4)
            .await
            .unwrap();
        assert_eq!(range.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_allocate_skips_existing_ids() {
        let mut executor = MemoryExecutor::with_tables(&["command"]);
        executor
            .insert(&COMMAND, &[vec![SqlValue::Int(3)], vec![SqlValue::Int(17)]])
            .await
            .unwrap();

        let range = allocate(&mut executor, "command", "command_id", 2)
            .await
            .unwrap();
        assert_eq!(range.first, 18);
        assert!(!range.contains(17));
    }

    #[tokio::test]
    async fn test_allocate_unknown_table() {
        let mut executor = MemoryExecutor::new();
        let result = allocate(&mut executor, "command", "command_id", 1).await;
        assert!(matches!(
            result,
            Err(InjectError::Allocation { table, .. }) if table == "command"
        ));
    }
}
