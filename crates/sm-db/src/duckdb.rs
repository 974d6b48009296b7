//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::types::Value as SqlValue;
use duckdb::{params_from_iter, Connection};
use sm_core::sql_utils::{quote_ident, quote_qualified, split_qualified_name};
use sm_core::{TableSchema, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::ConnectionError(format!("{}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let (schema, table) = split_qualified_name(name);
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            [schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn query_keys_sync(&self, sql: &str) -> DbResult<Vec<i64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let keys = stmt
            .query_map([], |row| row.get::<_, Option<i64>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys.into_iter().flatten().collect())
    }

    /// Read every column as `Option<String>`.
    ///
    /// DuckDB 1.4 panics on `stmt.column_count()` before execution, so the
    /// count is taken from each row.
    fn query_text_rows_sync(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, Option<String>>(i))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn replace_table_sync(&self, table: &TableSchema, rows: &[Vec<Value>]) -> DbResult<usize> {
        let conn = self.lock()?;
        let name = quote_qualified(&table.qualified_name());
        let width = table.columns().len();

        with_transaction(&conn, |conn| {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", name))?;
            conn.execute_batch(&table.create_sql())?;

            let mut stmt = conn.prepare(&table.insert_sql())?;
            for (idx, row) in rows.iter().enumerate() {
                if row.len() != width {
                    return Err(DbError::ExecutionError(format!(
                        "row {} of {} has {} values, expected {}",
                        idx + 1,
                        name,
                        row.len(),
                        width
                    )));
                }
                stmt.execute(params_from_iter(row.iter().map(to_sql_value)))
                    .map_err(|e| {
                        DbError::ExecutionError(format!("insert into {} failed: {}", name, e))
                    })?;
            }
            Ok(rows.len())
        })
    }
}

/// Run `body` between BEGIN and COMMIT, rolling back on any error.
fn with_transaction<T>(
    conn: &Connection,
    body: impl FnOnce(&Connection) -> DbResult<T>,
) -> DbResult<T> {
    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

    let result = body(conn);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(DbError::TransactionError(format!(
                    "COMMIT failed: {commit_err}"
                )));
            }
        }
        Err(_) => {
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                log::warn!("ROLLBACK failed: {}", rollback_err);
            }
        }
    }
    result
}

/// Bind representation of a canonical value; dates go in as ISO text and
/// are cast by the insert statement.
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(n) => SqlValue::BigInt(*n),
        Value::Decimal(d) => SqlValue::Double(*d),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn query_keys(&self, sql: &str) -> DbResult<Vec<i64>> {
        self.query_keys_sync(sql)
    }

    async fn query_text_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>> {
        self.query_text_rows_sync(sql)
    }

    async fn replace_table(&self, table: &TableSchema, rows: &[Vec<Value>]) -> DbResult<usize> {
        self.replace_table_sync(table, rows)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.execute_batch_sync(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
