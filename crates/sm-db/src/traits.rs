//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sm_core::{TableSchema, Value};

/// Warehouse store used by the loader
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Values of the first column of a query, which must be integral.
    /// NULLs are skipped.
    async fn query_keys(&self, sql: &str) -> DbResult<Vec<i64>>;

    /// All rows of a query with every column read as optional text
    async fn query_text_rows(&self, sql: &str) -> DbResult<Vec<Vec<Option<String>>>>;

    /// Drop, recreate and fill a table in one transaction.
    ///
    /// Each row holds one value per column of `table`, in table order. On
    /// any failure the previous table, if there was one, is left as it was.
    /// Returns the number of rows inserted.
    async fn replace_table(&self, table: &TableSchema, rows: &[Vec<Value>]) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;
}
