//! Fixed star-schema table layout
//!
//! Each entity maps to one warehouse table whose columns are exactly the
//! entity's [`SchemaMapping`]. [`TableSchema`] renders the DDL and insert
//! statements and fills columns a scrubbed record did not carry.

use crate::entity::EntityKind;
use crate::mapping::{ColumnRole, ColumnSpec, SchemaMapping};
use crate::scrub::CanonicalRecord;
use crate::sql_utils::{quote_ident, quote_qualified};
use crate::value::Value;

/// Table layout of one entity, optionally inside a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    mapping: SchemaMapping,
    schema: Option<String>,
}

impl TableSchema {
    /// Layout for an entity. `schema` of `None` means the default schema.
    pub fn new(entity: EntityKind, schema: Option<&str>) -> Self {
        Self {
            mapping: SchemaMapping::for_entity(entity),
            schema: schema.filter(|s| !s.is_empty()).map(String::from),
        }
    }

    /// Entity stored in this table
    pub fn entity(&self) -> EntityKind {
        self.mapping.entity()
    }

    /// Schema name, when one is configured
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Table name with schema prefix when present (`mart.sale`)
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.entity().table_name()),
            None => self.entity().table_name().to_string(),
        }
    }

    /// Columns in table order
    pub fn columns(&self) -> &'static [ColumnSpec] {
        self.mapping.columns()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }

    /// `CREATE TABLE` statement.
    ///
    /// The primary key is declared; foreign keys are checked by the loader
    /// so that dimensions can be replaced while facts reference them. Text,
    /// flag and required columns are `NOT NULL`.
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns()
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", quote_ident(c.name), c.sql_type());
                if c.role == ColumnRole::PrimaryKey {
                    def.push_str(" PRIMARY KEY");
                } else if c.required || c.kind.is_textual() {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();
        format!(
            "CREATE TABLE {} ({})",
            quote_qualified(&self.qualified_name()),
            columns.join(", ")
        )
    }

    /// Parameterized `INSERT` with one placeholder per column.
    ///
    /// Each placeholder is cast to the column type so dates can be bound as
    /// ISO text and decimals as doubles.
    pub fn insert_sql(&self) -> String {
        let names: Vec<String> = self.columns().iter().map(|c| quote_ident(c.name)).collect();
        let params: Vec<String> = self
            .columns()
            .iter()
            .map(|c| format!("CAST(? AS {})", c.sql_type()))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_qualified(&self.qualified_name()),
            names.join(", "),
            params.join(", ")
        )
    }

    /// Every row with each column rendered as text, ordered by primary key
    pub fn select_text_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns()
            .iter()
            .map(|c| format!("CAST({} AS VARCHAR)", quote_ident(c.name)))
            .collect();
        let order: Vec<String> = self.mapping.primary_key().map(|c| quote_ident(c.name)).collect();
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            columns.join(", "),
            quote_qualified(&self.qualified_name()),
            order.join(", ")
        )
    }

    /// Distinct non-null values of the table's primary key
    pub fn key_sql(&self) -> String {
        let key = self
            .mapping
            .primary_key()
            .next()
            .map_or_else(|| "1".to_string(), |c| quote_ident(c.name));
        format!(
            "SELECT DISTINCT {key} FROM {} WHERE {key} IS NOT NULL",
            quote_qualified(&self.qualified_name())
        )
    }

    /// Row values in table order.
    ///
    /// Absent columns take their kind's absent value: the sentinel for text,
    /// `N` for flags, NULL otherwise.
    pub fn materialize(&self, record: &CanonicalRecord) -> Vec<Value> {
        self.columns()
            .iter()
            .map(|c| match record.get(c.name) {
                Some(value) => value.clone(),
                None => c.kind.absent_value(),
            })
            .collect()
    }
}
