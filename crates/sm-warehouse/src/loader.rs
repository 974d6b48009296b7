//! Warehouse loader
//!
//! Replaces one table per entity, dimensions before facts. Fact rows whose
//! foreign keys are absent from the freshly loaded dimension tables are
//! rejected here, since the tables themselves declare no foreign keys.

use crate::error::{LoadError, LoadResult};
use sm_core::{
    CanonicalRecord, EntityKind, Issue, SchemaMapping, ScrubOutcome, TableSchema, Value,
};
use sm_db::{Database, DbError};
use std::collections::{HashMap, HashSet};

/// Result of loading one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityLoad {
    /// Entity loaded
    pub entity: EntityKind,
    /// Qualified table name
    pub table: String,
    /// Rows now in the table
    pub rows_loaded: usize,
    /// Rows rejected for referential violations
    pub rejected: Vec<Issue>,
}

/// Outcome of [`WarehouseLoader::load_all`]
#[derive(Debug, Default)]
pub struct LoadSummary {
    /// Entities committed, in load order
    pub loads: Vec<EntityLoad>,
    /// The failure that stopped the run, if any
    pub failure: Option<LoadError>,
}

impl LoadSummary {
    /// True when every entity loaded
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Load result for an entity, if it committed
    pub fn get(&self, entity: EntityKind) -> Option<&EntityLoad> {
        self.loads.iter().find(|l| l.entity == entity)
    }
}

/// Loads scrubbed record sets into a [`Database`]
pub struct WarehouseLoader<'a> {
    db: &'a dyn Database,
    schema: Option<String>,
}

impl<'a> WarehouseLoader<'a> {
    /// Create a loader writing into `schema` (default schema when `None`)
    pub fn new(db: &'a dyn Database, schema: Option<&str>) -> Self {
        Self {
            db,
            schema: schema.filter(|s| !s.is_empty()).map(String::from),
        }
    }

    /// Table layout of an entity in this loader's schema
    pub fn table(&self, entity: EntityKind) -> TableSchema {
        TableSchema::new(entity, self.schema.as_deref())
    }

    /// Load every set, dimensions first.
    ///
    /// Stops at the first failing entity; tables committed before it stay
    /// in place and are listed in the summary.
    pub async fn load_all(&self, sets: &[ScrubOutcome]) -> LoadSummary {
        let mut ordered: Vec<&ScrubOutcome> = sets.iter().collect();
        ordered.sort_by_key(|o| o.entity);

        let mut summary = LoadSummary::default();

        if let (Some(schema), Some(first)) = (&self.schema, ordered.first()) {
            if let Err(source) = self.db.create_schema_if_not_exists(schema).await {
                summary.failure = Some(LoadError::StoreUnavailable {
                    entity: first.entity,
                    source,
                });
                return summary;
            }
        }

        for outcome in ordered {
            match self.load_entity(outcome).await {
                Ok(load) => summary.loads.push(load),
                Err(e) => {
                    log::error!("{}", e);
                    summary.failure = Some(e);
                    break;
                }
            }
        }
        summary
    }

    /// Replace one entity's table with its scrubbed records.
    ///
    /// Facts are checked against the dimension tables already in the
    /// store, so dimensions must be loaded first.
    pub async fn load_entity(&self, outcome: &ScrubOutcome) -> LoadResult<EntityLoad> {
        let entity = outcome.entity;
        let table = self.table(entity);
        let mapping = SchemaMapping::for_entity(entity);
        let store_err = |source: DbError| LoadError::StoreUnavailable { entity, source };

        let mut dimension_keys = HashMap::new();
        for (_, dimension) in mapping.foreign_keys() {
            if !dimension_keys.contains_key(&dimension) {
                let keys = self.dimension_keys(entity, dimension).await?;
                dimension_keys.insert(dimension, keys);
            }
        }

        let mut rows = Vec::with_capacity(outcome.records.len());
        let mut rejected = Vec::new();
        'records: for record in &outcome.records {
            for (column, dimension) in mapping.foreign_keys() {
                let key = record.get(column.name).and_then(Value::as_i64);
                let found = key.is_some_and(|k| {
                    dimension_keys
                        .get(&dimension)
                        .is_some_and(|keys: &HashSet<i64>| keys.contains(&k))
                });
                if !found {
                    rejected.push(Issue::referential(
                        &describe(&mapping, record),
                        column.name,
                        key,
                        dimension,
                    ));
                    continue 'records;
                }
            }
            rows.push(table.materialize(record));
        }

        if !rejected.is_empty() {
            log::warn!(
                "Rejected {} {} rows with unknown dimension keys",
                rejected.len(),
                entity
            );
        }

        let rows_loaded = self.db.replace_table(&table, &rows).await.map_err(store_err)?;
        log::info!("Loaded {} rows into {}", rows_loaded, table.qualified_name());

        Ok(EntityLoad {
            entity,
            table: table.qualified_name(),
            rows_loaded,
            rejected,
        })
    }

    async fn dimension_keys(
        &self,
        fact: EntityKind,
        dimension: EntityKind,
    ) -> LoadResult<HashSet<i64>> {
        let table = self.table(dimension);
        let store_err = |source: DbError| LoadError::StoreUnavailable {
            entity: fact,
            source,
        };

        if !self
            .db
            .relation_exists(&table.qualified_name())
            .await
            .map_err(store_err)?
        {
            return Err(LoadError::DimensionNotLoaded {
                entity: fact,
                table: table.qualified_name(),
            });
        }

        let keys = self
            .db
            .query_keys(&table.key_sql())
            .await
            .map_err(store_err)?;
        Ok(keys.into_iter().collect())
    }
}

/// `sale 10`, or `sale` when the record has no usable key
fn describe(mapping: &SchemaMapping, record: &CanonicalRecord) -> String {
    let key = mapping
        .primary_key()
        .next()
        .and_then(|c| record.get(c.name))
        .and_then(Value::as_i64);
    match key {
        Some(k) => format!("{} {}", mapping.entity(), k),
        None => mapping.entity().to_string(),
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
