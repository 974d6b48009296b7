//! Error types for sm-warehouse

use sm_core::EntityKind;
use sm_db::DbError;
use thiserror::Error;

/// Failures that stop a warehouse load
#[derive(Error, Debug)]
pub enum LoadError {
    /// L001: The store rejected DDL, an insert, or the connection
    #[error("[L001] Store unavailable while loading {entity}: {source}")]
    StoreUnavailable {
        entity: EntityKind,
        #[source]
        source: DbError,
    },

    /// L002: A fact table was loaded before the dimension it references
    #[error("[L002] Cannot load {entity}: dimension table {table} has not been loaded")]
    DimensionNotLoaded { entity: EntityKind, table: String },
}

impl LoadError {
    /// Entity whose load failed
    pub fn entity(&self) -> EntityKind {
        match self {
            LoadError::StoreUnavailable { entity, .. }
            | LoadError::DimensionNotLoaded { entity, .. } => *entity,
        }
    }
}

/// Result type alias for LoadError
pub type LoadResult<T> = Result<T, LoadError>;
