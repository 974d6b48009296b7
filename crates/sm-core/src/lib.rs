//! sm-core - Core library for SalesMart
//!
//! This crate provides the deterministic half of the pipeline: field
//! normalization, the static per-entity column mappings, row scrubbing
//! (normalize, deduplicate, reject), the fixed star-schema table layout,
//! project configuration, and the raw CSV reader / prepared CSV writer.

pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod field;
pub mod mapping;
pub mod outliers;
pub mod raw;
pub mod scrub;
pub mod sql_utils;
pub mod value;
pub mod warehouse;

pub use config::{Config, DatabaseConfig, OutlierConfig};
pub use entity::EntityKind;
pub use error::{CoreError, CoreResult};
pub use event::{EventSink, LogSink, PipelineEvent};
pub use field::{normalize, DateFormats, FieldError, FieldKind, SENTINEL};
pub use mapping::{snake_case, ColumnRole, ColumnSpec, SchemaMapping, ValueConstraint, Vocabulary};
pub use raw::RawRecord;
pub use scrub::{scrub, CanonicalRecord, Issue, IssueKind, ScrubOptions, ScrubOutcome, ScrubStats};
pub use value::Value;
pub use warehouse::TableSchema;
