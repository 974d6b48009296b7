//! Run driver: read, scrub, then load each entity in order

use crate::loader::{LoadSummary, WarehouseLoader};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sm_core::raw::{read_raw_csv, write_prepared_csv};
use sm_core::{
    scrub, Config, CoreResult, EntityKind, EventSink, IssueKind, PipelineEvent, RawRecord,
    SchemaMapping, ScrubOptions, ScrubOutcome, ScrubStats,
};
use sm_db::Database;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Raw records per entity, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineInputs {
    records: BTreeMap<EntityKind, Vec<RawRecord>>,
}

impl PipelineInputs {
    /// Empty input set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw records of an entity, replacing any earlier set
    pub fn insert(&mut self, entity: EntityKind, records: Vec<RawRecord>) {
        self.records.insert(entity, records);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, entity: EntityKind, records: Vec<RawRecord>) -> Self {
        self.insert(entity, records);
        self
    }

    /// Raw records of an entity
    pub fn get(&self, entity: EntityKind) -> Option<&[RawRecord]> {
        self.records.get(&entity).map(Vec::as_slice)
    }

    /// Entities present, in load order
    pub fn entities(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.records.keys().copied()
    }
}

/// Read the configured raw file of each requested entity
pub fn read_inputs(
    config: &Config,
    root: &Path,
    entities: &[EntityKind],
) -> CoreResult<PipelineInputs> {
    let mut inputs = PipelineInputs::new();
    for &entity in entities {
        let path = config.input_path(root, entity);
        let records = read_raw_csv(&path, config.delimiter)?;
        inputs.insert(entity, records);
    }
    Ok(inputs)
}

/// Settings for one run
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Normalization and outlier settings
    pub scrub: ScrubOptions,
    /// Warehouse schema, default schema when `None`
    pub schema: Option<String>,
}

/// Per-entity line of a [`PipelineReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    pub entity: EntityKind,
    /// Qualified table name
    pub table: String,
    pub scrub: ScrubStats,
    /// Rows committed; `None` when the entity was not loaded
    pub loaded: Option<usize>,
    /// Rows dropped by the referential check
    pub referential_rejects: usize,
}

/// Summary of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entities: Vec<EntityReport>,
    /// Message of the failure that aborted loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PipelineReport {
    /// True when every entity loaded
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Report line for an entity
    pub fn entity(&self, entity: EntityKind) -> Option<&EntityReport> {
        self.entities.iter().find(|e| e.entity == entity)
    }
}

/// Scrub every entity in load order, reporting progress to `sink`
pub fn scrub_all(
    inputs: &PipelineInputs,
    options: &ScrubOptions,
    sink: &mut dyn EventSink,
) -> Vec<ScrubOutcome> {
    inputs
        .entities()
        .filter_map(|entity| inputs.get(entity).map(|records| (entity, records)))
        .map(|(entity, records)| {
            sink.emit(PipelineEvent::Read {
                entity,
                rows: records.len(),
            });
            let outcome = scrub(records, entity, options);
            emit_issues(&outcome, sink);
            sink.emit(PipelineEvent::Scrubbed {
                entity,
                stats: outcome.stats,
            });
            outcome
        })
        .collect()
}

fn emit_issues(outcome: &ScrubOutcome, sink: &mut dyn EventSink) {
    for issue in &outcome.issues {
        let event = match (issue.kind, &issue.column) {
            (IssueKind::UnmappedColumn, Some(column)) => PipelineEvent::ColumnDropped {
                entity: outcome.entity,
                column: column.clone(),
            },
            _ if issue.rejected => PipelineEvent::Rejected {
                entity: outcome.entity,
                issue: issue.clone(),
            },
            _ => PipelineEvent::ValueNulled {
                entity: outcome.entity,
                issue: issue.clone(),
            },
        };
        sink.emit(event);
    }
}

/// Write each scrubbed set to `<dir>/<entity>s_prepared.csv`
pub fn write_prepared(outcomes: &[ScrubOutcome], dir: &Path) -> CoreResult<Vec<PathBuf>> {
    outcomes
        .iter()
        .map(|outcome| {
            let path = dir.join(outcome.entity.prepared_file_name());
            write_prepared_csv(
                &path,
                &SchemaMapping::for_entity(outcome.entity),
                &outcome.records,
            )?;
            Ok(path)
        })
        .collect()
}

/// Scrub and load a full run.
///
/// Loading stops at the first store failure; the report still lists the
/// scrub statistics of every entity and the tables that were committed.
pub async fn run_pipeline(
    db: &dyn Database,
    inputs: &PipelineInputs,
    options: &PipelineOptions,
    sink: &mut dyn EventSink,
) -> PipelineReport {
    let started_at = Utc::now();
    let outcomes = scrub_all(inputs, &options.scrub, sink);
    load_outcomes(db, &outcomes, options.schema.as_deref(), started_at, sink).await
}

/// Load already scrubbed sets and build the run report
pub async fn load_outcomes(
    db: &dyn Database,
    outcomes: &[ScrubOutcome],
    schema: Option<&str>,
    started_at: DateTime<Utc>,
    sink: &mut dyn EventSink,
) -> PipelineReport {
    let run_id = Uuid::new_v4();
    log::info!("Starting load {} against {}", run_id, db.db_type());

    let loader = WarehouseLoader::new(db, schema);
    let summary = loader.load_all(outcomes).await;
    emit_loads(&summary, sink);

    let entities = outcomes
        .iter()
        .map(|outcome| {
            let load = summary.get(outcome.entity);
            EntityReport {
                entity: outcome.entity,
                table: loader.table(outcome.entity).qualified_name(),
                scrub: outcome.stats,
                loaded: load.map(|l| l.rows_loaded),
                referential_rejects: load.map_or(0, |l| l.rejected.len()),
            }
        })
        .collect();

    PipelineReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        entities,
        failure: summary.failure.as_ref().map(ToString::to_string),
    }
}

fn emit_loads(summary: &LoadSummary, sink: &mut dyn EventSink) {
    for load in &summary.loads {
        for issue in &load.rejected {
            sink.emit(PipelineEvent::Rejected {
                entity: load.entity,
                issue: issue.clone(),
            });
        }
        sink.emit(PipelineEvent::Loaded {
            entity: load.entity,
            table: load.table.clone(),
            rows: load.rows_loaded,
        });
    }
    if let Some(failure) = &summary.failure {
        sink.emit(PipelineEvent::LoadFailed {
            entity: failure.entity(),
            message: failure.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
