//! Pipeline progress events
//!
//! The pipeline reports what it does through an [`EventSink`] instead of
//! printing. [`LogSink`] forwards to the `log` facade; a `Vec` collects
//! events for tests and JSON reports.

use crate::entity::EntityKind;
use crate::scrub::{Issue, ScrubStats};
use serde::Serialize;

/// A progress or diagnostic event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Raw records were read for an entity
    Read { entity: EntityKind, rows: usize },
    /// An entity finished scrubbing
    Scrubbed {
        entity: EntityKind,
        stats: ScrubStats,
    },
    /// A raw header was dropped, unmapped or shadowed by an earlier header
    ColumnDropped { entity: EntityKind, column: String },
    /// A row was dropped
    Rejected { entity: EntityKind, issue: Issue },
    /// A malformed optional value was replaced by NULL; the row was kept
    ValueNulled { entity: EntityKind, issue: Issue },
    /// A table was replaced in the warehouse
    Loaded {
        entity: EntityKind,
        table: String,
        rows: usize,
    },
    /// A table load failed and the run stopped
    LoadFailed { entity: EntityKind, message: String },
}

/// Receiver of pipeline events
pub trait EventSink {
    /// Handle one event
    fn emit(&mut self, event: PipelineEvent);
}

impl EventSink for Vec<PipelineEvent> {
    fn emit(&mut self, event: PipelineEvent) {
        self.push(event);
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Read { entity, rows } => {
                log::info!("Read {} raw {} rows", rows, entity);
            }
            PipelineEvent::Scrubbed { entity, stats } => {
                log::info!(
                    "Scrubbed {}: {} in, {} out ({} duplicates, {} rejected, {} outliers)",
                    entity,
                    stats.rows_read,
                    stats.rows_out(),
                    stats.duplicates,
                    stats.rejected,
                    stats.outliers
                );
            }
            PipelineEvent::ColumnDropped { entity, column } => {
                log::warn!("Dropping {} column '{}'", entity, column);
            }
            PipelineEvent::Rejected { entity, issue } => match issue.row {
                Some(row) => log::debug!("{} row {}: {} ({})", entity, row, issue.message, issue.kind),
                None => log::debug!("{}: {} ({})", entity, issue.message, issue.kind),
            },
            PipelineEvent::ValueNulled { entity, issue } => {
                log::debug!(
                    "{} row {}: {}; stored as NULL",
                    entity,
                    issue.row.unwrap_or_default(),
                    issue.message
                );
            }
            PipelineEvent::Loaded {
                entity,
                table,
                rows,
            } => {
                log::info!("Loaded {} {} rows into {}", rows, entity, table);
            }
            PipelineEvent::LoadFailed { entity, message } => {
                log::error!("Loading {} failed: {}", entity, message);
            }
        }
    }
}
