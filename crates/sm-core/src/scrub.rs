//! Row scrubbing: rename, normalize, deduplicate, and reject
//!
//! [`scrub`] turns an ordered sequence of [`RawRecord`]s into canonical
//! records for one entity. Scrubbing is pure: every rejection or dropped
//! column is returned as an [`Issue`] and counted in [`ScrubStats`], and
//! nothing is logged or written here.

use crate::config::Config;
use crate::entity::EntityKind;
use crate::field::{DateFormats, FieldKind};
use crate::mapping::{ColumnRole, ColumnSpec, SchemaMapping};
use crate::outliers::iqr_bounds;
use crate::raw::RawRecord;
use crate::value::Value;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// A scrubbed record: warehouse column name to canonical value.
///
/// Only columns present in the raw input appear; the loader fills the rest.
pub type CanonicalRecord = BTreeMap<String, Value>;

/// Recoverable problems found while scrubbing or loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A value failed normalization or a range check
    MalformedValue,
    /// A required key (primary or foreign) is absent after normalization
    MissingRequiredKey,
    /// A raw header has no entry in the column mapping
    UnmappedColumn,
    /// A fact row references a dimension key that was not loaded
    ReferentialViolation,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MalformedValue => write!(f, "malformed value"),
            IssueKind::MissingRequiredKey => write!(f, "missing required key"),
            IssueKind::UnmappedColumn => write!(f, "unmapped column"),
            IssueKind::ReferentialViolation => write!(f, "referential violation"),
        }
    }
}

/// One recorded problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Problem category
    pub kind: IssueKind,
    /// 1-based input row, when the issue concerns a row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Raw header or warehouse column involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Human-readable detail
    pub message: String,
    /// True when the whole row was dropped because of this issue
    pub rejected: bool,
}

impl Issue {
    fn row(kind: IssueKind, row: usize, column: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            row: Some(row),
            column: Some(column.to_string()),
            message: message.into(),
            rejected: true,
        }
    }

    /// A fact row rejected by the loader's key check. `record` describes the
    /// rejected row, for example `sale 10`.
    pub fn referential(record: &str, column: &str, key: Option<i64>, dimension: EntityKind) -> Self {
        let message = match key {
            Some(key) => format!(
                "{}: {} {} not found in {}",
                record,
                column,
                key,
                dimension.table_name()
            ),
            None => format!("{}: {} is null", record, column),
        };
        Self {
            kind: IssueKind::ReferentialViolation,
            row: None,
            column: Some(column.to_string()),
            message,
            rejected: true,
        }
    }
}

/// Row accounting for one scrub pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrubStats {
    /// Raw records received
    pub rows_read: usize,
    /// Records dropped because their identity key was already seen
    pub duplicates: usize,
    /// Records dropped for a missing key, malformed required value, or
    /// constraint violation
    pub rejected: usize,
    /// Records dropped by IQR outlier screening
    pub outliers: usize,
    /// Optional values that failed to parse and were nulled
    pub malformed_values: usize,
    /// Distinct raw headers dropped, either unmapped or shadowed by an
    /// earlier header for the same column
    pub unmapped_columns: usize,
}

impl ScrubStats {
    /// Records that survived scrubbing
    pub fn rows_out(&self) -> usize {
        self.rows_read - self.duplicates - self.rejected - self.outliers
    }
}

/// IQR screening settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierPolicy {
    /// Multiplier `k` applied to the interquartile range
    pub multiplier: f64,
}

/// Options that affect normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrubOptions {
    /// Date formats tried in order
    pub date_formats: DateFormats,
    /// Remove outliers on the entity's measure column when set
    pub outliers: Option<OutlierPolicy>,
}

impl ScrubOptions {
    /// Build options from the project configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            date_formats: config.date_formats(),
            outliers: config.outliers.enabled.then_some(OutlierPolicy {
                multiplier: config.outliers.multiplier,
            }),
        }
    }
}

/// Result of scrubbing one entity's raw records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrubOutcome {
    /// Entity the records belong to
    pub entity: EntityKind,
    /// Surviving records in first-seen input order
    pub records: Vec<CanonicalRecord>,
    /// Row accounting
    pub stats: ScrubStats,
    /// Every dropped column, rejected row and nulled value
    pub issues: Vec<Issue>,
}

/// A record that passed key checks, with its input position
struct Candidate {
    row: usize,
    record: CanonicalRecord,
}

/// Scrub raw records for one entity.
///
/// 1. Rename headers through the entity's [`SchemaMapping`] and normalize
///    each value by its declared kind. Unmapped headers are dropped and
///    reported once each; when two headers map to the same column the first
///    one wins and the later one is reported as dropped.
/// 2. Reject records without a primary key, then drop records whose key was
///    already seen. The first occurrence in input order is kept.
/// 3. Reject kept records with a malformed or missing required value or a
///    constraint violation. Malformed optional values become null.
/// 4. Optionally screen the entity's measure column for IQR outliers.
pub fn scrub(records: &[RawRecord], entity: EntityKind, options: &ScrubOptions) -> ScrubOutcome {
    let mapping = SchemaMapping::for_entity(entity);
    let mut stats = ScrubStats {
        rows_read: records.len(),
        ..ScrubStats::default()
    };
    let mut issues = Vec::new();
    let mut unmapped: BTreeSet<&str> = BTreeSet::new();
    let mut seen_keys: HashSet<Vec<i64>> = HashSet::new();
    let mut candidates = Vec::with_capacity(records.len());

    for (idx, raw) in records.iter().enumerate() {
        let row = idx + 1;
        let mut record = CanonicalRecord::new();
        let mut failure: Option<Issue> = None;

        for (header, value) in raw.iter() {
            let Some(spec) = mapping.resolve(header) else {
                if unmapped.insert(header) {
                    stats.unmapped_columns += 1;
                    issues.push(Issue {
                        kind: IssueKind::UnmappedColumn,
                        row: None,
                        column: Some(header.to_string()),
                        message: format!("no {} column maps from '{}'; dropped", entity, header),
                        rejected: false,
                    });
                }
                continue;
            };
            if record.contains_key(spec.name) {
                if unmapped.insert(header) {
                    stats.unmapped_columns += 1;
                    issues.push(Issue {
                        kind: IssueKind::UnmappedColumn,
                        row: None,
                        column: Some(header.to_string()),
                        message: format!(
                            "'{}' also maps to {}.{}, which an earlier header already fills; dropped",
                            header, entity, spec.name
                        ),
                        rejected: false,
                    });
                }
                continue;
            }

            let normalized = match spec.normalize(Some(value), &options.date_formats) {
                Ok(v) => v,
                Err(e) if spec.required => {
                    failure.get_or_insert_with(|| {
                        Issue::row(IssueKind::MalformedValue, row, spec.name, e.to_string())
                    });
                    Value::Null
                }
                Err(e) => {
                    stats.malformed_values += 1;
                    issues.push(Issue {
                        rejected: false,
                        ..Issue::row(IssueKind::MalformedValue, row, spec.name, e.to_string())
                    });
                    Value::Null
                }
            };

            if let Err(message) = spec.check(&normalized) {
                failure.get_or_insert_with(|| {
                    Issue::row(IssueKind::MalformedValue, row, spec.name, message)
                });
            }
            record.insert(spec.name.to_string(), normalized);
        }

        let key: Option<Vec<i64>> = mapping
            .primary_key()
            .map(|c| record.get(c.name).and_then(Value::as_i64))
            .collect();
        let Some(key) = key else {
            let pk = mapping.primary_key().next().map_or("", |c| c.name);
            stats.rejected += 1;
            issues.push(Issue::row(
                IssueKind::MissingRequiredKey,
                row,
                pk,
                format!("{} is missing or not an integer", pk),
            ));
            continue;
        };
        if !seen_keys.insert(key) {
            stats.duplicates += 1;
            continue;
        }

        if failure.is_none() {
            failure = missing_required(&mapping, &record, row);
        }
        if let Some(issue) = failure {
            stats.rejected += 1;
            issues.push(issue);
            continue;
        }

        candidates.push(Candidate { row, record });
    }

    if let Some(policy) = options.outliers {
        candidates = remove_outliers(entity, candidates, policy, &mut stats, &mut issues);
    }

    ScrubOutcome {
        entity,
        records: candidates.into_iter().map(|c| c.record).collect(),
        stats,
        issues,
    }
}

/// First required column that is absent or null
fn missing_required(mapping: &SchemaMapping, record: &CanonicalRecord, row: usize) -> Option<Issue> {
    let spec: &ColumnSpec = mapping
        .columns()
        .iter()
        .filter(|c| c.required && c.role != ColumnRole::PrimaryKey)
        .find(|c| record.get(c.name).is_none_or(Value::is_null))?;

    let kind = if spec.kind == FieldKind::NumericIdentifier {
        IssueKind::MissingRequiredKey
    } else {
        IssueKind::MalformedValue
    };
    Some(Issue::row(
        kind,
        row,
        spec.name,
        format!("required column {} has no value", spec.name),
    ))
}

fn remove_outliers(
    entity: EntityKind,
    candidates: Vec<Candidate>,
    policy: OutlierPolicy,
    stats: &mut ScrubStats,
    issues: &mut Vec<Issue>,
) -> Vec<Candidate> {
    let column = entity.outlier_column();
    let values: Vec<f64> = candidates
        .iter()
        .filter_map(|c| c.record.get(column).and_then(Value::as_f64))
        .collect();
    let Some((lower, upper)) = iqr_bounds(&values, policy.multiplier) else {
        return candidates;
    };

    candidates
        .into_iter()
        .filter(|c| {
            let Some(v) = c.record.get(column).and_then(Value::as_f64) else {
                return true;
            };
            if (lower..=upper).contains(&v) {
                return true;
            }
            stats.outliers += 1;
            issues.push(Issue::row(
                IssueKind::MalformedValue,
                c.row,
                column,
                format!("{} outside IQR bounds [{}, {}]", v, lower, upper),
            ));
            false
        })
        .collect()
}

#[cfg(test)]
#[path = "scrub_test.rs"]
mod tests;
