//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use sm_core::{Config, EntityKind};
use sm_db::DuckDbBackend;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Exit code used when a store failure aborts a run
pub(crate) const EXIT_STORE_FAILURE: u8 = 4;

/// Structured exit code carried through `anyhow::Error`.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main turns it into the process status.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded salesmart.yml and the directory it is relative to
#[derive(Debug)]
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

/// Load the project named by the global CLI arguments.
///
/// `--config` points at a config file directly; otherwise salesmart.yml is
/// looked up in `--project-dir`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project")?;
    Ok(Project { root, config })
}

/// Parse a comma-separated entity list; `None` means all entities
pub(crate) fn parse_entities(list: Option<&str>) -> Result<Vec<EntityKind>> {
    let Some(list) = list else {
        return Ok(EntityKind::ALL.to_vec());
    };
    let mut entities = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<EntityKind>)
        .collect::<Result<Vec<_>, _>>()?;
    entities.sort();
    entities.dedup();
    Ok(entities)
}

/// Open the warehouse for the resolved target.
///
/// Relative DuckDB paths are resolved against the project root. Returns the
/// backend and the path it was opened from.
pub(crate) fn create_database_connection(
    project: &Project,
    target: Option<&str>,
) -> Result<(DuckDbBackend, String)> {
    let db_config = project
        .config
        .get_database_config(target)
        .context("Failed to get database configuration")?;

    let path = if db_config.is_in_memory() || Path::new(&db_config.path).is_absolute() {
        db_config.path.clone()
    } else {
        project.root.join(&db_config.path).display().to_string()
    };

    let db = DuckDbBackend::new(&path).context("Failed to connect to database")?;
    Ok((db, path))
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entities_default_all() {
        assert_eq!(parse_entities(None).unwrap(), EntityKind::ALL.to_vec());
    }

    #[test]
    fn test_parse_entities_sorted_and_deduped() {
        let entities = parse_entities(Some("sales, customer,sale")).unwrap();
        assert_eq!(entities, vec![EntityKind::Customer, EntityKind::Sale]);
    }

    #[test]
    fn test_parse_entities_unknown() {
        let err = parse_entities(Some("customer,campaign")).unwrap_err();
        assert!(err.to_string().contains("[E007]"));
    }

    #[test]
    fn test_column_widths() {
        let widths = calculate_column_widths(
            &["TABLE", "ROWS"],
            &[vec!["customer".to_string(), "7".to_string()]],
        );
        assert_eq!(widths, vec![8, 4]);
    }
}
