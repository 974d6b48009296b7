//! List command implementation

use anyhow::Result;
use serde::Serialize;
use sm_core::{ColumnRole, ColumnSpec, Config, CoreError, EntityKind, TableSchema};
use std::path::Path;

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::commands::common::{self, parse_entities};

/// Table information for display
#[derive(Debug, Serialize)]
struct TableInfo {
    entity: EntityKind,
    table: String,
    columns: Vec<ColumnSpec>,
}

/// Execute the ls command.
///
/// Mappings are static, so this works outside a project; the table schema
/// is read from salesmart.yml when one is found.
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let schema = warehouse_schema(global)?;
    let entities = parse_entities(args.entity.as_deref())?;

    let tables: Vec<TableInfo> = entities
        .into_iter()
        .map(|entity| {
            let table = TableSchema::new(entity, schema.as_deref());
            TableInfo {
                entity,
                table: table.qualified_name(),
                columns: table.columns().to_vec(),
            }
        })
        .collect();

    match args.output {
        LsOutput::Table => print_tables(&tables),
        LsOutput::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
    }
    Ok(())
}

fn warehouse_schema(global: &GlobalArgs) -> Result<Option<String>> {
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path))?,
        None => match Config::load_from_dir(Path::new(&global.project_dir)) {
            Ok(config) => config,
            Err(CoreError::ConfigNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        },
    };
    let target = Config::resolve_target(global.target.as_deref());
    Ok(config.get_schema(target.as_deref()).map(String::from))
}

fn print_tables(tables: &[TableInfo]) {
    let rows: Vec<Vec<String>> = tables
        .iter()
        .flat_map(|t| {
            t.columns.iter().map(move |c| {
                vec![
                    t.table.clone(),
                    c.name.to_string(),
                    c.sql_type().to_string(),
                    describe_role(c.role),
                    if c.required { "yes" } else { "no" }.to_string(),
                    if c.aliases.is_empty() {
                        "-".to_string()
                    } else {
                        c.aliases.join(", ")
                    },
                ]
            })
        })
        .collect();
    common::print_table(
        &["TABLE", "COLUMN", "TYPE", "KEY", "REQUIRED", "ALIASES"],
        &rows,
    );
    println!("\n{} table(s)", tables.len());
}

fn describe_role(role: ColumnRole) -> String {
    match role {
        ColumnRole::PrimaryKey => "primary".to_string(),
        ColumnRole::ForeignKey(dimension) => format!("-> {}", dimension),
        ColumnRole::Attribute => "-".to_string(),
    }
}
