//! Run command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use sm_core::{Config, EntityKind, LogSink, ScrubOptions};
use sm_warehouse::{load_outcomes, read_inputs, scrub_all, write_prepared, PipelineReport};

use crate::cli::{GlobalArgs, RunArgs, RunOutput};
use crate::commands::common::{
    self, create_database_connection, load_project, ExitCode, EXIT_STORE_FAILURE,
};

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let started_at = Utc::now();
    let project = load_project(global)?;
    let target = Config::resolve_target(global.target.as_deref());

    // Resolve the target before touching any input so a typo fails fast
    let schema = project
        .config
        .get_database_config(target.as_deref())
        .map(|_| project.config.get_schema(target.as_deref()))
        .context("Failed to resolve target")?;

    let inputs = read_inputs(&project.config, &project.root, &EntityKind::ALL)
        .context("Failed to read raw inputs")?;
    let options = ScrubOptions::from_config(&project.config);
    let outcomes = scrub_all(&inputs, &options, &mut LogSink);

    if args.write_prepared {
        let dir = project.config.prepared_dir_absolute(&project.root);
        write_prepared(&outcomes, &dir).context("Failed to write prepared files")?;
        log::info!("Wrote prepared files to {}", dir.display());
    }

    let (db, path) = match create_database_connection(&project, target.as_deref()) {
        Ok(conn) => conn,
        Err(e) => {
            println!("  ✗ warehouse unavailable - {:#}", e);
            return Err(ExitCode(EXIT_STORE_FAILURE).into());
        }
    };
    log::debug!("Connected to {}", path);

    let report = load_outcomes(&db, &outcomes, schema, started_at, &mut LogSink).await;

    match args.output {
        RunOutput::Text => print_report(&report),
        RunOutput::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(ExitCode(EXIT_STORE_FAILURE).into())
    }
}

fn print_report(report: &PipelineReport) {
    let rows: Vec<Vec<String>> = report
        .entities
        .iter()
        .map(|e| {
            vec![
                e.table.clone(),
                e.scrub.rows_read.to_string(),
                e.scrub.duplicates.to_string(),
                e.scrub.rejected.to_string(),
                e.scrub.outliers.to_string(),
                e.loaded.map_or_else(|| "-".to_string(), |n| n.to_string()),
                e.referential_rejects.to_string(),
            ]
        })
        .collect();
    common::print_table(
        &[
            "TABLE",
            "READ",
            "DUPLICATES",
            "REJECTED",
            "OUTLIERS",
            "LOADED",
            "REF REJECTS",
        ],
        &rows,
    );

    println!();
    for e in &report.entities {
        match e.loaded {
            Some(n) => println!("  ✓ {} ({} rows)", e.table, n),
            None => println!("  - {} skipped", e.table),
        }
    }
    if let Some(failure) = &report.failure {
        println!("  ✗ {}", failure);
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "\nRun {} finished in {}ms",
        report.run_id,
        elapsed.num_milliseconds()
    );
}
